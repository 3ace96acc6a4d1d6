//! File-based ticket repository implementation

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use parkit_domain::{Ticket, TicketRepository};
use parkit_types::Result;

use super::{lock, read_json, write_json};

/// On-disk shape of tickets.json
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct TicketLedger {
    next_id: u64,
    tickets: Vec<Ticket>,
}

impl TicketLedger {
    fn empty() -> Self {
        Self {
            next_id: 1,
            tickets: Vec::new(),
        }
    }

    /// Keep `next_id` ahead of every stored id, even in hand-edited files
    fn normalized(mut self) -> Self {
        let max_id = self.tickets.iter().map(|t| t.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
        self
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.tickets.iter().position(|t| t.id == id)
    }
}

/// File-based implementation of TicketRepository
///
/// Tickets are kept in insertion order; ids are assigned sequentially from 1.
/// Every operation reloads `tickets.json`, so writes made by another process
/// holding the store lock are never overwritten.
pub struct FileTicketRepository {
    store_path: PathBuf,
    ledger: Mutex<TicketLedger>,
}

impl FileTicketRepository {
    /// Create or load a ticket repository
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("tickets.json");
        let ledger = read_json::<TicketLedger>(&store_path)?
            .map(TicketLedger::normalized)
            .unwrap_or_else(TicketLedger::empty);

        Ok(Self {
            store_path,
            ledger: Mutex::new(ledger),
        })
    }

    /// Ledger as currently stored on disk
    fn current(&self) -> Result<MutexGuard<'_, TicketLedger>> {
        let mut ledger = lock(&self.ledger)?;
        if let Some(stored) = read_json::<TicketLedger>(&self.store_path)? {
            *ledger = stored.normalized();
        }
        Ok(ledger)
    }
}

impl TicketRepository for FileTicketRepository {
    fn get_open_ticket(&self, vehicle_reg_number: &str) -> Result<Option<Ticket>> {
        Ok(self
            .current()?
            .tickets
            .iter()
            .rev()
            .find(|t| t.vehicle_reg_number == vehicle_reg_number && t.is_open())
            .cloned())
    }

    fn save_ticket(&self, ticket: &Ticket) -> Result<u64> {
        let mut ledger = self.current()?;
        let id = ledger.next_id;
        let mut stored = ticket.clone();
        stored.id = id;
        ledger.tickets.push(stored);
        ledger.next_id += 1;
        if let Err(e) = write_json(&self.store_path, &*ledger) {
            ledger.tickets.pop();
            ledger.next_id -= 1;
            return Err(e);
        }
        debug!(ticket = id, vehicle = %ticket.vehicle_reg_number, "saved ticket");
        Ok(id)
    }

    fn update_ticket(&self, ticket: &Ticket) -> Result<bool> {
        let mut ledger = self.current()?;
        let Some(pos) = ledger.position(ticket.id) else {
            return Ok(false);
        };
        let previous = std::mem::replace(&mut ledger.tickets[pos], ticket.clone());
        if let Err(e) = write_json(&self.store_path, &*ledger) {
            ledger.tickets[pos] = previous;
            return Err(e);
        }
        debug!(ticket = ticket.id, price = ticket.price, "updated ticket");
        Ok(true)
    }

    fn count_prior_visits(&self, vehicle_reg_number: &str) -> Result<u32> {
        let count = self
            .current()?
            .tickets
            .iter()
            .filter(|t| t.vehicle_reg_number == vehicle_reg_number && !t.is_open())
            .count();
        Ok(count as u32)
    }

    fn find_by_vehicle(&self, vehicle_reg_number: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .current()?
            .tickets
            .iter()
            .filter(|t| t.vehicle_reg_number == vehicle_reg_number)
            .cloned()
            .collect())
    }

    fn find_all(&self) -> Result<Vec<Ticket>> {
        Ok(self.current()?.tickets.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use parkit_domain::ParkingSpot;
    use parkit_types::ParkingType;
    use tempfile::tempdir;

    fn open_ticket(vehicle: &str) -> Ticket {
        let in_time = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
        Ticket::open(ParkingSpot::new(1, ParkingType::Car, false), vehicle, in_time, false)
    }

    #[test]
    fn test_save_assigns_sequential_ids() {
        let dir = tempdir().unwrap();
        let repo = FileTicketRepository::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(repo.save_ticket(&open_ticket("AAA")).unwrap(), 1);
        assert_eq!(repo.save_ticket(&open_ticket("BBB")).unwrap(), 2);
        assert_eq!(repo.find_all().unwrap().len(), 2);
    }

    #[test]
    fn test_open_ticket_lookup_ignores_closed() {
        let dir = tempdir().unwrap();
        let repo = FileTicketRepository::open(dir.path().to_path_buf()).unwrap();
        let id = repo.save_ticket(&open_ticket("AAA")).unwrap();

        let mut ticket = repo.get_open_ticket("AAA").unwrap().unwrap();
        assert_eq!(ticket.id, id);
        ticket.out_time = ticket.in_time.map(|t| t + Duration::hours(2));
        ticket.price = 3.0;
        assert!(repo.update_ticket(&ticket).unwrap());

        assert!(repo.get_open_ticket("AAA").unwrap().is_none());
        assert!(repo.get_open_ticket("BBB").unwrap().is_none());
    }

    #[test]
    fn test_prior_visits_count_closed_tickets_only() {
        let dir = tempdir().unwrap();
        let repo = FileTicketRepository::open(dir.path().to_path_buf()).unwrap();
        repo.save_ticket(&open_ticket("AAA")).unwrap();
        assert_eq!(repo.count_prior_visits("AAA").unwrap(), 0);

        let mut ticket = repo.get_open_ticket("AAA").unwrap().unwrap();
        ticket.out_time = ticket.in_time.map(|t| t + Duration::hours(1));
        repo.update_ticket(&ticket).unwrap();
        assert_eq!(repo.count_prior_visits("AAA").unwrap(), 1);

        repo.save_ticket(&open_ticket("AAA")).unwrap();
        assert_eq!(repo.count_prior_visits("AAA").unwrap(), 1);
        assert_eq!(repo.find_by_vehicle("AAA").unwrap().len(), 2);
    }

    #[test]
    fn test_update_unknown_ticket_reports_failure() {
        let dir = tempdir().unwrap();
        let repo = FileTicketRepository::open(dir.path().to_path_buf()).unwrap();
        let mut ticket = open_ticket("AAA");
        ticket.id = 42;
        assert!(!repo.update_ticket(&ticket).unwrap());
    }

    #[test]
    fn test_tickets_survive_reopen_and_ids_continue() {
        let dir = tempdir().unwrap();
        {
            let repo = FileTicketRepository::open(dir.path().to_path_buf()).unwrap();
            repo.save_ticket(&open_ticket("AAA")).unwrap();
            repo.save_ticket(&open_ticket("BBB")).unwrap();
        }
        let repo = FileTicketRepository::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(repo.find_all().unwrap().len(), 2);
        assert_eq!(repo.save_ticket(&open_ticket("CCC")).unwrap(), 3);
    }

    #[test]
    fn test_failed_update_is_reported_and_rolled_back() {
        let dir = tempdir().unwrap();
        let store_dir = dir.path().join("store");
        let repo = FileTicketRepository::open(store_dir.clone()).unwrap();
        repo.save_ticket(&open_ticket("AAA")).unwrap();
        let mut ticket = repo.get_open_ticket("AAA").unwrap().unwrap();

        // Nowhere left to write the replacement file
        fs::remove_dir_all(&store_dir).unwrap();
        ticket.out_time = ticket.in_time.map(|t| t + Duration::hours(1));
        assert!(repo.update_ticket(&ticket).is_err());
        assert!(repo.get_open_ticket("AAA").unwrap().is_some());
    }

    #[test]
    fn test_two_instances_see_each_others_tickets() {
        let dir = tempdir().unwrap();
        let first = FileTicketRepository::open(dir.path().to_path_buf()).unwrap();
        let second = FileTicketRepository::open(dir.path().to_path_buf()).unwrap();

        assert_eq!(first.save_ticket(&open_ticket("AAA")).unwrap(), 1);
        assert_eq!(second.save_ticket(&open_ticket("BBB")).unwrap(), 2);

        assert_eq!(first.find_all().unwrap().len(), 2);
        assert!(first.get_open_ticket("BBB").unwrap().is_some());
    }
}
