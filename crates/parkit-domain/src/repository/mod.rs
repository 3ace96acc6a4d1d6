//! Traits for the collaborators the parking core depends on

use chrono::{DateTime, Utc};

use crate::model::{ParkingSpot, Ticket};
use parkit_types::{ParkingType, Result};

/// Source of user choices (vehicle category and registration number)
pub trait InputReader: Send + Sync {
    /// Read the menu code of the vehicle category (1 = car, 2 = bike)
    fn read_selection(&self) -> Result<u32>;

    /// Read the vehicle registration number
    fn read_vehicle_registration_number(&self) -> Result<String>;
}

/// Registry of parking spots
pub trait ParkingSpotRepository: Send + Sync {
    /// Lowest-numbered available spot of the given category, if any
    fn next_available_slot(&self, parking_type: ParkingType) -> Result<Option<u32>>;

    /// Store the spot's availability flag; `Ok(false)` if the spot is unknown
    fn update_parking(&self, spot: &ParkingSpot) -> Result<bool>;

    fn find_by_id(&self, id: u32) -> Result<Option<ParkingSpot>>;

    /// All spots ordered by id
    fn find_all(&self) -> Result<Vec<ParkingSpot>>;
}

/// Registry of parking tickets
pub trait TicketRepository: Send + Sync {
    /// The ticket of this vehicle that has no exit time yet
    fn get_open_ticket(&self, vehicle_reg_number: &str) -> Result<Option<Ticket>>;

    /// Insert a new ticket and return the id assigned to it
    fn save_ticket(&self, ticket: &Ticket) -> Result<u64>;

    /// Replace a stored ticket; `Ok(false)` if no ticket has that id
    fn update_ticket(&self, ticket: &Ticket) -> Result<bool>;

    /// Number of completed visits (closed tickets) for this vehicle
    fn count_prior_visits(&self, vehicle_reg_number: &str) -> Result<u32>;

    fn find_by_vehicle(&self, vehicle_reg_number: &str) -> Result<Vec<Ticket>>;

    fn find_all(&self) -> Result<Vec<Ticket>>;
}

/// Exclusive access to the stores for a whole entry or exit sequence.
///
/// Several processes may share one store; every read done inside `exclusive`
/// sees the writes of whoever held the lock before.
pub trait StoreLock: Send + Sync {
    fn exclusive(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()>;
}

/// Lock for stores that only ever live in one process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLocal;

impl StoreLock for ProcessLocal {
    fn exclusive(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        work()
    }
}

/// Time source for ticket timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
