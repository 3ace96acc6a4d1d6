//! Parking Service - vehicle entry and exit use cases
//!
//! Entry:
//! 1. Read the vehicle category and find a free spot for it
//! 2. Read the registration number
//! 3. Under the allocation lock and the store lock, reserve the spot and open a ticket
//!
//! Exit:
//! 1. Read the registration number and claim the vehicle
//! 2. Under the store lock, fetch the open ticket, close it and price it
//!    (recurring customers get the discount)
//! 3. Persist the ticket, then release the spot only if that succeeded

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use parkit_domain::service::FareCalculator;
use parkit_domain::{
    Clock, InputReader, ParkingSpot, ParkingSpotRepository, ProcessLocal, StoreLock, SystemClock,
    Ticket, TicketRepository,
};
use parkit_types::{Error, ParkingType, Result};

/// Outcome of a vehicle exit
#[derive(Debug, Clone, Serialize)]
pub struct ExitReceipt {
    /// The closed ticket with its exit time and price
    pub ticket: Ticket,
    /// Recurring-customer discount was applied
    pub discounted: bool,
    /// The ticket update reached the ticket repository
    pub ticket_persisted: bool,
    /// The spot was marked available again
    pub spot_released: bool,
}

/// Coordinates spot allocation, ticket lifecycle and fares
pub struct ParkingService {
    input: Arc<dyn InputReader>,
    spots: Arc<dyn ParkingSpotRepository>,
    tickets: Arc<dyn TicketRepository>,
    clock: Arc<dyn Clock>,
    store_lock: Arc<dyn StoreLock>,
    fare_calculator: FareCalculator,
    /// Held across find-then-reserve so two entries never share a spot
    allocation: Mutex<()>,
    /// Vehicles whose exit is currently being processed
    departures: Mutex<HashSet<String>>,
}

impl ParkingService {
    pub fn new(
        input: Arc<dyn InputReader>,
        spots: Arc<dyn ParkingSpotRepository>,
        tickets: Arc<dyn TicketRepository>,
    ) -> Self {
        Self {
            input,
            spots,
            tickets,
            clock: Arc::new(SystemClock),
            store_lock: Arc::new(ProcessLocal),
            fare_calculator: FareCalculator::default(),
            allocation: Mutex::new(()),
            departures: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Serialize entries and exits with other processes sharing the stores
    pub fn with_store_lock(mut self, store_lock: Arc<dyn StoreLock>) -> Self {
        self.store_lock = store_lock;
        self
    }

    pub fn with_fare_calculator(mut self, fare_calculator: FareCalculator) -> Self {
        self.fare_calculator = fare_calculator;
        self
    }

    /// Read a category and return the spot that would be allocated for it.
    ///
    /// Nothing is reserved; the returned spot is reported as available.
    pub fn get_next_parking_number_if_available(&self) -> Result<ParkingSpot> {
        let parking_type = self.read_vehicle_type()?;
        match self.spots.next_available_slot(parking_type)? {
            Some(id) => Ok(ParkingSpot::new(id, parking_type, true)),
            None => Err(Error::NoAvailableSpot(parking_type)),
        }
    }

    /// Interactive entry: read category and registration number, then admit
    pub fn process_incoming_vehicle(&self) -> Result<Ticket> {
        let preview = self.get_next_parking_number_if_available()?;
        let vehicle_reg_number = self.input.read_vehicle_registration_number()?;
        self.admit_vehicle(preview.parking_type, &vehicle_reg_number)
    }

    /// Reserve a spot of `parking_type` for the vehicle and open its ticket
    pub fn admit_vehicle(&self, parking_type: ParkingType, vehicle_reg_number: &str) -> Result<Ticket> {
        let vehicle = normalize_vehicle_reg_number(vehicle_reg_number)?;
        let _allocation = lock(&self.allocation)?;
        let ticket = self.exclusively(|| self.issue_ticket(parking_type, vehicle))?;

        info!(
            ticket = ticket.id,
            vehicle = %ticket.vehicle_reg_number,
            spot = ticket.parking_spot.id,
            parking_type = %parking_type,
            "vehicle parked"
        );
        Ok(ticket)
    }

    /// Interactive exit: read the registration number, then depart
    pub fn process_exiting_vehicle(&self) -> Result<ExitReceipt> {
        let vehicle_reg_number = self.input.read_vehicle_registration_number()?;
        self.depart_vehicle(&vehicle_reg_number)
    }

    /// Close the vehicle's open ticket, price it and free its spot.
    ///
    /// A failed ticket update is not an error: the receipt reports it and the
    /// spot stays occupied.
    pub fn depart_vehicle(&self, vehicle_reg_number: &str) -> Result<ExitReceipt> {
        let vehicle = normalize_vehicle_reg_number(vehicle_reg_number)?;
        let _claim = DepartureClaim::acquire(&self.departures, &vehicle)?;
        let receipt = self.exclusively(|| self.close_ticket(&vehicle))?;

        info!(
            ticket = receipt.ticket.id,
            vehicle = %vehicle,
            price = receipt.ticket.price,
            discounted = receipt.discounted,
            spot_released = receipt.spot_released,
            "vehicle exited"
        );
        Ok(receipt)
    }

    /// Run `work` once under the store lock and hand back its result
    fn exclusively<T>(&self, work: impl FnOnce() -> Result<T>) -> Result<T> {
        let mut work = Some(work);
        let mut output = None;
        self.store_lock.exclusive(&mut || {
            if let Some(work) = work.take() {
                output = Some(work()?);
            }
            Ok(())
        })?;
        output.ok_or_else(|| Error::Persistence("store lock returned without running".to_string()))
    }

    fn issue_ticket(&self, parking_type: ParkingType, vehicle: String) -> Result<Ticket> {
        if self.tickets.get_open_ticket(&vehicle)?.is_some() {
            return Err(Error::VehicleAlreadyParked(vehicle));
        }

        let spot_id = self
            .spots
            .next_available_slot(parking_type)?
            .ok_or(Error::NoAvailableSpot(parking_type))?;

        let recurring_customer = self.tickets.count_prior_visits(&vehicle)? > 0;
        if recurring_customer {
            info!(vehicle = %vehicle, "welcome back, recurring customer eligible for discount");
        }

        let spot = ParkingSpot::new(spot_id, parking_type, false);
        if !self.spots.update_parking(&spot)? {
            return Err(Error::Persistence(format!(
                "could not reserve parking spot {}",
                spot_id
            )));
        }

        let mut ticket = Ticket::open(spot, vehicle, self.clock.now(), recurring_customer);
        match self.tickets.save_ticket(&ticket) {
            Ok(id) => ticket.id = id,
            Err(e) => {
                self.release_spot(&ticket.parking_spot);
                return Err(e);
            }
        }
        Ok(ticket)
    }

    fn close_ticket(&self, vehicle: &str) -> Result<ExitReceipt> {
        let mut ticket = self
            .tickets
            .get_open_ticket(vehicle)?
            .ok_or_else(|| Error::TicketNotFound(vehicle.to_string()))?;

        ticket.out_time = Some(self.clock.now());
        let discounted =
            ticket.recurring_customer || self.tickets.count_prior_visits(vehicle)? > 0;
        self.fare_calculator.apply_fare(&mut ticket, discounted)?;

        let ticket_persisted = match self.tickets.update_ticket(&ticket) {
            Ok(true) => true,
            Ok(false) => {
                warn!(ticket = ticket.id, vehicle = %vehicle, "ticket update rejected, spot stays occupied");
                false
            }
            Err(e) => {
                warn!(ticket = ticket.id, vehicle = %vehicle, error = %e, "ticket update failed, spot stays occupied");
                false
            }
        };

        let spot_released = ticket_persisted && self.release_spot(&ticket.parking_spot);
        Ok(ExitReceipt {
            ticket,
            discounted,
            ticket_persisted,
            spot_released,
        })
    }

    fn read_vehicle_type(&self) -> Result<ParkingType> {
        let code = self.input.read_selection()?;
        ParkingType::from_selection(code)
            .ok_or_else(|| Error::InvalidSelection(format!("unknown vehicle type {}", code)))
    }

    /// Mark the spot available; failures are logged, not returned
    fn release_spot(&self, spot: &ParkingSpot) -> bool {
        match self.spots.update_parking(&spot.with_availability(true)) {
            Ok(true) => true,
            Ok(false) => {
                warn!(spot = spot.id, "parking spot not found while releasing it");
                false
            }
            Err(e) => {
                warn!(spot = spot.id, error = %e, "failed to release parking spot");
                false
            }
        }
    }
}

/// Trim and upper-case a registration number, rejecting empty ones
pub fn normalize_vehicle_reg_number(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidSelection(
            "vehicle registration number is empty".to_string(),
        ));
    }
    Ok(trimmed.to_uppercase())
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::Persistence("parking service lock poisoned".to_string()))
}

/// Marks a vehicle as departing until dropped
struct DepartureClaim<'a> {
    departures: &'a Mutex<HashSet<String>>,
    vehicle: String,
}

impl<'a> DepartureClaim<'a> {
    fn acquire(departures: &'a Mutex<HashSet<String>>, vehicle: &str) -> Result<Self> {
        if !lock(departures)?.insert(vehicle.to_string()) {
            return Err(Error::ExitInProgress(vehicle.to_string()));
        }
        Ok(Self {
            departures,
            vehicle: vehicle.to_string(),
        })
    }
}

impl Drop for DepartureClaim<'_> {
    fn drop(&mut self) {
        let mut departures = self
            .departures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        departures.remove(&self.vehicle);
    }
}
