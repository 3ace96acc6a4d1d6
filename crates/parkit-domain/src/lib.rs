//! Domain layer for parkit
//!
//! Parking spots, tickets, the fare policy and the traits the application
//! layer talks to for input, persistence and time.

pub mod constants;
pub mod model;
pub mod repository;
pub mod service;

pub use model::*;
pub use repository::{
    Clock, InputReader, ParkingSpotRepository, ProcessLocal, StoreLock, SystemClock,
    TicketRepository,
};
