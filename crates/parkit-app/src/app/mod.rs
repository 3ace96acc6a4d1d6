//! Application Layer
//!
//! Use cases that sit between the CLI and the domain/infrastructure layers.
//!
//! - `parking_service`: vehicle entry and exit flows

pub mod parking_service;

pub use parking_service::{ExitReceipt, ParkingService};
