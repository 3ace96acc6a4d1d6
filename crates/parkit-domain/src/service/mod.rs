//! Domain services

pub mod fare_calculator;

pub use fare_calculator::{FareCalculator, FarePolicy};
