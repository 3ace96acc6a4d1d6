//! Default fare constants

use parkit_types::ParkingType;

pub const CAR_RATE_PER_HOUR: f64 = 1.5;
pub const BIKE_RATE_PER_HOUR: f64 = 1.0;

/// Parking shorter than or equal to this is free (30 minutes)
pub const FREE_DURATION_HOURS: f64 = 0.5;

/// Multiplier applied to the fare of recurring customers (5% off)
pub const DISCOUNT_RATE: f64 = 0.95;

/// Built-in hourly rate for a category
pub fn default_rate_per_hour(parking_type: ParkingType) -> f64 {
    match parking_type {
        ParkingType::Car => CAR_RATE_PER_HOUR,
        ParkingType::Bike => BIKE_RATE_PER_HOUR,
    }
}
