//! Parking ticket type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ParkingSpot;

const MILLIS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;

/// Record of one vehicle occupying one spot, from entry to exit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Assigned by the ticket repository when saved; 0 before that
    #[serde(default)]
    pub id: u64,
    pub parking_spot: ParkingSpot,
    pub vehicle_reg_number: String,
    #[serde(default)]
    pub price: f64,
    pub in_time: Option<DateTime<Utc>>,
    /// `None` while the vehicle is still parked
    #[serde(default)]
    pub out_time: Option<DateTime<Utc>>,
    /// Vehicle had a completed visit before this one
    #[serde(default)]
    pub recurring_customer: bool,
}

impl Ticket {
    /// Open a ticket at `in_time` with no exit time and a zero price
    pub fn open(
        parking_spot: ParkingSpot,
        vehicle_reg_number: impl Into<String>,
        in_time: DateTime<Utc>,
        recurring_customer: bool,
    ) -> Self {
        Self {
            id: 0,
            parking_spot,
            vehicle_reg_number: vehicle_reg_number.into(),
            price: 0.0,
            in_time: Some(in_time),
            out_time: None,
            recurring_customer,
        }
    }

    pub fn is_open(&self) -> bool {
        self.out_time.is_none()
    }

    /// Elapsed time in fractional hours, if both timestamps are set
    pub fn duration_hours(&self) -> Option<f64> {
        match (self.in_time, self.out_time) {
            (Some(in_time), Some(out_time)) => {
                Some((out_time - in_time).num_milliseconds() as f64 / MILLIS_PER_HOUR)
            }
            _ => None,
        }
    }
}
