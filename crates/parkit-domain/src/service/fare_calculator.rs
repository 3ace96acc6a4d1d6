//! Fare calculation for closed tickets

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{default_rate_per_hour, DISCOUNT_RATE, FREE_DURATION_HOURS};
use crate::model::Ticket;
use parkit_types::{ConfigError, Error, ParkingType, Result};

/// Pricing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarePolicy {
    /// Stays up to this many hours are free
    #[serde(default = "default_free_duration_hours")]
    pub free_duration_hours: f64,

    /// Multiplier applied to discounted fares
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,

    /// Hourly rate per category
    #[serde(default = "default_rates")]
    pub rates: BTreeMap<ParkingType, f64>,
}

fn default_free_duration_hours() -> f64 {
    FREE_DURATION_HOURS
}

fn default_discount_rate() -> f64 {
    DISCOUNT_RATE
}

fn default_rates() -> BTreeMap<ParkingType, f64> {
    ParkingType::ALL
        .iter()
        .map(|&t| (t, default_rate_per_hour(t)))
        .collect()
}

impl Default for FarePolicy {
    fn default() -> Self {
        Self {
            free_duration_hours: default_free_duration_hours(),
            discount_rate: default_discount_rate(),
            rates: default_rates(),
        }
    }
}

impl FarePolicy {
    /// Reject values that would produce negative or meaningless prices
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.free_duration_hours.is_finite() || self.free_duration_hours < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "free duration must be a non-negative number of hours, got {}",
                self.free_duration_hours
            )));
        }
        if !(self.discount_rate > 0.0 && self.discount_rate <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "discount rate must be in (0, 1], got {}",
                self.discount_rate
            )));
        }
        for (parking_type, rate) in &self.rates {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "rate for {} must be a non-negative number, got {}",
                    parking_type, rate
                )));
            }
        }
        Ok(())
    }

    pub fn rate_per_hour(&self, parking_type: ParkingType) -> Option<f64> {
        self.rates.get(&parking_type).copied()
    }
}

/// Computes the price of a closed ticket
#[derive(Debug, Clone, Default)]
pub struct FareCalculator {
    policy: FarePolicy,
}

impl FareCalculator {
    pub fn new(policy: FarePolicy) -> Self {
        Self { policy }
    }

    /// Price of `ticket`, reading only its stored timestamps.
    ///
    /// The free window is checked first, then the category rate, then the
    /// discount multiplier.
    pub fn calculate_fare(&self, ticket: &Ticket, discount: bool) -> Result<f64> {
        let in_time = ticket.in_time.ok_or_else(|| {
            Error::InvalidTimeRange("In time provided is incorrect: NULL".to_string())
        })?;
        match ticket.out_time {
            Some(out) if out >= in_time => {}
            Some(out) => {
                return Err(Error::InvalidTimeRange(format!(
                    "Out time provided is incorrect: {} is before {}",
                    out.to_rfc3339(),
                    in_time.to_rfc3339()
                )))
            }
            None => {
                return Err(Error::InvalidTimeRange(
                    "Out time provided is incorrect: NULL".to_string(),
                ))
            }
        }

        let duration = ticket.duration_hours().ok_or_else(|| {
            Error::InvalidTimeRange("Out time provided is incorrect: NULL".to_string())
        })?;
        if duration <= self.policy.free_duration_hours {
            return Ok(0.0);
        }

        let parking_type = ticket.parking_spot.parking_type;
        let rate = self
            .policy
            .rate_per_hour(parking_type)
            .ok_or(Error::UnsupportedCategory(parking_type))?;

        let price = duration * rate;
        if discount {
            Ok(price * self.policy.discount_rate)
        } else {
            Ok(price)
        }
    }

    /// Compute the fare and store it on the ticket
    pub fn apply_fare(&self, ticket: &mut Ticket, discount: bool) -> Result<()> {
        ticket.price = self.calculate_fare(ticket, discount)?;
        Ok(())
    }
}
