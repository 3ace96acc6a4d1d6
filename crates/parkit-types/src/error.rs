//! Error types for parkit

use thiserror::Error;

use crate::ParkingType;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("No available parking spot for {0}")]
    NoAvailableSpot(ParkingType),

    #[error("No open ticket for vehicle {0}")]
    TicketNotFound(String),

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("No rate configured for parking type {0}")]
    UnsupportedCategory(ParkingType),

    #[error("Vehicle {0} is already parked")]
    VehicleAlreadyParked(String),

    #[error("Exit already in progress for vehicle {0}")]
    ExitInProgress(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Whether retrying the same operation later could succeed.
    ///
    /// Input and data errors are permanent for the given input;
    /// `UnsupportedCategory` is a configuration defect.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::NoAvailableSpot(_)
                | Error::ExitInProgress(_)
                | Error::Persistence(_)
                | Error::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_category_is_not_retryable() {
        assert!(!Error::UnsupportedCategory(ParkingType::Bike).is_retryable());
        assert!(!Error::InvalidTimeRange("out before in".into()).is_retryable());
        assert!(!Error::InvalidSelection("7".into()).is_retryable());
    }

    #[test]
    fn test_capacity_errors_are_retryable() {
        assert!(Error::NoAvailableSpot(ParkingType::Car).is_retryable());
        assert!(Error::Persistence("disk full".into()).is_retryable());
    }

    #[test]
    fn test_messages() {
        let err = Error::NoAvailableSpot(ParkingType::Car);
        assert_eq!(err.to_string(), "No available parking spot for CAR");
        let err = Error::TicketNotFound("ABCDEF".into());
        assert_eq!(err.to_string(), "No open ticket for vehicle ABCDEF");
    }
}
