//! Shared value types

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Vehicle category a parking spot is reserved for
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParkingType {
    Car,
    Bike,
}

impl ParkingType {
    /// Every category, in menu order
    pub const ALL: [ParkingType; 2] = [ParkingType::Car, ParkingType::Bike];

    /// Map a menu selection code (1 = car, 2 = bike)
    pub fn from_selection(code: u32) -> Option<Self> {
        match code {
            1 => Some(ParkingType::Car),
            2 => Some(ParkingType::Bike),
            _ => None,
        }
    }

    /// Menu selection code for this category
    pub fn selection_code(self) -> u32 {
        match self {
            ParkingType::Car => 1,
            ParkingType::Bike => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParkingType::Car => "CAR",
            ParkingType::Bike => "BIKE",
        }
    }
}

impl std::fmt::Display for ParkingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ParkingType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CAR" | "1" => Ok(ParkingType::Car),
            "BIKE" | "2" => Ok(ParkingType::Bike),
            other => Err(format!("unknown parking type: {}", other)),
        }
    }
}

/// Output format for results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_codes() {
        assert_eq!(ParkingType::from_selection(1), Some(ParkingType::Car));
        assert_eq!(ParkingType::from_selection(2), Some(ParkingType::Bike));
        assert_eq!(ParkingType::from_selection(0), None);
        assert_eq!(ParkingType::from_selection(3), None);
        for t in ParkingType::ALL {
            assert_eq!(ParkingType::from_selection(t.selection_code()), Some(t));
        }
    }

    #[test]
    fn test_parse_parking_type() {
        assert_eq!("car".parse::<ParkingType>(), Ok(ParkingType::Car));
        assert_eq!(" Bike ".parse::<ParkingType>(), Ok(ParkingType::Bike));
        assert!("truck".parse::<ParkingType>().is_err());
    }

    #[test]
    fn test_serde_uses_uppercase_names() {
        let json = serde_json::to_string(&ParkingType::Bike).unwrap();
        assert_eq!(json, "\"BIKE\"");
        let parsed: ParkingType = serde_json::from_str("\"CAR\"").unwrap();
        assert_eq!(parsed, ParkingType::Car);
        assert!(serde_json::from_str::<ParkingType>("\"UNKNOWN\"").is_err());
    }
}
