//! Facility layout loader from TOML configuration

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use parkit_domain::ParkingSpot;
use parkit_types::{ConfigError, Error, ParkingType, Result};

/// One spot entry of layout.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotDefinition {
    pub id: u32,
    pub parking_type: ParkingType,
}

/// Container for parsing layout.toml
#[derive(Debug, Deserialize)]
struct LayoutConfig {
    spots: Vec<SpotDefinition>,
}

/// The numbered spots a facility is built with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityLayout {
    spots: Vec<SpotDefinition>,
}

impl Default for FacilityLayout {
    /// Three car spots (1-3) and two bike spots (4-5)
    fn default() -> Self {
        let spots = [
            (1, ParkingType::Car),
            (2, ParkingType::Car),
            (3, ParkingType::Car),
            (4, ParkingType::Bike),
            (5, ParkingType::Bike),
        ]
        .into_iter()
        .map(|(id, parking_type)| SpotDefinition { id, parking_type })
        .collect();
        Self { spots }
    }
}

impl FacilityLayout {
    /// Build a layout, rejecting spot number 0 and duplicate numbers
    pub fn new(mut spots: Vec<SpotDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for spot in &spots {
            if spot.id == 0 {
                return Err(parse_error("spot numbers start at 1".to_string()));
            }
            if !seen.insert(spot.id) {
                return Err(parse_error(format!("duplicate spot number {}", spot.id)));
            }
        }
        spots.sort_by_key(|s| s.id);
        Ok(Self { spots })
    }

    /// Load a layout from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| parse_error(format!("Failed to read layout file: {}", e)))?;
        Self::load_from_str(&content)
    }

    /// Load a layout from a TOML string
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let config: LayoutConfig = toml::from_str(toml_content)
            .map_err(|e| parse_error(format!("Failed to parse layout TOML: {}", e)))?;
        Self::new(config.spots)
    }

    /// Spots of this layout, all available
    pub fn to_spots(&self) -> Vec<ParkingSpot> {
        self.spots
            .iter()
            .map(|d| ParkingSpot::new(d.id, d.parking_type, true))
            .collect()
    }

    pub fn count(&self, parking_type: ParkingType) -> usize {
        self.spots
            .iter()
            .filter(|s| s.parking_type == parking_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }
}

fn parse_error(message: String) -> Error {
    Error::Config(ConfigError::ParseError(message))
}
