//! Parking spot type definitions

use parkit_types::ParkingType;
use serde::{Deserialize, Serialize};

/// A numbered parking location reserved for one vehicle category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpot {
    /// Spot number, unique within the facility
    pub id: u32,
    pub parking_type: ParkingType,
    /// `true` while the spot can be allocated
    pub available: bool,
}

impl ParkingSpot {
    pub fn new(id: u32, parking_type: ParkingType, available: bool) -> Self {
        Self {
            id,
            parking_type,
            available,
        }
    }

    /// Copy of this spot with the availability flag replaced
    pub fn with_availability(&self, available: bool) -> Self {
        Self {
            available,
            ..self.clone()
        }
    }
}
