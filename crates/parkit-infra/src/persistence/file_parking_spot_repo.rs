//! File-based parking spot repository implementation

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use parkit_domain::{ParkingSpot, ParkingSpotRepository};
use parkit_types::{ParkingType, Result};

use super::{lock, read_json, write_json};
use crate::layout_loader::FacilityLayout;

type SpotTable = BTreeMap<u32, ParkingSpot>;

/// File-based implementation of ParkingSpotRepository
///
/// Stores spots in `spots.json`, keyed by spot number. Every operation
/// reloads the file, so a spot taken by another process is seen as taken.
pub struct FileParkingSpotRepository {
    store_path: PathBuf,
    spots: Mutex<SpotTable>,
}

impl FileParkingSpotRepository {
    /// Load the spot store, seeding it with the default layout if it does not exist yet
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        Self::open_with_layout(store_dir, &FacilityLayout::default())
    }

    /// Load the spot store, seeding it with `layout` if it does not exist yet
    pub fn open_with_layout(store_dir: PathBuf, layout: &FacilityLayout) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join("spots.json");

        if let Some(spots) = read_json::<SpotTable>(&store_path)? {
            debug!(path = %store_path.display(), count = spots.len(), "loaded parking spots");
            return Ok(Self {
                store_path,
                spots: Mutex::new(spots),
            });
        }

        let spots = index(layout);
        write_json(&store_path, &spots)?;
        debug!(path = %store_path.display(), count = layout.len(), "seeded parking spots");
        Ok(Self {
            store_path,
            spots: Mutex::new(spots),
        })
    }

    /// Whether a spot store has already been created in `store_dir`
    pub fn exists(store_dir: &Path) -> bool {
        store_dir.join("spots.json").exists()
    }

    /// Replace every spot with the given layout, all available
    pub fn reset(&self, layout: &FacilityLayout) -> Result<()> {
        let mut spots = lock(&self.spots)?;
        let fresh = index(layout);
        write_json(&self.store_path, &fresh)?;
        *spots = fresh;
        Ok(())
    }

    /// Spot table as currently stored on disk
    fn current(&self) -> Result<MutexGuard<'_, SpotTable>> {
        let mut spots = lock(&self.spots)?;
        if let Some(stored) = read_json::<SpotTable>(&self.store_path)? {
            *spots = stored;
        }
        Ok(spots)
    }
}

fn index(layout: &FacilityLayout) -> SpotTable {
    layout.to_spots().into_iter().map(|s| (s.id, s)).collect()
}

impl ParkingSpotRepository for FileParkingSpotRepository {
    fn next_available_slot(&self, parking_type: ParkingType) -> Result<Option<u32>> {
        Ok(self
            .current()?
            .values()
            .find(|s| s.parking_type == parking_type && s.available)
            .map(|s| s.id))
    }

    fn update_parking(&self, spot: &ParkingSpot) -> Result<bool> {
        let mut spots = self.current()?;
        let Some(stored) = spots.get_mut(&spot.id) else {
            return Ok(false);
        };
        let previous = stored.available;
        stored.available = spot.available;
        if let Err(e) = write_json(&self.store_path, &*spots) {
            if let Some(stored) = spots.get_mut(&spot.id) {
                stored.available = previous;
            }
            return Err(e);
        }
        debug!(spot = spot.id, available = spot.available, "updated parking spot");
        Ok(true)
    }

    fn find_by_id(&self, id: u32) -> Result<Option<ParkingSpot>> {
        Ok(self.current()?.get(&id).cloned())
    }

    fn find_all(&self) -> Result<Vec<ParkingSpot>> {
        Ok(self.current()?.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_first_open_seeds_default_layout() {
        let dir = tempdir().unwrap();
        assert!(!FileParkingSpotRepository::exists(dir.path()));
        let repo = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(repo.find_all().unwrap().len(), 5);
        assert!(FileParkingSpotRepository::exists(dir.path()));
    }

    #[test]
    fn test_next_available_prefers_lowest_id() {
        let dir = tempdir().unwrap();
        let repo = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(repo.next_available_slot(ParkingType::Car).unwrap(), Some(1));
        assert_eq!(repo.next_available_slot(ParkingType::Bike).unwrap(), Some(4));

        repo.update_parking(&ParkingSpot::new(1, ParkingType::Car, false)).unwrap();
        assert_eq!(repo.next_available_slot(ParkingType::Car).unwrap(), Some(2));
    }

    #[test]
    fn test_exhausted_category_returns_none() {
        let dir = tempdir().unwrap();
        let repo = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();
        for id in [4, 5] {
            assert!(repo.update_parking(&ParkingSpot::new(id, ParkingType::Bike, false)).unwrap());
        }
        assert_eq!(repo.next_available_slot(ParkingType::Bike).unwrap(), None);
        assert_eq!(repo.next_available_slot(ParkingType::Car).unwrap(), Some(1));
    }

    #[test]
    fn test_update_unknown_spot_reports_failure() {
        let dir = tempdir().unwrap();
        let repo = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();
        let updated = repo.update_parking(&ParkingSpot::new(99, ParkingType::Car, false)).unwrap();
        assert!(!updated);
    }

    #[test]
    fn test_availability_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let repo = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();
            repo.update_parking(&ParkingSpot::new(2, ParkingType::Car, false)).unwrap();
        }
        let repo = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();
        assert!(!repo.find_by_id(2).unwrap().unwrap().available);
        assert!(repo.find_by_id(1).unwrap().unwrap().available);
    }

    #[test]
    fn test_reset_restores_layout() {
        let dir = tempdir().unwrap();
        let repo = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();
        repo.update_parking(&ParkingSpot::new(1, ParkingType::Car, false)).unwrap();

        let layout = FacilityLayout::load_from_str("[[spots]]\nid = 7\nparking_type = \"BIKE\"\n").unwrap();
        repo.reset(&layout).unwrap();
        let spots = repo.find_all().unwrap();
        assert_eq!(spots, vec![ParkingSpot::new(7, ParkingType::Bike, true)]);
    }

    #[test]
    fn test_spot_taken_by_other_instance_is_not_offered() {
        let dir = tempdir().unwrap();
        let first = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();
        let second = FileParkingSpotRepository::open(dir.path().to_path_buf()).unwrap();

        first.update_parking(&ParkingSpot::new(1, ParkingType::Car, false)).unwrap();
        assert_eq!(second.next_available_slot(ParkingType::Car).unwrap(), Some(2));

        second.update_parking(&ParkingSpot::new(2, ParkingType::Car, false)).unwrap();
        let taken: Vec<u32> = first
            .find_all()
            .unwrap()
            .into_iter()
            .filter(|s| !s.available)
            .map(|s| s.id)
            .collect();
        assert_eq!(taken, vec![1, 2]);
    }

    #[test]
    fn test_failed_update_is_reported_and_rolled_back() {
        let dir = tempdir().unwrap();
        let store_dir = dir.path().join("store");
        let repo = FileParkingSpotRepository::open(store_dir.clone()).unwrap();

        fs::remove_dir_all(&store_dir).unwrap();
        assert!(repo.update_parking(&ParkingSpot::new(1, ParkingType::Car, false)).is_err());
        assert!(repo.find_by_id(1).unwrap().unwrap().available);
    }
}
