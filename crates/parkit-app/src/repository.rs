//! Repository adapters for persistence layer

use std::path::{Path, PathBuf};

use tracing::info;

use parkit_infra::layout_loader::FacilityLayout;
use parkit_infra::persistence::{FileParkingSpotRepository, FileStoreLock, FileTicketRepository};
use parkit_types::Result;

use crate::config::Config;

/// Layout from the configured TOML file, or the built-in one
pub fn load_layout(config: &Config) -> Result<FacilityLayout> {
    match config.layout_path {
        Some(ref path) => FacilityLayout::load_from_file(path),
        None => Ok(FacilityLayout::default()),
    }
}

/// Open file-based parking spot repository, seeding it on first use
pub fn open_spot_repo(config: &Config) -> Result<FileParkingSpotRepository> {
    let store_dir = config.store_dir()?;
    let layout = load_layout(config)?;
    open_spot_repo_at(store_dir, &layout)
}

/// Open file-based ticket repository
pub fn open_ticket_repo(config: &Config) -> Result<FileTicketRepository> {
    let store_dir = config.store_dir()?;
    FileTicketRepository::open(store_dir)
}

/// Open the lock that serializes entries and exits on the configured store
pub fn open_store_lock(config: &Config) -> Result<FileStoreLock> {
    let store_dir = config.store_dir()?;
    open_store_lock_at(&store_dir)
}

/// Open parking spot repository at a custom directory
pub fn open_spot_repo_at(
    store_dir: PathBuf,
    layout: &FacilityLayout,
) -> Result<FileParkingSpotRepository> {
    info!(store = %store_dir.display(), "opening parking spot store");
    FileParkingSpotRepository::open_with_layout(store_dir, layout)
}

/// Open ticket repository at a custom directory
pub fn open_ticket_repo_at(store_dir: PathBuf) -> Result<FileTicketRepository> {
    FileTicketRepository::open(store_dir)
}

/// Open the store lock at a custom directory
pub fn open_store_lock_at(store_dir: &Path) -> Result<FileStoreLock> {
    FileStoreLock::open(store_dir)
}
