//! Persistence implementations
//!
//! This module provides file-based implementations of the repository traits.
//! Store files are replaced atomically, and every operation starts from what
//! is on disk so several processes can share one store directory under a
//! [`FileStoreLock`].

mod file_parking_spot_repo;
mod file_ticket_repo;
mod store_lock;

pub use file_parking_spot_repo::FileParkingSpotRepository;
pub use file_ticket_repo::FileTicketRepository;
pub use store_lock::FileStoreLock;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use parkit_types::{Error, Result};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| Error::Persistence("store lock poisoned".to_string()))
}

/// Read a store file, `None` if it does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(Some(serde_json::from_reader(reader)?))
}

/// Replace a store file with `value`.
///
/// The data goes to a temporary file next to `path`, is flushed and synced,
/// and is then renamed over the old file. Any failure leaves the old file intact.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Persistence(format!("{} has no parent directory", path.display())))?;
    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
