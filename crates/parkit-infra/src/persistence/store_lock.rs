//! Advisory file lock shared by every process using one store directory

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tracing::debug;

use parkit_domain::StoreLock;
use parkit_types::Result;

/// Exclusive lock on `store.lock` inside the store directory.
///
/// Each acquisition opens its own handle, so threads of one process exclude
/// each other the same way separate processes do.
pub struct FileStoreLock {
    lock_path: PathBuf,
}

impl FileStoreLock {
    /// Create the lock file in `store_dir` if needed
    pub fn open(store_dir: &Path) -> Result<Self> {
        fs::create_dir_all(store_dir)?;
        let lock_path = store_dir.join("store.lock");
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        Ok(Self { lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl StoreLock for FileStoreLock {
    fn exclusive(&self, work: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)?;
        let mut file_lock = RwLock::new(file);
        // Blocks until no other holder is left
        let _guard = file_lock.write()?;
        debug!(lock = %self.lock_path.display(), "acquired store lock");
        work()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_lock_file() {
        let dir = tempdir().unwrap();
        let lock = FileStoreLock::open(dir.path()).unwrap();
        assert!(lock.path().exists());
    }

    #[test]
    fn test_separate_handles_never_overlap() {
        let dir = tempdir().unwrap();
        let inside = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = FileStoreLock::open(dir.path()).unwrap();
                let inside = inside.clone();
                let overlaps = overlaps.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    lock.exclusive(&mut || {
                        if inside.fetch_add(1, Ordering::SeqCst) > 0 {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        thread::sleep(Duration::from_millis(20));
                        inside.fetch_sub(1, Ordering::SeqCst);
                        Ok(())
                    })
                    .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_work_error_is_returned() {
        let dir = tempdir().unwrap();
        let lock = FileStoreLock::open(dir.path()).unwrap();
        let result = lock.exclusive(&mut || Err(parkit_types::Error::Persistence("boom".into())));
        assert!(result.is_err());
        // Released after the failed run
        assert!(lock.exclusive(&mut || Ok(())).is_ok());
    }
}
