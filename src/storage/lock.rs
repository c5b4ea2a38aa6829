//! Advisory file locking
//!
//! Envelope operations are read-modify-write cycles. Two of them racing on
//! the same document can lose data, so hosts that run several at once take
//! an exclusive lock on a sidecar `<file>.lock` first. The lock is held until
//! the guard is dropped.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use super::file_io::append_suffix;
use crate::error::{KpfError, KpfResult};

/// Held exclusive lock on a document
#[derive(Debug)]
pub struct FileLock {
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    /// Block until the exclusive lock for `target` is acquired
    pub fn acquire(target: &Path) -> KpfResult<Self> {
        let lock_path = lock_path_for(target);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                KpfError::Io(format!(
                    "Failed to open lock file {}: {}",
                    lock_path.display(),
                    e
                ))
            })?;

        file.lock_exclusive().map_err(|e| {
            KpfError::Io(format!("Failed to lock {}: {}", target.display(), e))
        })?;

        Ok(Self { file, lock_path })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// `notes.kpf` -> `notes.kpf.lock`
pub fn lock_path_for(target: &Path) -> PathBuf {
    append_suffix(target, ".lock")
}
