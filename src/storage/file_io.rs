//! File I/O utilities with atomic writes
//!
//! Documents are always read whole and rewritten whole. Rewrites go through a
//! temp file in the same directory and a rename, so a document is either
//! completely replaced or not modified at all.

use std::ffi::OsString;
use std::fs::{self, Permissions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{KpfError, KpfResult};

/// Read a whole file, returning `NotFound` if it doesn't exist
pub fn read_bytes<P: AsRef<Path>>(path: P) -> KpfResult<Vec<u8>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(KpfError::file_not_found(path));
    }

    fs::read(path).map_err(|e| KpfError::Io(format!("Failed to read {}: {}", path.display(), e)))
}

/// Write bytes to a file atomically (write to temp, then rename)
///
/// An existing file keeps its permissions.
pub fn write_bytes_atomic<P: AsRef<Path>>(path: P, data: &[u8]) -> KpfResult<()> {
    let path = path.as_ref();
    let permissions = fs::metadata(path).ok().map(|meta| meta.permissions());
    write_atomic(path, data, permissions)
}

/// Like [`write_bytes_atomic`], but the result takes the permissions of
/// `template`
pub fn write_bytes_atomic_like<P: AsRef<Path>>(
    path: P,
    data: &[u8],
    template: &Path,
) -> KpfResult<()> {
    let permissions = fs::metadata(template)
        .map_err(|e| KpfError::Io(format!("Failed to stat {}: {}", template.display(), e)))?
        .permissions();
    write_atomic(path.as_ref(), data, Some(permissions))
}

fn write_atomic(path: &Path, data: &[u8], permissions: Option<Permissions>) -> KpfResult<()> {
    // Same directory, so the rename stays on one filesystem
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| {
                KpfError::Io(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
            parent
        }
        None => Path::new("."),
    };

    // Unique name, removed on drop if anything below fails
    let temp = NamedTempFile::new_in(dir)
        .map_err(|e| KpfError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(temp);
    writer
        .write_all(data)
        .and_then(|_| writer.flush())
        .map_err(|e| KpfError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    let temp = writer
        .into_inner()
        .map_err(|e| KpfError::Io(format!("Failed to write {}: {}", path.display(), e.error())))?;

    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions).map_err(|e| {
            KpfError::Io(format!(
                "Failed to set permissions for {}: {}",
                path.display(),
                e
            ))
        })?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| KpfError::Io(format!("Failed to sync {}: {}", path.display(), e)))?;

    temp.persist(path)
        .map_err(|e| KpfError::Io(format!("Failed to rename temp file: {}", e.error)))?;

    Ok(())
}

/// Delete a file
pub fn remove_file<P: AsRef<Path>>(path: P) -> KpfResult<()> {
    let path = path.as_ref();
    fs::remove_file(path)
        .map_err(|e| KpfError::Io(format!("Failed to delete {}: {}", path.display(), e)))
}

pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().is_file()
}

/// Append a raw suffix to the final path component
pub fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
