//! Path management for KPF
//!
//! ## Path Resolution Order
//!
//! 1. `KPF_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/kpf` or `~/.config/kpf`
//! 3. Windows: `%APPDATA%\kpf`

use std::path::{Path, PathBuf};

use crate::error::{KpfError, KpfResult};

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "KPF_DATA_DIR";

/// Manages all paths used by the `kpf` binary
#[derive(Debug, Clone)]
pub struct KpfPaths {
    base_dir: PathBuf,
}

impl KpfPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> KpfResult<Self> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths under a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn ensure_directories(&self) -> KpfResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| KpfError::Io(format!("Failed to create config directory: {}", e)))
    }

    /// Whether a settings file has been written
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> KpfResult<PathBuf> {
    let config_base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var_os("HOME").ok_or_else(|| {
                KpfError::Config("Could not determine home directory (HOME not set)".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("kpf"))
}

#[cfg(windows)]
fn resolve_default_path() -> KpfResult<PathBuf> {
    let appdata = std::env::var_os("APPDATA")
        .ok_or_else(|| KpfError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("kpf"))
}
