//! Custom error types for KPF
//!
//! This module defines the error hierarchy for the format engine and the
//! encryption envelope using thiserror for ergonomic error definitions.

use std::path::Path;

use thiserror::Error;

/// The main error type for KPF operations
#[derive(Error, Debug)]
pub enum KpfError {
    /// A required marker or file is missing
    #[error("{what} not found: {location}")]
    NotFound {
        what: &'static str,
        location: String,
    },

    /// The header block is present but structurally invalid
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// The document is not in the state the operation requires
    #[error("Precondition failed for {path}: {reason}")]
    PreconditionFailed { path: String, reason: String },

    /// Cipher failures (wrong key, corrupted ciphertext, bad encoding)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid input values (keys, presets, suffixes)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl KpfError {
    /// Create a "not found" error for a missing file
    pub fn file_not_found(path: &Path) -> Self {
        Self::NotFound {
            what: "File",
            location: path.display().to_string(),
        }
    }

    /// Create a "not found" error for a missing start marker
    pub fn start_marker_not_found(location: impl Into<String>) -> Self {
        Self::NotFound {
            what: "Start marker '#!!'",
            location: location.into(),
        }
    }

    /// Create a precondition error bound to a path
    pub fn precondition(path: &Path, reason: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a malformed header error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedHeader(_))
    }

    /// Check if this is a precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }

    /// Check if this is a crypto error
    pub fn is_crypto(&self) -> bool {
        matches!(self, Self::Crypto(_))
    }
}

impl From<std::io::Error> for KpfError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KpfError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for KPF operations
pub type KpfResult<T> = Result<T, KpfError>;
