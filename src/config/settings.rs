//! User settings for KPF
//!
//! Persisted as pretty JSON in `config.json`. Missing fields fall back to
//! their defaults so older files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::KpfPaths;
use crate::crypto::{CipherSuite, EnvelopeKey};
use crate::envelope::suffix::{validate_suffixes, DEFAULT_PLAIN_SUFFIX, DEFAULT_SEALED_SUFFIX};
use crate::envelope::{FileEnvelope, PlaintextCheck, SuffixEnvelope};
use crate::error::{KpfError, KpfResult};
use crate::storage::write_bytes_atomic;

/// Default environment variable holding the key material
pub const DEFAULT_KEY_ENV: &str = "KPF_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Environment variable the key material is read from
    #[serde(default = "default_key_env")]
    pub key_env: String,

    /// Suite used by `encrypt` and `decrypt`
    #[serde(default)]
    pub cipher_suite: CipherSuite,

    #[serde(default = "default_plain_suffix")]
    pub plain_suffix: String,

    #[serde(default = "default_sealed_suffix")]
    pub sealed_suffix: String,

    /// Validation of plaintext recovered by the legacy suite
    #[serde(default)]
    pub plaintext_check: PlaintextCheck,

    /// Take a sidecar lock around every rewrite
    #[serde(default = "default_true")]
    pub lock_files: bool,

    /// Record envelope operations in the audit log
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_key_env() -> String {
    DEFAULT_KEY_ENV.to_string()
}

fn default_plain_suffix() -> String {
    DEFAULT_PLAIN_SUFFIX.to_string()
}

fn default_sealed_suffix() -> String {
    DEFAULT_SEALED_SUFFIX.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            key_env: default_key_env(),
            cipher_suite: CipherSuite::default(),
            plain_suffix: default_plain_suffix(),
            sealed_suffix: default_sealed_suffix(),
            plaintext_check: PlaintextCheck::default(),
            lock_files: true,
            audit_enabled: true,
        }
    }
}

impl Settings {
    /// Names accepted by [`Settings::set`]
    pub const KEYS: [&'static str; 7] = [
        "key_env",
        "cipher_suite",
        "plain_suffix",
        "sealed_suffix",
        "plaintext_check",
        "lock_files",
        "audit_enabled",
    ];

    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &KpfPaths) -> KpfResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| KpfError::Io(format!("Failed to read settings file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| KpfError::Config(format!("Failed to parse settings file: {}", e)))
    }

    pub fn save(&self, paths: &KpfPaths) -> KpfResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| KpfError::Config(format!("Failed to serialize settings: {}", e)))?;

        write_bytes_atomic(paths.settings_file(), contents.as_bytes())
    }

    /// Update one setting from its string form
    pub fn set(&mut self, name: &str, value: &str) -> KpfResult<()> {
        match name {
            "key_env" => {
                if value.is_empty() || value.contains('=') || value.contains('\0') {
                    return Err(KpfError::Validation(format!(
                        "Invalid environment variable name '{}'",
                        value
                    )));
                }
                self.key_env = value.to_string();
            }
            "cipher_suite" => self.cipher_suite = value.parse()?,
            "plain_suffix" => {
                validate_suffixes(value, &self.sealed_suffix)?;
                self.plain_suffix = value.to_string();
            }
            "sealed_suffix" => {
                validate_suffixes(&self.plain_suffix, value)?;
                self.sealed_suffix = value.to_string();
            }
            "plaintext_check" => self.plaintext_check = value.parse()?,
            "lock_files" => self.lock_files = parse_bool(name, value)?,
            "audit_enabled" => self.audit_enabled = parse_bool(name, value)?,
            _ => {
                return Err(KpfError::Validation(format!(
                    "Unknown setting '{}' (expected one of: {})",
                    name,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// In-place envelope configured from these settings
    pub fn file_envelope(&self, key: EnvelopeKey) -> FileEnvelope {
        FileEnvelope::new(key)
            .with_suite(self.cipher_suite)
            .with_plaintext_check(self.plaintext_check)
            .with_locking(self.lock_files)
    }

    /// Suffix envelope configured from these settings
    pub fn suffix_envelope(&self, key: EnvelopeKey) -> KpfResult<SuffixEnvelope> {
        Ok(SuffixEnvelope::new(key)
            .with_suffixes(self.plain_suffix.as_str(), self.sealed_suffix.as_str())?
            .with_plaintext_check(self.plaintext_check)
            .with_locking(self.lock_files))
    }
}

fn parse_bool(name: &str, value: &str) -> KpfResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(KpfError::Validation(format!(
            "Setting '{}' expects true or false, got '{}'",
            name, value
        ))),
    }
}
