//! Rotating-suffix envelope
//!
//! `app.log` is sealed into `app.log.kpc` and unsealed back. The sealed file
//! holds bare base64 AES-256-CBC ciphertext with no header. The source file
//! is deleted only once the destination has been written and read back.

use std::path::{Path, PathBuf};

use super::{EnvelopeState, PlaintextCheck};
use crate::crypto::{legacy, EnvelopeKey};
use crate::error::{KpfError, KpfResult};
use crate::storage::file_io::append_suffix;
use crate::storage::{exists, read_bytes, remove_file, write_bytes_atomic_like, FileLock};

pub const DEFAULT_PLAIN_SUFFIX: &str = ".log";
pub const DEFAULT_SEALED_SUFFIX: &str = ".kpc";

#[derive(Debug, Clone)]
pub struct SuffixEnvelope {
    key: EnvelopeKey,
    plain_suffix: String,
    sealed_suffix: String,
    check: PlaintextCheck,
    locking: bool,
}

impl SuffixEnvelope {
    pub fn new(key: EnvelopeKey) -> Self {
        Self {
            key,
            plain_suffix: DEFAULT_PLAIN_SUFFIX.to_string(),
            sealed_suffix: DEFAULT_SEALED_SUFFIX.to_string(),
            check: PlaintextCheck::default(),
            locking: false,
        }
    }

    /// Use other suffixes, e.g. `.txt` and `.enc`
    pub fn with_suffixes(
        mut self,
        plain_suffix: impl Into<String>,
        sealed_suffix: impl Into<String>,
    ) -> KpfResult<Self> {
        let plain_suffix = plain_suffix.into();
        let sealed_suffix = sealed_suffix.into();
        validate_suffixes(&plain_suffix, &sealed_suffix)?;

        self.plain_suffix = plain_suffix;
        self.sealed_suffix = sealed_suffix;
        Ok(self)
    }

    /// Check run on unsealed plaintext before it replaces the sealed file
    pub fn with_plaintext_check(mut self, check: PlaintextCheck) -> Self {
        self.check = check;
        self
    }

    pub fn with_locking(mut self, locking: bool) -> Self {
        self.locking = locking;
        self
    }

    pub fn plain_suffix(&self) -> &str {
        &self.plain_suffix
    }

    pub fn sealed_suffix(&self) -> &str {
        &self.sealed_suffix
    }

    /// `app.log` -> `app.log.kpc`
    pub fn sealed_path(&self, plain_path: &Path) -> PathBuf {
        append_suffix(plain_path, &self.sealed_suffix)
    }

    /// `app.log.kpc` -> `app.log`
    pub fn plain_path(&self, sealed_path: &Path) -> KpfResult<PathBuf> {
        let name = path_str(sealed_path)?;
        name.strip_suffix(self.sealed_suffix.as_str())
            .filter(|stem| !stem.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| suffix_mismatch(sealed_path, &self.sealed_suffix))
    }

    /// `Wrapped` if the sealed counterpart of `plain_path` exists
    pub fn state(&self, plain_path: impl AsRef<Path>) -> EnvelopeState {
        if exists(self.sealed_path(plain_path.as_ref())) {
            EnvelopeState::Wrapped
        } else {
            EnvelopeState::Plain
        }
    }

    /// Encrypt `plain_path` into its sealed path and delete the source
    pub fn seal(&self, plain_path: impl AsRef<Path>) -> KpfResult<PathBuf> {
        let plain_path = plain_path.as_ref();
        if !path_str(plain_path)?.ends_with(self.plain_suffix.as_str()) {
            return Err(suffix_mismatch(plain_path, &self.plain_suffix));
        }
        let _lock = self.lock(plain_path)?;

        let content = read_bytes(plain_path)?;
        let ciphertext = legacy::encrypt(&content, &self.key)?;

        let sealed_path = self.sealed_path(plain_path);
        self.move_content(plain_path, &sealed_path, ciphertext.as_bytes())?;
        Ok(sealed_path)
    }

    /// Decrypt `sealed_path` back into its plain path and delete the source
    pub fn unseal(&self, sealed_path: impl AsRef<Path>) -> KpfResult<PathBuf> {
        let sealed_path = sealed_path.as_ref();
        let plain_path = self.plain_path(sealed_path)?;
        let _lock = self.lock(&plain_path)?;

        let ciphertext = read_bytes(sealed_path)?;
        let plaintext = legacy::decrypt(&ciphertext, &self.key)?;
        self.check.verify(&plaintext)?;

        self.move_content(sealed_path, &plain_path, &plaintext)?;
        Ok(plain_path)
    }

    /// The destination takes over the source's permissions
    fn move_content(&self, source: &Path, destination: &Path, data: &[u8]) -> KpfResult<()> {
        write_bytes_atomic_like(destination, data, source)?;

        if read_bytes(destination)? != data {
            return Err(KpfError::Io(format!(
                "Verification of {} failed, keeping {}",
                destination.display(),
                source.display()
            )));
        }

        remove_file(source)
    }

    /// Seal and unseal of the same log share `<plain path>.lock`
    fn lock(&self, plain_path: &Path) -> KpfResult<Option<FileLock>> {
        if self.locking {
            FileLock::acquire(plain_path).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// Both suffixes must be non-empty, free of path separators and distinct
pub fn validate_suffixes(plain_suffix: &str, sealed_suffix: &str) -> KpfResult<()> {
    for suffix in [plain_suffix, sealed_suffix] {
        if suffix.is_empty() || suffix.contains('/') || suffix.contains('\\') {
            return Err(KpfError::Validation(format!(
                "Invalid file suffix '{}'",
                suffix
            )));
        }
    }
    if plain_suffix == sealed_suffix {
        return Err(KpfError::Validation(
            "Plain and sealed suffixes must differ".to_string(),
        ));
    }
    Ok(())
}

fn path_str(path: &Path) -> KpfResult<&str> {
    path.to_str().ok_or_else(|| {
        KpfError::Validation(format!("Path is not valid UTF-8: {}", path.display()))
    })
}

fn suffix_mismatch(path: &Path, suffix: &str) -> KpfError {
    KpfError::Validation(format!(
        "{} does not end with '{}'",
        path.display(),
        suffix
    ))
}
