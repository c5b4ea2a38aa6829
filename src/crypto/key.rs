//! Envelope key material
//!
//! Keys are raw material supplied by the caller, not derived. Material is
//! fitted to the AES-256 key size the way OpenSSL does it: shorter input is
//! zero-padded, longer input is truncated.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{KpfError, KpfResult};

/// AES-256 key size in bytes
pub const KEY_SIZE: usize = 32;

/// AES block / CBC IV size in bytes
pub const IV_SIZE: usize = 16;

/// Symmetric key shared read-only by every envelope operation
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EnvelopeKey {
    key: [u8; KEY_SIZE],
}

impl EnvelopeKey {
    /// Build a key from raw material
    pub fn from_material(material: &[u8]) -> KpfResult<Self> {
        if material.is_empty() {
            return Err(KpfError::Crypto("Key material is empty".to_string()));
        }

        let mut key = [0u8; KEY_SIZE];
        let len = material.len().min(KEY_SIZE);
        key[..len].copy_from_slice(&material[..len]);
        Ok(Self { key })
    }

    /// Read key material from an environment variable
    pub fn from_env(var: &str) -> KpfResult<Self> {
        let value = zeroize::Zeroizing::new(
            std::env::var(var)
                .map_err(|e| KpfError::Config(format!("Key variable {} unreadable: {}", var, e)))?,
        );
        Self::from_material(value.as_bytes())
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// Legacy IV: the leading block of the key material itself
    pub fn iv(&self) -> [u8; IV_SIZE] {
        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(&self.key[..IV_SIZE]);
        iv
    }
}

impl fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EnvelopeKey(<redacted>)")
    }
}
