//! Cipher suites
//!
//! A suite pairs a cipher with the type tag written into the synthesized
//! envelope header. The suite is fixed when an envelope is built; documents
//! are never probed for other suites.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::key::EnvelopeKey;
use super::{gcm, legacy};
use crate::error::{KpfError, KpfResult};
use crate::format::{serialize_header, Entry, Header, Value, ENVELOPE_FLAG_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CipherSuite {
    /// OpenSSL-compatible AES-256-CBC, IV from the key
    #[default]
    #[serde(rename = "aes-256-cbc")]
    Aes256Cbc,
    /// AES-256-GCM with a random nonce per encryption
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

impl CipherSuite {
    pub const ALL: [CipherSuite; 2] = [CipherSuite::Aes256Cbc, CipherSuite::Aes256Gcm];

    /// Configuration name
    pub fn name(&self) -> &'static str {
        match self {
            CipherSuite::Aes256Cbc => "aes-256-cbc",
            CipherSuite::Aes256Gcm => "aes-256-gcm",
        }
    }

    /// Type tag carried by the `kpfenc` header entry
    pub fn tag(&self) -> &'static str {
        match self {
            CipherSuite::Aes256Cbc => "AES-256-cbc",
            CipherSuite::Aes256Gcm => "AES-256-gcm",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|suite| suite.tag() == tag)
    }

    /// Whether decryption detects a wrong key or tampering on its own
    pub fn is_authenticated(&self) -> bool {
        matches!(self, CipherSuite::Aes256Gcm)
    }

    /// The exact header written on encryption and required on decryption
    pub fn header(&self) -> String {
        let mut header = Header::new();
        header.set(
            ENVELOPE_FLAG_KEY.to_string(),
            Entry::Flagged {
                enable: Value::Bool(true),
                kind: self.tag().to_string(),
            },
        );
        serialize_header(&header)
    }

    pub fn encrypt(&self, plaintext: &[u8], key: &EnvelopeKey) -> KpfResult<String> {
        match self {
            CipherSuite::Aes256Cbc => legacy::encrypt(plaintext, key),
            CipherSuite::Aes256Gcm => gcm::encrypt(plaintext, key),
        }
    }

    pub fn decrypt(&self, encoded: &[u8], key: &EnvelopeKey) -> KpfResult<Vec<u8>> {
        match self {
            CipherSuite::Aes256Cbc => legacy::decrypt(encoded, key),
            CipherSuite::Aes256Gcm => gcm::decrypt(encoded, key),
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts either the configuration name or the header tag, any case
impl FromStr for CipherSuite {
    type Err = KpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|suite| suite.name().eq_ignore_ascii_case(s) || suite.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                KpfError::Validation(format!(
                    "Unknown cipher suite '{}' (expected aes-256-cbc or aes-256-gcm)",
                    s
                ))
            })
    }
}
