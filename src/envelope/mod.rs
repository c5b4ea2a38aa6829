//! Encryption envelope
//!
//! A document is either `Plain` or `Wrapped`. Wrapped documents start with a
//! header holding the `kpfenc` entry, followed by ciphertext text.
//!
//! - `FileEnvelope` rewrites one path in place and gates on the header flag.
//! - `SuffixEnvelope` moves content between `x.log` and `x.log.kpc` and
//!   never looks at headers.
//!
//! Every operation reads the whole document once and, on success, rewrites
//! it once. Nothing is written when an operation fails.

pub mod file;
pub mod suffix;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KpfError, KpfResult};
use crate::format::{extract_header, has_envelope_flag, parse_header, ENVELOPE_FLAG_KEY, SEPARATOR};
use crate::storage::read_bytes;

pub use file::FileEnvelope;
pub use suffix::SuffixEnvelope;

/// The two states of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeState {
    Plain,
    Wrapped,
}

impl EnvelopeState {
    /// Detect the state of a document from its bytes
    pub fn of(doc: &[u8]) -> Self {
        if has_envelope_flag(doc) {
            EnvelopeState::Wrapped
        } else {
            EnvelopeState::Plain
        }
    }
}

impl fmt::Display for EnvelopeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeState::Plain => write!(f, "plain"),
            EnvelopeState::Wrapped => write!(f, "wrapped"),
        }
    }
}

/// What an envelope operation did to the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was rewritten
    Applied,
    /// The file was already in the target state and left alone
    Skipped,
}

/// Check applied to plaintext recovered without authentication
///
/// The legacy cipher carries no tag. A wrong key is usually caught by the
/// padding check, but about one key in 256 yields garbage with valid
/// padding. Requiring UTF-8 text turns nearly all of those into a `Crypto`
/// error; binary payloads need `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaintextCheck {
    #[default]
    Utf8,
    Off,
}

impl PlaintextCheck {
    pub fn name(&self) -> &'static str {
        match self {
            PlaintextCheck::Utf8 => "utf8",
            PlaintextCheck::Off => "off",
        }
    }

    pub fn verify(&self, plaintext: &[u8]) -> KpfResult<()> {
        match self {
            PlaintextCheck::Utf8 => std::str::from_utf8(plaintext).map(|_| ()).map_err(|_| {
                KpfError::Crypto(
                    "Decryption failed: plaintext is not valid UTF-8 (invalid key or corrupted data)"
                        .to_string(),
                )
            }),
            PlaintextCheck::Off => Ok(()),
        }
    }
}

impl fmt::Display for PlaintextCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlaintextCheck {
    type Err = KpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(PlaintextCheck::Utf8),
            "off" | "none" => Ok(PlaintextCheck::Off),
            _ => Err(KpfError::Validation(format!(
                "Unknown plaintext check '{}' (expected utf8 or off)",
                s
            ))),
        }
    }
}

/// State of a document plus the suite tag its header announces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeStatus {
    pub state: EnvelopeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suite_tag: Option<String>,
}

impl EnvelopeStatus {
    pub fn of(doc: &[u8]) -> Self {
        let state = EnvelopeState::of(doc);
        let suite_tag = match state {
            EnvelopeState::Plain => None,
            EnvelopeState::Wrapped => extract_header(doc)
                .and_then(parse_header)
                .ok()
                .and_then(|header| header.lookup(&format!("{}{}type", ENVELOPE_FLAG_KEY, SEPARATOR)))
                .and_then(|entry| entry.as_value().and_then(|v| v.as_str().map(str::to_string))),
        };
        Self { state, suite_tag }
    }
}

/// Read a file and report its envelope status
pub fn status(path: impl AsRef<Path>) -> KpfResult<EnvelopeStatus> {
    let doc = read_bytes(path)?;
    Ok(EnvelopeStatus::of(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_state_of() {
        assert_eq!(EnvelopeState::of(b"hello"), EnvelopeState::Plain);
        assert_eq!(
            EnvelopeState::of(b"#!!\n@title notes\n~!!#\nbody"),
            EnvelopeState::Plain
        );
        assert_eq!(
            EnvelopeState::of(b"#!!\n    @kpfenc true#~>AES-256-cbc\n~!!#\nabc"),
            EnvelopeState::Wrapped
        );
    }

    #[test]
    fn test_status_reports_suite_tag() {
        let status = EnvelopeStatus::of(b"#!!\n    @kpfenc true#~>AES-256-gcm\n~!!#\nabc");
        assert_eq!(status.state, EnvelopeState::Wrapped);
        assert_eq!(status.suite_tag.as_deref(), Some("AES-256-gcm"));

        let status = EnvelopeStatus::of(b"#!!\n@kpfenc yes\n~!!#\n");
        assert_eq!(status.state, EnvelopeState::Wrapped);
        assert_eq!(status.suite_tag, None);

        assert_eq!(EnvelopeStatus::of(b"plain").suite_tag, None);
    }

    #[test]
    fn test_status_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.txt");
        fs::write(&path, "just text").unwrap();

        assert_eq!(status(&path).unwrap().state, EnvelopeState::Plain);
        assert!(status(temp_dir.path().join("missing")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_plaintext_check() {
        assert!(PlaintextCheck::Utf8.verify("héllo".as_bytes()).is_ok());
        assert!(PlaintextCheck::Utf8.verify(b"").is_ok());
        assert!(PlaintextCheck::Utf8.verify(&[0x91, 0x7f, 0x5d]).unwrap_err().is_crypto());
        assert!(PlaintextCheck::Off.verify(&[0x91, 0x7f, 0x5d]).is_ok());

        assert_eq!("UTF-8".parse::<PlaintextCheck>().unwrap(), PlaintextCheck::Utf8);
        assert_eq!("off".parse::<PlaintextCheck>().unwrap(), PlaintextCheck::Off);
        assert!("ascii".parse::<PlaintextCheck>().is_err());
        assert_eq!(serde_json::to_string(&PlaintextCheck::Off).unwrap(), "\"off\"");
    }

    #[test]
    fn test_status_serializes() {
        let status = EnvelopeStatus {
            state: EnvelopeState::Wrapped,
            suite_tag: Some("AES-256-cbc".into()),
        };
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            r#"{"state":"wrapped","suite_tag":"AES-256-cbc"}"#
        );
    }
}
