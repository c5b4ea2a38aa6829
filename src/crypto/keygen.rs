//! Random key generation
//!
//! Keys are drawn uniformly from one of nine fixed character sets. Preset 5
//! (alphanumeric) at 32 characters gives material that fills an AES-256 key
//! exactly.

use rand::rngs::OsRng;
use rand::Rng;
use zeroize::Zeroizing;

use crate::error::{KpfError, KpfResult};

const CHARSETS: [&str; 9] = [
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-( )'!@#$%^&*",
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-( )'!",
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-( )",
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-",
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "abcdefghijklmnopqrstuvwxyz",
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz0123456789",
];

/// Default generated key length
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// One of the numbered character-set presets (1 through 9)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPreset(u8);

impl KeyPreset {
    pub fn new(number: u8) -> KpfResult<Self> {
        if number == 0 || usize::from(number) > CHARSETS.len() {
            return Err(KpfError::Validation(format!(
                "Invalid key preset {} (choose a number between 1 and {})",
                number,
                CHARSETS.len()
            )));
        }
        Ok(Self(number))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    pub fn charset(&self) -> &'static str {
        CHARSETS[usize::from(self.0) - 1]
    }

    /// All presets, in order
    pub fn all() -> impl Iterator<Item = KeyPreset> {
        (1..=CHARSETS.len() as u8).map(KeyPreset)
    }
}

impl Default for KeyPreset {
    fn default() -> Self {
        Self(5)
    }
}

/// Generate a random key of `length` characters from the preset's charset
pub fn generate_key(preset: KeyPreset, length: usize) -> KpfResult<Zeroizing<String>> {
    if length == 0 {
        return Err(KpfError::Validation(
            "Key length must be greater than zero".to_string(),
        ));
    }

    let charset = preset.charset().as_bytes();
    let mut rng = OsRng;
    let key: String = (0..length)
        .map(|_| char::from(charset[rng.gen_range(0..charset.len())]))
        .collect();

    Ok(Zeroizing::new(key))
}
