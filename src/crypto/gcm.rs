//! AES-256-GCM envelope cipher
//!
//! Authenticated alternative to the legacy suite. Each encryption draws a
//! fresh nonce, stored in front of the ciphertext:
//! `base64(nonce || ciphertext || tag)`.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};

use super::key::EnvelopeKey;
use super::legacy::trim_ascii_whitespace;
use crate::error::{KpfError, KpfResult};

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the authentication tag in bytes
const TAG_SIZE: usize = 16;

/// Encrypt plaintext using AES-256-GCM
pub fn encrypt(plaintext: &[u8], key: &EnvelopeKey) -> KpfResult<String> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| KpfError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| KpfError::Crypto(format!("Encryption failed: {}", e)))?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(sealed))
}

/// Decrypt ciphertext produced by [`encrypt`]
pub fn decrypt(encoded: &[u8], key: &EnvelopeKey) -> KpfResult<Vec<u8>> {
    let sealed = STANDARD
        .decode(trim_ascii_whitespace(encoded))
        .map_err(|e| KpfError::Crypto(format!("Invalid ciphertext encoding: {}", e)))?;

    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(KpfError::Crypto(format!(
            "Ciphertext too short: {} bytes",
            sealed.len()
        )));
    }
    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| KpfError::Crypto(format!("Failed to create cipher: {}", e)))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| {
            KpfError::Crypto("Decryption failed: invalid key or corrupted data".to_string())
        })
}
