//! Legacy AES-256-CBC envelope cipher
//!
//! Byte-compatible with OpenSSL `aes-256-cbc` in base64 mode: PKCS#7
//! padding, IV taken from the key material, ciphertext stored as standard
//! base64 text. The IV never changes for a given key and nothing is
//! authenticated; a wrong key is only caught when the padding check fails,
//! so envelopes validate the plaintext (see `envelope::PlaintextCheck`).

use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use super::key::{EnvelopeKey, IV_SIZE};
use crate::error::{KpfError, KpfResult};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encrypt plaintext into base64 ciphertext text
pub fn encrypt(plaintext: &[u8], key: &EnvelopeKey) -> KpfResult<String> {
    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), &key.iv())
        .map_err(|e| KpfError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    Ok(STANDARD.encode(ciphertext))
}

/// Decrypt base64 ciphertext text
///
/// Surrounding ASCII whitespace (a trailing newline added by an editor) is
/// ignored.
pub fn decrypt(encoded: &[u8], key: &EnvelopeKey) -> KpfResult<Vec<u8>> {
    let ciphertext = STANDARD
        .decode(trim_ascii_whitespace(encoded))
        .map_err(|e| KpfError::Crypto(format!("Invalid ciphertext encoding: {}", e)))?;

    if ciphertext.is_empty() || ciphertext.len() % IV_SIZE != 0 {
        return Err(KpfError::Crypto(format!(
            "Invalid ciphertext length: {} bytes",
            ciphertext.len()
        )));
    }

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), &key.iv())
        .map_err(|e| KpfError::Crypto(format!("Failed to create cipher: {}", e)))?;

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| {
            KpfError::Crypto("Decryption failed: invalid key or corrupted data".to_string())
        })
}

pub(crate) fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> EnvelopeKey {
        EnvelopeKey::from_material(b"0123456789abcdef0123456789abcdef").unwrap()
    }

    #[test]
    fn test_some_wrong_keys_pass_the_padding_check() {
        let wrong = EnvelopeKey::from_material(b"wrongkey-00000000000000000000351").unwrap();
        let garbage = decrypt(b"k9UqsBbfHgv6fqa1leyUXw==", &wrong).unwrap();
        assert_eq!(garbage.len(), 15);
        assert_eq!(&garbage[..4], &[0x91, 0x7f, 0x5d, 0xa8]);
        assert!(std::str::from_utf8(&garbage).is_err());
    }

    #[test]
    fn test_matches_openssl_output() {
        // openssl enc -aes-256-cbc -K <key hex> -iv <first 16 key bytes hex> -base64
        assert_eq!(
            encrypt(b"hello world", &test_key()).unwrap(),
            "k9UqsBbfHgv6fqa1leyUXw=="
        );
        assert_eq!(encrypt(b"", &test_key()).unwrap(), "OK6Do+3SKnHs8pZTnd9zIA==");
    }

    #[test]
    fn test_encrypt_decrypt() {
        let key = test_key();
        let encrypted = encrypt(b"Hello, World!", &key).unwrap();
        let decrypted = decrypt(encrypted.as_bytes(), &key).unwrap();
        assert_eq!(decrypted, b"Hello, World!");
    }

    #[test]
    fn test_empty_plaintext() {
        let key = test_key();
        let encrypted = encrypt(b"", &key).unwrap();
        assert_eq!(decrypt(encrypted.as_bytes(), &key).unwrap(), b"");
    }

    #[test]
    fn test_same_key_same_ciphertext() {
        let key = test_key();
        assert_eq!(
            encrypt(b"repeatable", &key).unwrap(),
            encrypt(b"repeatable", &key).unwrap()
        );
    }

    #[test]
    fn test_wrong_key_fails_padding_check() {
        let wrong = EnvelopeKey::from_material(b"ffffffffffffffffffffffffffffffff").unwrap();
        let err = decrypt(b"k9UqsBbfHgv6fqa1leyUXw==", &wrong).unwrap_err();
        assert!(err.is_crypto());
    }

    #[test]
    fn test_tolerates_trailing_newline() {
        let decrypted = decrypt(b"k9UqsBbfHgv6fqa1leyUXw==\n", &test_key()).unwrap();
        assert_eq!(decrypted, b"hello world");
    }

    #[test]
    fn test_rejects_bad_encoding_and_length() {
        let key = test_key();
        assert!(decrypt(b"not base64!!", &key).unwrap_err().is_crypto());
        assert!(decrypt(b"", &key).unwrap_err().is_crypto());
        // 5 bytes, not a whole block
        assert!(decrypt(b"AAAAAAA=", &key).unwrap_err().is_crypto());
    }

    #[test]
    fn test_large_plaintext() {
        let key = test_key();
        let plaintext: Vec<u8> = (0..10000).map(|i| (i % 256) as u8).collect();
        let encrypted = encrypt(&plaintext, &key).unwrap();
        assert_eq!(decrypt(encrypted.as_bytes(), &key).unwrap(), plaintext);
    }
}
