//! Cryptographic functions for KPF
//!
//! Provides the envelope key type, the two cipher suites (legacy
//! AES-256-CBC and AES-256-GCM) and random key generation.

pub mod gcm;
pub mod key;
pub mod keygen;
pub mod legacy;
pub mod suite;

pub use key::EnvelopeKey;
pub use keygen::{generate_key, KeyPreset, DEFAULT_KEY_LENGTH};
pub use suite::CipherSuite;
