//! KPF - header format engine and file encryption envelope
//!
//! A KPF document is a `#!! ... ~!!#` header block of typed `@key value`
//! entries followed by a payload. The same header carries the reserved
//! `kpfenc` entry that marks a file as wrapped in an encryption envelope.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `format`: header extraction, parsing, serialization, value coercion and path lookup
//! - `crypto`: key material, the AES-256-CBC and AES-256-GCM suites, key generation
//! - `storage`: whole-file reads, atomic rewrites and advisory locks
//! - `envelope`: in-place encrypt/decrypt and the rotating-suffix variant
//! - `audit`: JSONL audit log of envelope operations
//! - `config`: path resolution and persisted settings
//! - `cli`: handlers behind the `kpf` binary
//! - `error`: custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use kpf::crypto::EnvelopeKey;
//! use kpf::envelope::FileEnvelope;
//!
//! let key = EnvelopeKey::from_env("KPF_KEY")?;
//! FileEnvelope::new(key).encrypt("notes.kpf")?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod format;
pub mod storage;

pub use error::{KpfError, KpfResult};
