//! Audit log for envelope operations
//!
//! Every encrypt, decrypt, seal and unseal run through the `kpf` binary is
//! appended to a line-delimited JSON file (JSONL). The library core never
//! writes to it.
//!
//! # Example
//!
//! ```rust,ignore
//! use kpf::audit::{AuditEntry, AuditLogger, AuditResult, Operation};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::new(
//!     Operation::Encrypt,
//!     "notes.kpf",
//!     Some("AES-256-cbc".to_string()),
//!     AuditResult::Success,
//! ))?;
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, AuditResult, Operation};
pub use logger::AuditLogger;
