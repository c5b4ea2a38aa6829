//! Storage layer for KPF
//!
//! Whole-file reads, atomic rewrites and advisory locks for documents.

pub mod file_io;
pub mod lock;

pub use file_io::{exists, read_bytes, remove_file, write_bytes_atomic, write_bytes_atomic_like};
pub use lock::FileLock;
