//! Configuration module for KPF
//!
//! - XDG-compliant path resolution
//! - Persisted user settings (key source, cipher suite, suffixes)

pub mod paths;
pub mod settings;

pub use paths::KpfPaths;
pub use settings::Settings;
