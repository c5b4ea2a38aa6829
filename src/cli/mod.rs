//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the library.

pub mod config;
pub mod envelope;
pub mod inspect;
pub mod keygen;

pub use config::{handle_config_command, handle_log_command, ConfigCommands};
pub use envelope::{handle_envelope_command, resolve_key, show_status, EnvelopeAction};
pub use inspect::{show_content, show_entry, show_header, show_parsed};
pub use keygen::handle_keygen;
