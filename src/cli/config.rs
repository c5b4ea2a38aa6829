//! Configuration CLI commands

use clap::Subcommand;

use crate::audit::AuditLogger;
use crate::config::{paths::KpfPaths, settings::Settings};
use crate::error::KpfResult;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show paths and current settings
    Show,
    /// Change one setting
    Set {
        /// Setting name (key_env, cipher_suite, plain_suffix, sealed_suffix, plaintext_check, lock_files, audit_enabled)
        name: String,
        value: String,
    },
    /// Restore default settings
    Reset,
}

pub fn handle_config_command(
    paths: &KpfPaths,
    settings: &mut Settings,
    cmd: ConfigCommands,
) -> KpfResult<()> {
    match cmd {
        ConfigCommands::Show => {
            println!("KPF Configuration");
            println!("=================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  key_env:         {}", settings.key_env);
            println!("  cipher_suite:    {}", settings.cipher_suite);
            println!("  plain_suffix:    {}", settings.plain_suffix);
            println!("  sealed_suffix:   {}", settings.sealed_suffix);
            println!("  plaintext_check: {}", settings.plaintext_check);
            println!("  lock_files:      {}", settings.lock_files);
            println!("  audit_enabled:   {}", settings.audit_enabled);
        }
        ConfigCommands::Set { name, value } => {
            settings.set(&name, &value)?;
            settings.save(paths)?;
            println!("Set {} = {}", name, value);
        }
        ConfigCommands::Reset => {
            *settings = Settings::default();
            settings.save(paths)?;
            println!("Settings reset to defaults.");
        }
    }

    Ok(())
}

/// Print the most recent audit entries
pub fn handle_log_command(paths: &KpfPaths, limit: usize) -> KpfResult<()> {
    let logger = AuditLogger::new(paths.audit_log());
    let entries = logger.read_recent(limit)?;

    if entries.is_empty() {
        println!("No audit entries.");
        return Ok(());
    }

    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
