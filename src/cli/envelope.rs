//! Envelope CLI commands
//!
//! Encrypt, decrypt, seal and unseal files with the key taken from the
//! environment (or a hidden prompt), recording each run in the audit log.

use std::path::Path;

use crate::audit::{AuditEntry, AuditLogger, AuditResult, Operation};
use crate::config::{paths::KpfPaths, settings::Settings};
use crate::crypto::EnvelopeKey;
use crate::envelope::{self, EnvelopeState, Outcome};
use crate::error::{KpfError, KpfResult};

/// Envelope operation requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeAction {
    Encrypt,
    Decrypt,
    Seal,
    Unseal,
}

impl From<EnvelopeAction> for Operation {
    fn from(action: EnvelopeAction) -> Self {
        match action {
            EnvelopeAction::Encrypt => Operation::Encrypt,
            EnvelopeAction::Decrypt => Operation::Decrypt,
            EnvelopeAction::Seal => Operation::Seal,
            EnvelopeAction::Unseal => Operation::Unseal,
        }
    }
}

/// Run an envelope action against one file
pub fn handle_envelope_command(
    paths: &KpfPaths,
    settings: &Settings,
    key_env: Option<&str>,
    action: EnvelopeAction,
    file: &Path,
) -> KpfResult<()> {
    let key = resolve_key(settings, key_env)?;
    let suite_tag = match action {
        EnvelopeAction::Encrypt | EnvelopeAction::Decrypt => {
            Some(settings.cipher_suite.tag().to_string())
        }
        EnvelopeAction::Seal | EnvelopeAction::Unseal => None,
    };

    let result = run_action(settings, key, action, file);

    if settings.audit_enabled {
        let entry = match &result {
            Ok((outcome, detail)) => {
                let status = match outcome {
                    Outcome::Applied => AuditResult::Success,
                    Outcome::Skipped => AuditResult::Skipped,
                };
                let entry = AuditEntry::new(action.into(), file.display().to_string(), suite_tag, status);
                match detail {
                    Some(detail) => entry.with_detail(detail.clone()),
                    None => entry,
                }
            }
            Err(e) => AuditEntry::new(
                action.into(),
                file.display().to_string(),
                suite_tag,
                AuditResult::Failed,
            )
            .with_detail(e.to_string()),
        };

        if let Err(e) = AuditLogger::new(paths.audit_log()).log(&entry) {
            eprintln!("Warning: could not write audit log: {}", e);
        }
    }

    let (outcome, detail) = result?;
    match (action, outcome) {
        (EnvelopeAction::Encrypt, Outcome::Applied) => {
            println!("Encrypted {} ({})", file.display(), settings.cipher_suite.tag())
        }
        (EnvelopeAction::Encrypt, Outcome::Skipped) => {
            println!("{} is already encrypted, left unchanged", file.display())
        }
        (EnvelopeAction::Decrypt, _) => println!("Decrypted {}", file.display()),
        (EnvelopeAction::Seal, _) | (EnvelopeAction::Unseal, _) => println!(
            "{} -> {}",
            file.display(),
            detail.as_deref().unwrap_or_default()
        ),
    }

    Ok(())
}

fn run_action(
    settings: &Settings,
    key: EnvelopeKey,
    action: EnvelopeAction,
    file: &Path,
) -> KpfResult<(Outcome, Option<String>)> {
    match action {
        EnvelopeAction::Encrypt => Ok((settings.file_envelope(key).encrypt(file)?, None)),
        EnvelopeAction::Decrypt => Ok((settings.file_envelope(key).decrypt(file)?, None)),
        EnvelopeAction::Seal => {
            let sealed = settings.suffix_envelope(key)?.seal(file)?;
            Ok((Outcome::Applied, Some(sealed.display().to_string())))
        }
        EnvelopeAction::Unseal => {
            let plain = settings.suffix_envelope(key)?.unseal(file)?;
            Ok((Outcome::Applied, Some(plain.display().to_string())))
        }
    }
}

/// Print whether a file is plain or wrapped
pub fn show_status(settings: &Settings, file: &Path, json: bool) -> KpfResult<()> {
    let status = envelope::status(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    match (&status.state, &status.suite_tag) {
        (EnvelopeState::Wrapped, Some(tag)) => println!("{}: wrapped ({})", file.display(), tag),
        (state, _) => println!("{}: {}", file.display(), state),
    }

    let sealed = crate::storage::file_io::append_suffix(file, &settings.sealed_suffix);
    if sealed.is_file() {
        println!("  sealed copy present: {}", sealed.display());
    }

    Ok(())
}

/// Key material from the configured variable, or a hidden prompt if unset
pub fn resolve_key(settings: &Settings, key_env: Option<&str>) -> KpfResult<EnvelopeKey> {
    let var = key_env.unwrap_or(&settings.key_env);

    if std::env::var_os(var).is_some() {
        return EnvelopeKey::from_env(var);
    }

    let material = zeroize::Zeroizing::new(
        rpassword::prompt_password(format!("Key ({} not set): ", var))
            .map_err(|e| KpfError::Config(format!("No key in {} and prompt failed: {}", var, e)))?,
    );
    EnvelopeKey::from_material(material.as_bytes())
}
