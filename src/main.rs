use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use kpf::cli::{
    handle_config_command, handle_envelope_command, handle_keygen, handle_log_command,
    show_content, show_entry, show_header, show_parsed, show_status, ConfigCommands,
    EnvelopeAction,
};
use kpf::config::{paths::KpfPaths, settings::Settings};
use kpf::crypto::DEFAULT_KEY_LENGTH;

#[derive(Parser)]
#[command(
    name = "kpf",
    version,
    about = "Read KPF headers and encrypt files in place",
    long_about = "kpf inspects documents that start with a #!! ... ~!!# header block \
                  and wraps whole files in an encrypted envelope marked by the \
                  reserved @kpfenc header entry."
)]
struct Cli {
    /// Environment variable holding the key material (overrides settings)
    #[arg(long, global = true, value_name = "VAR")]
    key_env: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the raw header block
    Header { file: PathBuf },

    /// Print the payload after the header
    Content { file: PathBuf },

    /// Print the parsed header as JSON
    Parse { file: PathBuf },

    /// Look up an entry by path, e.g. `level#~>type`
    Get {
        file: PathBuf,
        path: String,
        /// Print the entry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encrypt a file in place (no-op if already encrypted)
    Encrypt { file: PathBuf },

    /// Decrypt a file in place
    Decrypt { file: PathBuf },

    /// Show whether a file is plain or encrypted
    Status {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// Encrypt `x.log` into `x.log.kpc` and remove the original
    Seal { file: PathBuf },

    /// Decrypt `x.log.kpc` back into `x.log` and remove the sealed file
    Unseal { file: PathBuf },

    /// Generate a random key
    Keygen {
        /// Character set preset (1-9)
        #[arg(short, long, default_value_t = 5)]
        preset: u8,
        /// Number of characters
        #[arg(short, long, default_value_t = DEFAULT_KEY_LENGTH)]
        length: usize,
        /// List the presets instead of generating a key
        #[arg(long)]
        list: bool,
    },

    /// Show recent audit log entries
    Log {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = KpfPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    let key_env = cli.key_env.as_deref();

    match cli.command {
        Some(Commands::Header { file }) => show_header(&file)?,
        Some(Commands::Content { file }) => show_content(&file)?,
        Some(Commands::Parse { file }) => show_parsed(&file)?,
        Some(Commands::Get { file, path, json }) => show_entry(&file, &path, json)?,
        Some(Commands::Encrypt { file }) => {
            handle_envelope_command(&paths, &settings, key_env, EnvelopeAction::Encrypt, &file)?
        }
        Some(Commands::Decrypt { file }) => {
            handle_envelope_command(&paths, &settings, key_env, EnvelopeAction::Decrypt, &file)?
        }
        Some(Commands::Status { file, json }) => show_status(&settings, &file, json)?,
        Some(Commands::Seal { file }) => {
            handle_envelope_command(&paths, &settings, key_env, EnvelopeAction::Seal, &file)?
        }
        Some(Commands::Unseal { file }) => {
            handle_envelope_command(&paths, &settings, key_env, EnvelopeAction::Unseal, &file)?
        }
        Some(Commands::Keygen {
            preset,
            length,
            list,
        }) => handle_keygen(preset, length, list)?,
        Some(Commands::Log { limit }) => handle_log_command(&paths, limit)?,
        Some(Commands::Config(cmd)) => handle_config_command(&paths, &mut settings, cmd)?,
        None => {
            println!("kpf - KPF header reader and file envelope");
            println!();
            println!("Run 'kpf --help' for usage information.");
        }
    }

    Ok(())
}
