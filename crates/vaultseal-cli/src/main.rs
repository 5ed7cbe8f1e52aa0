//! VaultSeal CLI - encrypted messages and portable vault files
//!
//! Messages and vault files use the `base64(nonce):base64(ciphertext)`
//! envelope, keyed either by a shared password or by a raw 256-bit hex key.
//! Stdout only ever carries envelope text or decrypted output; logs go to
//! stderr.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vaultseal_core::KeyMode;

/// VaultSeal - AES-256-GCM envelopes for messages and vault backups
#[derive(Parser)]
#[command(name = "vaultseal")]
#[command(version)]
#[command(about = "VaultSeal - AES-256-GCM envelopes for messages and vault backups")]
struct Args {
    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding settings.json
    #[arg(long, global = true, env = "VAULTSEAL_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a fresh random 256-bit key as hex
    Keygen,

    /// Encrypt a message (argument or stdin) into envelope text
    Encrypt {
        #[command(flatten)]
        key: KeyArgs,

        /// Message to encrypt; read from stdin when omitted
        message: Option<String>,
    },

    /// Decrypt envelope text (argument or stdin)
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,

        /// Envelope text; read from stdin when omitted
        envelope: Option<String>,
    },

    /// Manage the local encrypted vault store
    #[command(subcommand)]
    Vault(VaultCommand),

    /// Show or change saved defaults
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the current settings
    Show,

    /// Change saved defaults
    Set {
        /// Key mode used when --mode is not given
        #[arg(long)]
        default_key_mode: Option<KeyMode>,

        /// File name written by `vault export` without --out
        #[arg(long)]
        export_file_name: Option<String>,

        /// Directory of the local encrypted store
        #[arg(long)]
        store_dir: Option<PathBuf>,
    },

    /// Restore defaults and delete the settings file
    Reset,
}

#[derive(Subcommand)]
enum VaultCommand {
    /// List stored secret names
    List {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Store a secret (content prompted when omitted)
    Put {
        #[command(flatten)]
        store: StoreArgs,

        name: String,

        content: Option<String>,
    },

    /// Print a stored secret
    Get {
        #[command(flatten)]
        store: StoreArgs,

        name: String,
    },

    /// Remove a stored secret
    Delete {
        #[command(flatten)]
        store: StoreArgs,

        name: String,
    },

    /// Write every stored secret into a single encrypted vault file
    Export {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        key: KeyArgs,

        /// Output file (defaults to the configured export file name)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Decrypt a vault file and add its secrets to the store
    Import {
        #[command(flatten)]
        store: StoreArgs,

        #[command(flatten)]
        key: KeyArgs,

        /// Vault file produced by `vault export`
        file: PathBuf,
    },
}

/// Which key seals the envelope
#[derive(clap::Args)]
pub(crate) struct KeyArgs {
    /// Key mode: `password` or `raw-hex` (defaults to raw-hex when --key-hex is given)
    #[arg(long)]
    pub mode: Option<KeyMode>,

    /// Shared password (prompted when needed and not given)
    #[arg(long, env = "VAULTSEAL_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Raw 256-bit key as 64 hex digits (see `vaultseal keygen`)
    #[arg(long, env = "VAULTSEAL_KEY", hide_env_values = true)]
    pub key_hex: Option<String>,
}

/// How to open the local store
#[derive(clap::Args)]
pub(crate) struct StoreArgs {
    /// Password protecting the local store (prompted when not given)
    #[arg(long, env = "VAULTSEAL_STORE_PASSWORD", hide_env_values = true)]
    pub store_password: Option<String>,

    /// Store directory (overrides settings and the platform default)
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut ctx = commands::Context::load(args.config_dir)?;

    match args.command {
        Command::Keygen => commands::keygen(),
        Command::Encrypt { key, message } => commands::encrypt(&ctx, key, message).await,
        Command::Decrypt { key, envelope } => commands::decrypt(&ctx, key, envelope).await,
        Command::Vault(command) => match command {
            VaultCommand::List { store } => commands::vault_list(&ctx, store).await,
            VaultCommand::Put {
                store,
                name,
                content,
            } => commands::vault_put(&ctx, store, &name, content).await,
            VaultCommand::Get { store, name } => commands::vault_get(&ctx, store, &name).await,
            VaultCommand::Delete { store, name } => {
                commands::vault_delete(&ctx, store, &name).await
            }
            VaultCommand::Export { store, key, out } => {
                commands::vault_export(&ctx, store, key, out).await
            }
            VaultCommand::Import { store, key, file } => {
                commands::vault_import(&ctx, store, key, &file).await
            }
        },
        Command::Config(command) => match command {
            ConfigCommand::Show => commands::config_show(&ctx),
            ConfigCommand::Set {
                default_key_mode,
                export_file_name,
                store_dir,
            } => {
                commands::config_set(&mut ctx, default_key_mode, export_file_name, store_dir)
                    .await
            }
            ConfigCommand::Reset => commands::config_reset(&mut ctx).await,
        },
    }
}
