//! Subcommand handlers

use anyhow::{bail, Context as _, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use vaultseal_core::{
    decrypt_string, default_config_dir, encrypt_string, export_from_store, generate_raw_key_hex,
    import_into_store, EncryptedFileVaultStore, KeyMode, KeySource, SealError, Settings,
    SettingsManager, SymmetricKey, VaultStore,
};

use crate::{KeyArgs, StoreArgs};

/// Settings shared by every subcommand
pub struct Context {
    settings_manager: SettingsManager,
}

impl Context {
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self> {
        let config_dir = match config_dir {
            Some(dir) => dir,
            None => default_config_dir()?,
        };
        let settings_manager = SettingsManager::new(&config_dir);
        debug!("Using settings from {:?}", settings_manager.settings_file());
        Ok(Self { settings_manager })
    }

    fn settings(&self) -> &Settings {
        self.settings_manager.get()
    }
}

pub fn config_show(ctx: &Context) -> Result<()> {
    eprintln!(
        "Settings file: {}",
        ctx.settings_manager.settings_file().display()
    );
    println!("{}", serde_json::to_string_pretty(ctx.settings())?);
    Ok(())
}

pub async fn config_set(
    ctx: &mut Context,
    default_key_mode: Option<KeyMode>,
    export_file_name: Option<String>,
    store_dir: Option<PathBuf>,
) -> Result<()> {
    if default_key_mode.is_none() && export_file_name.is_none() && store_dir.is_none() {
        bail!("Nothing to change: pass --default-key-mode, --export-file-name or --store-dir");
    }

    let settings = ctx.settings_manager.get_mut();
    if let Some(mode) = default_key_mode {
        settings.default_key_mode = mode;
    }
    if let Some(name) = export_file_name {
        settings.export_file_name = name;
    }
    if let Some(dir) = store_dir {
        settings.store_dir = Some(dir);
    }

    ctx.settings_manager.save().await?;
    info!("Saved settings");
    Ok(())
}

pub async fn config_reset(ctx: &mut Context) -> Result<()> {
    ctx.settings_manager.reset().await?;
    eprintln!("Settings reset to defaults");
    Ok(())
}

pub fn keygen() -> Result<()> {
    println!("{}", generate_raw_key_hex());
    Ok(())
}

pub async fn encrypt(ctx: &Context, key: KeyArgs, message: Option<String>) -> Result<()> {
    let message = match message {
        Some(message) => message,
        None => strip_trailing_newline(read_stdin()?),
    };
    let key = resolve_key(key_source(key, ctx.settings().default_key_mode)?).await?;

    println!("{}", encrypt_string(&message, &key)?);
    Ok(())
}

pub async fn decrypt(ctx: &Context, key: KeyArgs, envelope: Option<String>) -> Result<()> {
    let envelope = match envelope {
        Some(envelope) => envelope,
        None => read_stdin()?,
    };
    let key = resolve_key(key_source(key, ctx.settings().default_key_mode)?).await?;

    match decrypt_string(&envelope, &key) {
        Ok(plaintext) => {
            println!("{}", plaintext);
            Ok(())
        }
        Err(SealError::AuthenticationFailure) => {
            bail!("Decryption failed: wrong key or corrupted message")
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn vault_list(ctx: &Context, store: StoreArgs) -> Result<()> {
    let store = open_store(ctx, store).await?;
    for name in store.list().await? {
        println!("{}", name);
    }
    Ok(())
}

pub async fn vault_put(
    ctx: &Context,
    store: StoreArgs,
    name: &str,
    content: Option<String>,
) -> Result<()> {
    let store = open_store(ctx, store).await?;
    let content = match content {
        Some(content) => content,
        None => rpassword::prompt_password(format!("Secret for '{}': ", name))?,
    };

    store.put(name, &content).await?;
    info!("Stored secret {}", name);
    Ok(())
}

pub async fn vault_get(ctx: &Context, store: StoreArgs, name: &str) -> Result<()> {
    let store = open_store(ctx, store).await?;
    println!("{}", store.get(name).await?);
    Ok(())
}

pub async fn vault_delete(ctx: &Context, store: StoreArgs, name: &str) -> Result<()> {
    let store = open_store(ctx, store).await?;
    store.delete(name).await?;
    Ok(())
}

pub async fn vault_export(
    ctx: &Context,
    store: StoreArgs,
    key: KeyArgs,
    out: Option<PathBuf>,
) -> Result<()> {
    let store = open_store(ctx, store).await?;
    let key = resolve_key(key_source(key, ctx.settings().default_key_mode)?).await?;

    let text = export_from_store(&store, &key).await?;

    let out = out.unwrap_or_else(|| PathBuf::from(&ctx.settings().export_file_name));
    tokio::fs::write(&out, text)
        .await
        .with_context(|| format!("Failed to write vault file {:?}", out))?;

    eprintln!("Vault exported to {}", out.display());
    Ok(())
}

pub async fn vault_import(ctx: &Context, store: StoreArgs, key: KeyArgs, file: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read vault file {:?}", file))?;

    let store = open_store(ctx, store).await?;
    let key = resolve_key(key_source(key, ctx.settings().default_key_mode)?).await?;

    let report = match import_into_store(&store, &text, &key).await {
        Ok(report) => report,
        Err(SealError::AuthenticationFailure) => {
            bail!("Import failed: wrong key or corrupted vault file")
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!(
        "Imported {} of {} entries",
        report.imported.len(),
        report.total()
    );
    for (name, reason) in &report.failed {
        eprintln!("  failed: {} ({})", name, reason);
    }
    Ok(())
}

/// Pick the key mode and collect its input, prompting when missing
fn key_source(args: KeyArgs, default_mode: KeyMode) -> Result<KeySource> {
    let mode = select_mode(&args, default_mode);

    let source = match mode {
        KeyMode::Password => {
            let password = match args.password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")?,
            };
            KeySource::password(password)
        }
        KeyMode::RawHex => {
            let key_hex = match args.key_hex {
                Some(key_hex) => key_hex,
                None => rpassword::prompt_password("Key (hex): ")?,
            };
            KeySource::raw_hex(key_hex)
        }
    };
    Ok(source)
}

/// An explicit `--mode` wins; a lone `--key-hex` implies raw-hex
fn select_mode(args: &KeyArgs, default_mode: KeyMode) -> KeyMode {
    match (args.mode, &args.password, &args.key_hex) {
        (Some(mode), _, _) => mode,
        (None, None, Some(_)) => KeyMode::RawHex,
        (None, Some(_), None) => KeyMode::Password,
        _ => default_mode,
    }
}

/// PBKDF2 is CPU-bound, keep it off the async workers
async fn resolve_key(source: KeySource) -> Result<SymmetricKey> {
    let mode = source.mode();
    let key = tokio::task::spawn_blocking(move || source.resolve())
        .await
        .context("Key resolution task failed")??;

    debug!("Resolved {} key", mode);
    Ok(key)
}

async fn open_store(ctx: &Context, args: StoreArgs) -> Result<EncryptedFileVaultStore> {
    let password = match args.store_password {
        Some(password) => password,
        None => rpassword::prompt_password("Store password: ")?,
    };
    let store_key = resolve_key(KeySource::password(password)).await?;

    let opened = match args.store_dir.or_else(|| ctx.settings().store_dir.clone()) {
        Some(dir) => EncryptedFileVaultStore::open_in(dir, store_key).await,
        None => EncryptedFileVaultStore::open(store_key).await,
    };

    match opened {
        Ok(store) => {
            debug!("Opened store at {:?}", store.storage_dir());
            Ok(store)
        }
        Err(SealError::AuthenticationFailure) => bail!("Wrong store password"),
        Err(e) => Err(e.into()),
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read stdin")?;
    Ok(input)
}

/// Drop the single line ending a shell pipe adds
fn strip_trailing_newline(mut input: String) -> String {
    if input.ends_with('\n') {
        input.pop();
        if input.ends_with('\r') {
            input.pop();
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_args(mode: Option<KeyMode>, password: Option<&str>, key_hex: Option<&str>) -> KeyArgs {
        KeyArgs {
            mode,
            password: password.map(str::to_string),
            key_hex: key_hex.map(str::to_string),
        }
    }

    #[test]
    fn test_select_mode() {
        let default = KeyMode::Password;

        assert_eq!(select_mode(&key_args(None, None, None), default), KeyMode::Password);
        assert_eq!(
            select_mode(&key_args(None, None, None), KeyMode::RawHex),
            KeyMode::RawHex
        );
        assert_eq!(
            select_mode(&key_args(None, None, Some("ab")), default),
            KeyMode::RawHex
        );
        assert_eq!(
            select_mode(&key_args(None, Some("pw"), None), KeyMode::RawHex),
            KeyMode::Password
        );
        assert_eq!(
            select_mode(&key_args(Some(KeyMode::Password), None, Some("ab")), default),
            KeyMode::Password
        );
    }

    #[test]
    fn test_key_source_uses_given_input() {
        let source = key_source(key_args(None, None, Some("zz")), KeyMode::Password).unwrap();
        assert_eq!(source.mode(), KeyMode::RawHex);
        assert!(matches!(source.resolve(), Err(SealError::MalformedKey(_))));
    }

    #[tokio::test]
    async fn test_config_set_persists_and_reset_clears() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut ctx = Context::load(Some(temp_dir.path().to_path_buf())).unwrap();

        config_set(
            &mut ctx,
            Some(KeyMode::RawHex),
            Some("backup.enc".to_string()),
            None,
        )
        .await
        .unwrap();

        let reloaded = Context::load(Some(temp_dir.path().to_path_buf())).unwrap();
        assert_eq!(reloaded.settings().default_key_mode, KeyMode::RawHex);
        assert_eq!(reloaded.settings().export_file_name, "backup.enc");
        assert!(reloaded.settings().store_dir.is_none());

        config_reset(&mut ctx).await.unwrap();
        assert_eq!(ctx.settings(), &Settings::default());
        assert!(!temp_dir.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn test_config_set_requires_a_change() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut ctx = Context::load(Some(temp_dir.path().to_path_buf())).unwrap();

        assert!(config_set(&mut ctx, None, None, None).await.is_err());
        assert!(!temp_dir.path().join("settings.json").exists());
    }

    #[test]
    fn test_strip_trailing_newline() {
        assert_eq!(strip_trailing_newline("hello\n".to_string()), "hello");
        assert_eq!(strip_trailing_newline("hello\r\n".to_string()), "hello");
        assert_eq!(strip_trailing_newline("hello\n\n".to_string()), "hello\n");
        assert_eq!(strip_trailing_newline("hello".to_string()), "hello");
    }
}
