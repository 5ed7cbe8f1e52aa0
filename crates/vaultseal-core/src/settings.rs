//! Application settings management
//!
//! Stores non-sensitive defaults in a plain JSON file. No key material,
//! password or secret content is ever written here.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::crypto::KeyMode;
use crate::error::{Result, SealError};

/// Default name of an exported vault file
pub const DEFAULT_EXPORT_FILE_NAME: &str = "vaultseal_vault.enc";

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Key mode used when none is given explicitly
    pub default_key_mode: KeyMode,
    /// File name used by vault export when no path is given
    pub export_file_name: String,
    /// Override for the encrypted store directory
    pub store_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            default_key_mode: KeyMode::Password,
            export_file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            store_dir: None,
        }
    }
}

/// Get the default configuration directory
pub fn default_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("dev", "vaultseal", "vaultseal")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| SealError::Storage("Could not determine config directory".to_string()))
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Create a new settings manager, falling back to defaults if the file
    /// is missing or unreadable
    pub fn new(config_dir: &Path) -> Self {
        let settings_file = config_dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file).unwrap_or_else(|e| {
            debug!("Ignoring unreadable settings file: {}", e);
            Settings::default()
        });

        Self {
            settings_file,
            settings,
        }
    }

    /// Load settings from file
    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(&self.settings)?;

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Path of the backing settings file
    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Get mutable settings
    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Reset settings to defaults and delete settings file
    pub async fn reset(&mut self) -> Result<()> {
        self.settings = Settings::default();

        if self.settings_file.exists() {
            tokio::fs::remove_file(&self.settings_file)
                .await
                .map_err(|e| SealError::Storage(e.to_string()))?;
        }

        Ok(())
    }
}
