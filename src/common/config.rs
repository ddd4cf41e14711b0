use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted global settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Ask before a destructive (non-preview) run
    #[serde(default = "default_true")]
    pub delete_confirmation: bool,

    /// Hide operations that would do nothing on this system
    #[serde(default = "default_true")]
    pub auto_hide: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delete_confirmation: true,
            auto_hide: true,
        }
    }
}

impl Settings {
    /// Data directory (~/.scour, or $SCOUR_HOME when set).
    ///
    /// The env override keeps tests and CI away from the real home dir.
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("SCOUR_HOME") {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".scour")
    }

    /// Path of the settings file
    pub fn settings_path() -> PathBuf {
        Self::data_dir().join("settings.toml")
    }

    /// Path of the persisted selection store
    pub fn selections_path() -> PathBuf {
        Self::data_dir().join("selections.toml")
    }

    /// Load settings from file, or defaults if the file does not exist
    pub fn load() -> Result<Self> {
        let path = Self::settings_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings: {}", path.display()))?;
            let settings: Settings = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings, creating the data directory if needed
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path();
        let dir = path.parent().unwrap();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data dir: {}", dir.display()))?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }
}
