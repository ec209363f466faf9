//! Application configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Autosaved working document. Relative paths are taken from the base directory.
    pub data_file: PathBuf,
    /// Where named backups go
    pub backup_dir: PathBuf,
    /// Generated page
    pub output_file: PathBuf,
    /// Open the generated page in the default browser
    pub open_in_browser: bool,
    /// Escape user text in the generated HTML. Off keeps markup typed by the
    /// editor as markup.
    pub escape_html: bool,
}

/// Absolute file locations, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub data_file: PathBuf,
    pub backup_dir: PathBuf,
    pub output_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("newsletter_data.json"),
            backup_dir: PathBuf::from("backups"),
            output_file: PathBuf::from("newsletter.html"),
            open_in_browser: true,
            escape_html: false,
        }
    }
}

impl AppConfig {
    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "newsletter", "Newsletter")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::load_from(&path)
    }

    /// Load configuration from `path`. A missing file gives the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Resolve the configured locations against `base_dir`
    pub fn resolve(&self, base_dir: &Path) -> StorePaths {
        StorePaths {
            data_file: base_dir.join(&self.data_file),
            backup_dir: base_dir.join(&self.backup_dir),
            output_file: base_dir.join(&self.output_file),
        }
    }
}
