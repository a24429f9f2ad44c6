//! Configuration management for imgeater.
//!
//! Configuration is read from a TOML file; every section falls back to its
//! defaults, and a missing file yields the default configuration.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for imgeater.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP service settings
    pub server: ServerConfig,

    /// Destination directory settings
    pub storage: StorageConfig,

    /// Thumbnail generation settings
    pub thumbnail: ThumbnailConfig,

    /// Remote fetch settings
    pub remote: RemoteConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from a specific file path.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("Config file {:?} is missing, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.imgeater.imgeater/config.toml
    /// - Linux: ~/.config/imgeater/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\imgeater\config\config.toml
    ///
    /// Falls back to ./config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "imgeater", "imgeater")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Destination directory with `~` expanded.
    pub fn files_dir(&self) -> String {
        shellexpand::tilde(&self.storage.files_dir).into_owned()
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
