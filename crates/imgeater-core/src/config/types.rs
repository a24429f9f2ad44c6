//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on
    pub port: u16,

    /// Multipart field name that carries uploaded files
    pub files_field: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            files_field: "files".to_string(),
        }
    }
}

/// Where originals and thumbnails are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Destination directory (supports `~`)
    pub files_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            files_dir: "files/".to_string(),
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Thumbnail width in pixels
    pub width: u32,

    /// Thumbnail height in pixels
    pub height: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
        }
    }
}

/// Remote URL fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,

    /// User-Agent header sent with every fetch
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            user_agent: format!("imgeater/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
