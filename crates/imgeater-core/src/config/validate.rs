//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    ///
    /// Thumbnail dimensions are deliberately left alone here: a zero size is
    /// reported by the thumbnail stage itself.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be > 0".into(),
            ));
        }
        if self.server.files_field.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.files_field must not be empty".into(),
            ));
        }
        if self.storage.files_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.files_dir must not be empty".into(),
            ));
        }
        if self.remote.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "remote.timeout_ms must be > 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }
}
