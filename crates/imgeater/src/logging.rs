//! Subscriber setup for the service and CLI.
//!
//! Events go to stderr; stdout carries command output only.

use imgeater_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output encoding of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Resolved logging settings after CLI flags are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Default directive when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// `--verbose` raises the level to at least debug, `--json-logs` forces JSON.
    pub fn resolve(config: &Config, verbose: bool, json_logs: bool) -> Self {
        let configured = config.logging.level.as_str();
        let level = if verbose && !matches!(configured, "debug" | "trace") {
            "debug"
        } else {
            configured
        };
        let format = if json_logs || config.logging.format == "json" {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };
        Self {
            level: level.to_string(),
            format,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `settings.level`.
pub fn init(settings: &LogSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let registry = tracing_subscriber::registry().with(filter);

    match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(level: &str, format: &str) -> Config {
        let mut config = Config::default();
        config.logging.level = level.to_string();
        config.logging.format = format.to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let settings = LogSettings::resolve(&Config::default(), false, false);
        assert_eq!(settings.level, "info");
        assert_eq!(settings.format, LogFormat::Pretty);
    }

    #[test]
    fn test_verbose_raises_level() {
        assert_eq!(LogSettings::resolve(&config("warn", "pretty"), true, false).level, "debug");
        assert_eq!(LogSettings::resolve(&config("trace", "pretty"), true, false).level, "trace");
    }

    #[test]
    fn test_json_from_flag_or_config() {
        let flag = LogSettings::resolve(&config("info", "pretty"), false, true);
        assert_eq!(flag.format, LogFormat::Json);
        let file = LogSettings::resolve(&config("info", "json"), false, false);
        assert_eq!(file.format, LogFormat::Json);
    }
}
