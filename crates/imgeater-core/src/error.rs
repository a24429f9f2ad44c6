//! Error types for the imgeater ingestion pipeline.
//!
//! Ingestion errors carry enough context (paths, URLs, declared formats) to be
//! logged as-is and mapped to a transport-level failure by the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for imgeater operations.
#[derive(Error, Debug)]
pub enum EaterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Ingestion errors
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while ingesting a single image.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Declared format is missing, malformed, or outside png/jpeg/gif
    #[error("format error: expected {expected}, but was {actual}")]
    Format { expected: String, actual: String },

    /// Requested thumbnail dimension is zero
    #[error("thumbnail size error: {width}x{height}")]
    Size { width: u32, height: u32 },

    /// File create/read/write failure
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote response was not an image
    #[error("content-type error: {url} returned '{content_type}'")]
    ContentType { url: String, content_type: String },

    /// Remote fetch failed before a usable response arrived
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Bytes do not parse as the declared or detected format
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Re-encoding a decoded image failed
    #[error("encode error ({format}): {message}")]
    Encode { format: String, message: String },

    /// Payload of a data URI is not valid base64
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A blocking worker panicked or was cancelled
    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl IngestError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable identifier for the error kind, suitable for logs and API bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Format { .. } => "format_error",
            Self::Size { .. } => "size_error",
            Self::Io { .. } => "io_error",
            Self::ContentType { .. } => "content_type_error",
            Self::Network { .. } => "network_error",
            Self::Decode { .. } => "decode_error",
            Self::Encode { .. } => "encode_error",
            Self::Base64(_) => "base64_error",
            Self::Task(_) => "internal_error",
        }
    }
}

/// Convenience type alias for imgeater results.
pub type Result<T> = std::result::Result<T, EaterError>;

/// Convenience type alias for ingestion results.
pub type IngestResult<T> = std::result::Result<T, IngestError>;
