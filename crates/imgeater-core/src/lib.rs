//! imgeater core - image ingestion library.
//!
//! Accepts images as raw byte streams, base64 data URIs, or remote URLs,
//! stores each in a destination directory, and writes a fixed-size thumbnail
//! next to it.
//!
//! # Architecture
//!
//! ```text
//! Batch → Dispatcher → Ingestor (stream | base64 | url) → original on disk → Thumbnail
//! ```
//!
//! An original is only kept if its thumbnail was written; a batch stops at the
//! first failing item.
//!
//! # Usage
//!
//! ```rust,ignore
//! use imgeater_core::{Config, Dispatcher, IngestionBatch};
//!
//! #[tokio::main]
//! async fn main() -> imgeater_core::Result<()> {
//!     let config = Config::load()?;
//!     let dispatcher = Dispatcher::new(&config)?;
//!
//!     let batch = IngestionBatch {
//!         urls: vec!["https://example.com/cat.png".to_string()],
//!         ..Default::default()
//!     };
//!     let stored = dispatcher.dispatch(batch).await?;
//!     println!("Stored {stored} image(s)");
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, EaterError, IngestError, IngestResult, Result};
pub use pipeline::{DestinationPath, Dispatcher, ThumbnailGenerator};
pub use types::{IngestionBatch, IngestionRequest, RawStream, StoredImage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dispatcher_from_default_config() {
        let dispatcher = Dispatcher::new(&Config::default()).unwrap();
        assert_eq!(dispatcher.directory(), "files/");
    }
}
