//! Image ingestion pipeline components.
//!
//! - **path**: traversal-safe destination paths
//! - **codec**: declared-format decode/encode for png, jpeg and gif
//! - **thumbnail**: fixed-size thumbnails next to stored originals
//! - **ingest**: one ingestor per transport (stream, base64, remote URL)
//! - **dispatcher**: routes batches to ingestors, aborting on first failure

pub mod codec;
pub mod dispatcher;
pub mod ingest;
pub mod path;
pub mod thumbnail;

// Re-exports for convenient access
pub use codec::{DecodedImage, ImageKind};
pub use dispatcher::Dispatcher;
pub use ingest::{ingest_base64, ingest_stream, RemoteIngestor};
pub use path::DestinationPath;
pub use thumbnail::ThumbnailGenerator;
