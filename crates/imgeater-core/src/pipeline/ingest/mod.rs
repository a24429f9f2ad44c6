//! Source ingestors: one per transport encoding.
//!
//! Every ingestor ends the same way: the original is on disk and closed, the
//! thumbnail is generated from it, and if that fails the original is removed
//! so the pair is stored together or not at all.

pub mod data_uri;
pub mod remote;
pub mod stream;

pub use data_uri::ingest_base64;
pub use remote::RemoteIngestor;
pub use stream::ingest_stream;

use crate::error::IngestResult;
use crate::types::StoredImage;

use super::path::DestinationPath;
use super::thumbnail::ThumbnailGenerator;

/// Generate the thumbnail for a freshly written original, removing the
/// original if that fails.
pub(crate) async fn finish_with_thumbnail(
    original: &DestinationPath,
    thumbnails: &ThumbnailGenerator,
) -> IngestResult<StoredImage> {
    match thumbnails.generate_for_async(original).await {
        Ok(thumbnail) => Ok(StoredImage::new(original, &thumbnail)),
        Err(e) => {
            tracing::warn!("Thumbnail for {} failed, removing original: {}", original, e);
            discard(original).await;
            Err(e)
        }
    }
}

/// Best-effort removal of a partially stored file.
pub(crate) async fn discard(path: &DestinationPath) {
    if let Err(e) = tokio::fs::remove_file(path.as_path()).await {
        tracing::warn!("Failed to remove {}: {}", path, e);
    }
}
