//! Batch orchestration - routes each request to its ingestor.

use crate::config::Config;
use crate::error::{IngestResult, Result};
use crate::types::{IngestionBatch, IngestionRequest, StoredImage};

use super::ingest::{ingest_base64, ingest_stream, RemoteIngestor};
use super::thumbnail::ThumbnailGenerator;

/// Routes ingestion requests to the matching ingestor.
///
/// Built once from the configuration and immutable afterwards, so a single
/// instance can serve concurrent requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    directory: String,
    thumbnails: ThumbnailGenerator,
    remote: RemoteIngestor,
}

impl Dispatcher {
    /// Create a dispatcher writing into the configured files directory.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            directory: config.files_dir(),
            thumbnails: ThumbnailGenerator::new(config.thumbnail.clone()),
            remote: RemoteIngestor::new(&config.remote)?,
        })
    }

    /// Same as [`Dispatcher::new`] but writing into `directory`.
    pub fn with_directory(config: &Config, directory: impl Into<String>) -> Result<Self> {
        let mut dispatcher = Self::new(config)?;
        dispatcher.directory = directory.into();
        Ok(dispatcher)
    }

    /// Destination directory for originals and thumbnails.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Ingest one request.
    pub async fn ingest(&self, request: IngestionRequest<'_>) -> IngestResult<StoredImage> {
        match request {
            IngestionRequest::RawStream(mut stream) => {
                ingest_stream(
                    &stream.name,
                    &mut stream.reader,
                    &self.directory,
                    &self.thumbnails,
                )
                .await
            }
            IngestionRequest::Base64Payload(payload) => {
                ingest_base64(&payload, &self.directory, &self.thumbnails).await
            }
            IngestionRequest::RemoteReference(url) => {
                self.remote
                    .ingest(&url, &self.directory, &self.thumbnails)
                    .await
            }
        }
    }

    /// Ingest a whole batch in order, stopping at the first failure.
    ///
    /// Images stored before the failing one stay on disk. Returns the number
    /// of images stored.
    pub async fn dispatch(&self, batch: IngestionBatch<'_>) -> IngestResult<usize> {
        let total = batch.len();
        let mut stored = 0;
        for request in batch.into_requests() {
            let kind = request.kind();
            if let Err(e) = self.ingest(request).await {
                tracing::error!(
                    "Ingestion of {} item {}/{} failed ({}): {}",
                    kind,
                    stored + 1,
                    total,
                    e.kind(),
                    e
                );
                return Err(e);
            }
            stored += 1;
        }
        tracing::debug!("Stored {} image(s)", stored);
        Ok(stored)
    }
}
