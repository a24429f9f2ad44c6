//! Request and result types for the ingestion pipeline.

use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use tokio::io::AsyncRead;

use crate::pipeline::DestinationPath;

/// A named byte stream, typically one file part of a multipart body.
pub struct RawStream<'a> {
    /// Client-supplied filename (untrusted)
    pub name: String,
    /// The file contents
    pub reader: Pin<Box<dyn AsyncRead + Send + 'a>>,
}

impl<'a> RawStream<'a> {
    pub fn new(name: impl Into<String>, reader: impl AsyncRead + Send + 'a) -> Self {
        Self {
            name: name.into(),
            reader: Box::pin(reader),
        }
    }
}

impl fmt::Debug for RawStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawStream").field("name", &self.name).finish()
    }
}

/// One image to ingest, tagged by how it was transported.
#[derive(Debug)]
pub enum IngestionRequest<'a> {
    /// Raw bytes with a client filename
    RawStream(RawStream<'a>),
    /// `data:image/<format>;base64,<data>` string
    Base64Payload(String),
    /// URL to fetch
    RemoteReference(String),
}

impl IngestionRequest<'_> {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RawStream(_) => "stream",
            Self::Base64Payload(_) => "base64",
            Self::RemoteReference(_) => "url",
        }
    }
}

/// All images submitted in one logical request, partitioned by encoding.
///
/// Processed in field order: streams, then base64 payloads, then URLs.
#[derive(Debug, Default)]
pub struct IngestionBatch<'a> {
    pub streams: Vec<RawStream<'a>>,
    pub base64: Vec<String>,
    pub urls: Vec<String>,
}

impl<'a> IngestionBatch<'a> {
    pub fn len(&self) -> usize {
        self.streams.len() + self.base64.len() + self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into requests in processing order.
    pub fn into_requests(self) -> impl Iterator<Item = IngestionRequest<'a>> {
        self.streams
            .into_iter()
            .map(IngestionRequest::RawStream)
            .chain(self.base64.into_iter().map(IngestionRequest::Base64Payload))
            .chain(self.urls.into_iter().map(IngestionRequest::RemoteReference))
    }
}

/// Paths written for one successfully ingested image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    /// The original file
    pub original: String,
    /// The `min_` thumbnail next to it
    pub thumbnail: String,
}

impl StoredImage {
    pub(crate) fn new(original: &DestinationPath, thumbnail: &DestinationPath) -> Self {
        Self {
            original: original.to_string(),
            thumbnail: thumbnail.to_string(),
        }
    }
}
