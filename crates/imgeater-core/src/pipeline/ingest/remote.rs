//! Ingest an image referenced by URL, streaming the response body to disk.

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::config::RemoteConfig;
use crate::error::{IngestError, IngestResult, Result};
use crate::pipeline::path::{DestinationPath, PLACEHOLDER_NAME};
use crate::pipeline::thumbnail::ThumbnailGenerator;
use crate::types::StoredImage;

use super::{discard, finish_with_thumbnail};

/// Fetches remote images over HTTP.
///
/// Holds one `reqwest::Client` so connections are pooled across the URLs of a
/// batch. Failed fetches are never retried.
#[derive(Debug, Clone)]
pub struct RemoteIngestor {
    client: reqwest::Client,
}

impl RemoteIngestor {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    /// Use an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch `url`, store the body in `directory` and thumbnail it.
    ///
    /// The body is written as received: only the declared content type is
    /// checked before writing, and the thumbnail stage is what proves the
    /// bytes are an image.
    pub async fn ingest(
        &self,
        url: &str,
        directory: &str,
        thumbnails: &ThumbnailGenerator,
    ) -> IngestResult<StoredImage> {
        tracing::debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| network_error(url, e))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let mime = media_type(content_type);
        if mime.strip_prefix("image/").map_or(true, str::is_empty) {
            return Err(IngestError::ContentType {
                url: url.to_string(),
                content_type: content_type.to_string(),
            });
        }

        let destination = DestinationPath::resolve(directory, &remote_file_name(url, &mime));
        tracing::debug!("Saving {} to {}", url, destination);

        let written = download_to(response, url, &destination).await?;

        let stored = finish_with_thumbnail(&destination, thumbnails).await?;
        tracing::info!("Saved {} ({} bytes) from {}", destination, written, url);
        Ok(stored)
    }
}

/// Stream the body into a new file; a failure midway removes the file.
async fn download_to(
    response: reqwest::Response,
    url: &str,
    destination: &DestinationPath,
) -> IngestResult<u64> {
    let mut file = tokio::fs::File::create(destination.as_path())
        .await
        .map_err(|e| IngestError::io(destination.as_path(), e))?;
    let mut stream = response.bytes_stream();

    let copied = async {
        let mut total: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| network_error(url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| IngestError::io(destination.as_path(), e))?;
            total += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| IngestError::io(destination.as_path(), e))?;
        Ok::<_, IngestError>(total)
    }
    .await;
    drop(file);

    if copied.is_err() {
        discard(destination).await;
    }
    copied
}

fn network_error(url: &str, e: reqwest::Error) -> IngestError {
    IngestError::Network {
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// Lower-cased MIME type without parameters.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Filename for a fetched image: the URL's last path segment, with an
/// extension from the MIME subtype when the segment has none.
pub fn remote_file_name(url: &str, mime: &str) -> String {
    let segment = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string(),
        Err(_) => url.rsplit('/').next().unwrap_or_default().to_string(),
    };

    let name = if segment.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        segment
    };

    let subtype = mime.split_once('/').map(|(_, s)| s).unwrap_or_default();
    if name.contains('.') || subtype.is_empty() {
        name
    } else {
        format!("{name}.{subtype}")
    }
}
