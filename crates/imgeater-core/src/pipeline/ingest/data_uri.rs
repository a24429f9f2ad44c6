//! Ingest a `data:image/<format>;base64,<data>` payload.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;

use crate::error::{IngestError, IngestResult};
use crate::pipeline::codec::{self, DecodedImage};
use crate::pipeline::path::DestinationPath;
use crate::pipeline::thumbnail::ThumbnailGenerator;
use crate::types::StoredImage;

use super::{discard, finish_with_thumbnail};

/// Group 1: declared format, group 2: base64 data.
static DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/([a-z]{3,4});base64,(.*)$").expect("data URI pattern is valid")
});

/// How many leading base64 characters go into the generated filename.
const NAME_PREFIX_CHARS: usize = 10;

/// Parsed pieces of a data URI.
#[derive(Debug, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub format: &'a str,
    pub data: &'a str,
}

impl<'a> DataUri<'a> {
    /// Split a payload into declared format and base64 data.
    pub fn parse(payload: &'a str) -> IngestResult<Self> {
        let caps = DATA_URI.captures(payload).ok_or_else(|| IngestError::Format {
            expected: "base64".to_string(),
            actual: "undefined".to_string(),
        })?;
        let (Some(format), Some(data)) = (caps.get(1), caps.get(2)) else {
            return Err(IngestError::Format {
                expected: "base64".to_string(),
                actual: "undefined".to_string(),
            });
        };
        Ok(Self {
            format: format.as_str(),
            data: data.as_str(),
        })
    }

    /// `<unix seconds><first 10 data chars>.<format>`.
    ///
    /// Two identical payloads within the same second map to the same name and
    /// the later one overwrites the earlier.
    pub fn file_name(&self, unix_secs: u64) -> String {
        let prefix: String = self.data.chars().take(NAME_PREFIX_CHARS).collect();
        format!("{}{}.{}", unix_secs, prefix, self.format)
    }
}

/// Decode a data-URI payload, store it in `directory` and thumbnail it.
///
/// The image is decoded with its declared format and re-encoded on write, so
/// a payload that doesn't match its declaration never reaches the disk.
pub async fn ingest_base64(
    payload: &str,
    directory: &str,
    thumbnails: &ThumbnailGenerator,
) -> IngestResult<StoredImage> {
    let uri = DataUri::parse(payload)?;
    let bytes = BASE64.decode(uri.data)?;

    let format = uri.format.to_string();
    let encoded = tokio::task::spawn_blocking(move || -> IngestResult<Vec<u8>> {
        let decoded: DecodedImage = codec::decode(&bytes, &format)?;
        tracing::debug!(
            "Decoded {} payload ({}x{})",
            decoded.kind.as_str(),
            decoded.width(),
            decoded.height()
        );
        decoded.encode()
    })
    .await??;

    let destination = DestinationPath::resolve(directory, &uri.file_name(unix_now()));
    tracing::debug!("Saving base64 payload to {}", destination);
    write_file(&destination, &encoded).await?;

    let stored = finish_with_thumbnail(&destination, thumbnails).await?;
    tracing::info!("Saved {} from base64", destination);
    Ok(stored)
}

async fn write_file(destination: &DestinationPath, bytes: &[u8]) -> IngestResult<()> {
    let mut file = tokio::fs::File::create(destination.as_path())
        .await
        .map_err(|e| IngestError::io(destination.as_path(), e))?;

    let written = async {
        file.write_all(bytes).await?;
        file.flush().await
    }
    .await;
    drop(file);

    if let Err(e) = written {
        discard(destination).await;
        return Err(IngestError::io(destination.as_path(), e));
    }
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
