//! Ingest a named byte stream (multipart file part) by copying it to disk.

use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::error::{IngestError, IngestResult};
use crate::pipeline::path::DestinationPath;
use crate::pipeline::thumbnail::ThumbnailGenerator;
use crate::types::StoredImage;

use super::{discard, finish_with_thumbnail};

/// Store the stream under `name` in `directory` and thumbnail it.
///
/// The bytes are copied as they arrive; the payload is never held in memory
/// as a whole, and the content is not inspected until the thumbnail stage.
pub async fn ingest_stream<R>(
    name: &str,
    reader: &mut R,
    directory: &str,
    thumbnails: &ThumbnailGenerator,
) -> IngestResult<StoredImage>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let destination = DestinationPath::resolve(directory, name);
    tracing::debug!("Saving stream {:?} to {}", name, destination);

    let written = copy_to(&destination, reader).await?;

    let stored = finish_with_thumbnail(&destination, thumbnails).await?;
    tracing::info!("Saved {} ({} bytes) from stream", destination, written);
    Ok(stored)
}

/// Copy `reader` into a new file at `destination`.
///
/// The file handle is closed before returning; a failed copy removes what was
/// written so far.
async fn copy_to<R>(destination: &DestinationPath, reader: &mut R) -> IngestResult<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = tokio::fs::File::create(destination.as_path())
        .await
        .map_err(|e| IngestError::io(destination.as_path(), e))?;

    let copied = async {
        let n = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        Ok::<_, std::io::Error>(n)
    }
    .await;
    drop(file);

    match copied {
        Ok(n) => Ok(n),
        Err(e) => {
            discard(destination).await;
            Err(IngestError::io(destination.as_path(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThumbnailConfig;
    use crate::pipeline::codec::tests::sample_bytes;
    use image::{GenericImageView, ImageFormat};
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncReadExt, ReadBuf};

    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")))
        }
    }

    fn generator() -> ThumbnailGenerator {
        ThumbnailGenerator::new(ThumbnailConfig::default())
    }

    fn entries(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_stream_stores_original_and_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes(ImageFormat::Png, 300, 200);

        let stored = ingest_stream(
            "photo.png",
            &mut &bytes[..],
            dir.path().to_str().unwrap(),
            &generator(),
        )
        .await
        .unwrap();

        assert_eq!(entries(dir.path()), ["min_photo.png", "photo.png"]);
        assert_eq!(std::fs::read(&stored.original).unwrap(), bytes);
        let thumb = image::open(&stored.thumbnail).unwrap();
        assert_eq!(thumb.dimensions(), (100, 100));
    }

    #[tokio::test]
    async fn test_stream_name_is_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes(ImageFormat::Jpeg, 40, 40);

        ingest_stream(
            "../nested/shot.jpg",
            &mut &bytes[..],
            dir.path().to_str().unwrap(),
            &generator(),
        )
        .await
        .unwrap();

        assert_eq!(entries(dir.path()), ["..nestedshot.jpg", "min_..nestedshot.jpg"]);
    }

    #[tokio::test]
    async fn test_stream_not_an_image_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();

        let err = ingest_stream(
            "notes.png",
            &mut &b"plain text, not pixels"[..],
            dir.path().to_str().unwrap(),
            &generator(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "decode_error");
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_stream_thumbnail_size_error_removes_original() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes(ImageFormat::Png, 20, 20);
        let generator = ThumbnailGenerator::new(ThumbnailConfig {
            width: 0,
            height: 100,
        });

        let err = ingest_stream(
            "a.png",
            &mut &bytes[..],
            dir.path().to_str().unwrap(),
            &generator,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::Size { .. }));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_stream_read_failure_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut reader = (&b"partial"[..]).chain(BrokenReader);

        let err = ingest_stream(
            "a.png",
            &mut reader,
            dir.path().to_str().unwrap(),
            &generator(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "io_error");
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_stream_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let bytes = sample_bytes(ImageFormat::Png, 8, 8);

        let err = ingest_stream(
            "a.png",
            &mut &bytes[..],
            missing.to_str().unwrap(),
            &generator(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "io_error");
    }
}
