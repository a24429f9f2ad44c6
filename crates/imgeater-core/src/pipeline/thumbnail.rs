//! Fixed-size thumbnail generation next to a stored original.

use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::config::ThumbnailConfig;
use crate::error::{IngestError, IngestResult};

use super::codec::write_image;
use super::path::DestinationPath;

/// Generates thumbnails for stored images.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    config: ThumbnailConfig,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator with the given configuration.
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    /// Write the `min_` thumbnail for `original` and return its path.
    pub fn generate_for(&self, original: &DestinationPath) -> IngestResult<DestinationPath> {
        let thumbnail = original.thumbnail();
        Self::generate(
            original.as_path(),
            thumbnail.as_path(),
            self.config.width,
            self.config.height,
        )?;
        Ok(thumbnail)
    }

    /// Async wrapper around [`Self::generate_for`] that runs on the blocking pool.
    pub async fn generate_for_async(
        &self,
        original: &DestinationPath,
    ) -> IngestResult<DestinationPath> {
        let generator = self.clone();
        let original = original.clone();
        tokio::task::spawn_blocking(move || generator.generate_for(&original)).await?
    }

    /// Resize the image at `source` to exactly `width` x `height` and save it
    /// to `destination`.
    ///
    /// The source format is detected from file content; the output format
    /// follows the destination's extension. The image is scaled to cover the
    /// target box with Catmull-Rom and centre-cropped.
    pub fn generate(
        source: &Path,
        destination: &Path,
        width: u32,
        height: u32,
    ) -> IngestResult<()> {
        if width < 1 || height < 1 {
            return Err(IngestError::Size { width, height });
        }

        let reader = ImageReader::open(source)
            .map_err(|e| IngestError::io(source, e))?
            .with_guessed_format()
            .map_err(|e| IngestError::io(source, e))?;
        let image = reader.decode().map_err(|e| IngestError::Decode {
            message: format!("{}: {}", source.display(), e),
        })?;

        let format = ImageFormat::from_path(destination).map_err(|_| IngestError::Format {
            expected: "thumbnail extension".to_string(),
            actual: destination
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("none")
                .to_string(),
        })?;

        let thumb = image.resize_to_fill(width, height, FilterType::CatmullRom);

        let file = File::create(destination).map_err(|e| IngestError::io(destination, e))?;
        let mut writer = BufWriter::new(file);
        let written = write_image(&thumb, format, &mut writer).and_then(|_| {
            writer
                .into_inner()
                .map(drop)
                .map_err(|e| IngestError::io(destination, e.into_error()))
        });
        if written.is_err() {
            if let Err(e) = std::fs::remove_file(destination) {
                tracing::warn!("Failed to remove partial thumbnail {:?}: {}", destination, e);
            }
        }
        written?;

        tracing::debug!("Thumbnail {:?} ({}x{})", destination, width, height);
        Ok(())
    }

    pub fn config(&self) -> &ThumbnailConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::codec::tests::sample_bytes;
    use image::GenericImageView;

    fn write_sample(
        dir: &Path,
        name: &str,
        format: ImageFormat,
        w: u32,
        h: u32,
    ) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, sample_bytes(format, w, h)).unwrap();
        path
    }

    #[test]
    fn test_zero_size_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        let dst = dir.path().join("min_missing.png");

        for (w, h) in [(0, 100), (100, 0), (0, 0)] {
            let err = ThumbnailGenerator::generate(&missing, &dst, w, h).unwrap_err();
            assert!(matches!(err, IngestError::Size { .. }), "{err}");
        }
        assert!(!dst.exists());
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ThumbnailGenerator::generate(
            &dir.path().join("nope.png"),
            &dir.path().join("min_nope.png"),
            100,
            100,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "io_error");
    }

    #[test]
    fn test_exact_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_sample(dir.path(), "wide.png", ImageFormat::Png, 400, 120);
        let dst = dir.path().join("min_wide.png");

        ThumbnailGenerator::generate(&src, &dst, 100, 100).unwrap();

        let thumb = image::open(&dst).unwrap();
        assert_eq!(thumb.dimensions(), (100, 100));
    }

    #[test]
    fn test_upscales_small_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_sample(dir.path(), "tiny.gif", ImageFormat::Gif, 10, 30);
        let dst = dir.path().join("min_tiny.gif");

        ThumbnailGenerator::generate(&src, &dst, 100, 100).unwrap();

        assert_eq!(image::open(&dst).unwrap().dimensions(), (100, 100));
    }

    #[test]
    fn test_format_detected_from_content() {
        // PNG bytes behind a .jpg name still decode; output follows the extension
        let dir = tempfile::tempdir().unwrap();
        let src = write_sample(dir.path(), "misnamed.jpg", ImageFormat::Png, 50, 50);
        let dst = dir.path().join("min_misnamed.jpg");

        ThumbnailGenerator::generate(&src, &dst, 20, 30).unwrap();

        let bytes = std::fs::read(&dst).unwrap();
        assert_eq!(&bytes[0..3], &[0xFF, 0xD8, 0xFF]);
        assert_eq!(image::open(&dst).unwrap().dimensions(), (20, 30));
    }

    #[test]
    fn test_garbage_source_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("junk.png");
        std::fs::write(&src, b"definitely not an image").unwrap();

        let dst = dir.path().join("min_junk.png");
        let err = ThumbnailGenerator::generate(&src, &dst, 100, 100).unwrap_err();
        assert_eq!(err.kind(), "decode_error");
    }

    #[test]
    fn test_generate_for_uses_min_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path(), "cat.png", ImageFormat::Png, 64, 64);
        let original = DestinationPath::resolve(dir.path().to_str().unwrap(), "cat.png");

        let generator = ThumbnailGenerator::new(ThumbnailConfig::default());
        let thumb = generator.generate_for(&original).unwrap();

        assert_eq!(thumb.file_name(), "min_cat.png");
        assert!(thumb.as_path().exists());
    }
}
