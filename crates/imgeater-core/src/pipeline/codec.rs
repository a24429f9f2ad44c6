//! Declared-format decoding and re-encoding for png, jpeg and gif.
//!
//! The format always comes from the caller (a data-URI prefix or MIME
//! subtype); bytes are never sniffed here. A wrong declaration shows up as a
//! decode error instead of a silently different image.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::{Cursor, Write};

use crate::error::{IngestError, IngestResult};

const SUPPORTED: &str = "image(png/jpg/gif)";

/// The closed set of formats accepted for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    /// Parse a declared format such as `png`, `jpg`, `jpeg` or `gif`.
    pub fn from_declared(declared: &str) -> IngestResult<Self> {
        match declared.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "gif" => Ok(Self::Gif),
            _ => {
                tracing::warn!("Unsupported image format: {declared}");
                Err(IngestError::Format {
                    expected: SUPPORTED.to_string(),
                    actual: declared.to_string(),
                })
            }
        }
    }

    /// Equivalent `image` crate format.
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Gif => ImageFormat::Gif,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }
}

/// A decoded image together with the format it was declared as.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded pixel data
    pub image: DynamicImage,
    /// Declared format, used again when encoding
    pub kind: ImageKind,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.image.dimensions().0
    }

    pub fn height(&self) -> u32 {
        self.image.dimensions().1
    }

    /// Encode back into the declared format.
    pub fn encode(&self) -> IngestResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        write_image(&self.image, self.kind.image_format(), &mut buffer)?;
        Ok(buffer.into_inner())
    }
}

/// Decode `bytes` as the `declared` format.
pub fn decode(bytes: &[u8], declared: &str) -> IngestResult<DecodedImage> {
    let kind = ImageKind::from_declared(declared)?;
    let image = image::load_from_memory_with_format(bytes, kind.image_format())
        .map_err(|e| IngestError::Decode {
            message: format!("{} payload: {}", kind.as_str(), e),
        })?;
    Ok(DecodedImage { image, kind })
}

/// Write `image` in `format`.
///
/// JPEG cannot carry alpha and the GIF encoder only takes RGBA, so both get a
/// converted buffer first.
pub(crate) fn write_image<W>(
    image: &DynamicImage,
    format: ImageFormat,
    writer: &mut W,
) -> IngestResult<()>
where
    W: Write + std::io::Seek,
{
    let result = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).write_to(writer, format),
        ImageFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8()).write_to(writer, format),
        _ => image.write_to(writer, format),
    };
    result.map_err(|e| IngestError::Encode {
        format: format!("{format:?}").to_lowercase(),
        message: e.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Encode a small gradient image in `format` for use as a fixture.
    pub(crate) fn sample_bytes(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7) as u8, (y * 5) as u8, 128, 255])
        });
        let mut buffer = Cursor::new(Vec::new());
        write_image(&DynamicImage::ImageRgba8(img), format, &mut buffer).unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_from_declared() {
        assert_eq!(ImageKind::from_declared("png").unwrap(), ImageKind::Png);
        assert_eq!(ImageKind::from_declared("jpg").unwrap(), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_declared("JPEG").unwrap(), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_declared("gif").unwrap(), ImageKind::Gif);
    }

    #[test]
    fn test_from_declared_rejects_unknown() {
        let err = ImageKind::from_declared("webp").unwrap_err();
        match err {
            IngestError::Format { expected, actual } => {
                assert_eq!(expected, "image(png/jpg/gif)");
                assert_eq!(actual, "webp");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_png() {
        let bytes = sample_bytes(ImageFormat::Png, 30, 20);
        let decoded = decode(&bytes, "png").unwrap();
        assert_eq!(decoded.kind, ImageKind::Png);
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }

    #[test]
    fn test_decode_mismatched_format_fails() {
        let bytes = sample_bytes(ImageFormat::Png, 8, 8);
        let err = decode(&bytes, "gif").unwrap_err();
        assert_eq!(err.kind(), "decode_error");
    }

    #[test]
    fn test_decode_truncated_fails() {
        let bytes = sample_bytes(ImageFormat::Png, 16, 16);
        let err = decode(&bytes[..bytes.len() / 3], "png").unwrap_err();
        assert_eq!(err.kind(), "decode_error");
    }

    #[test]
    fn test_encode_uses_declared_format() {
        let bytes = sample_bytes(ImageFormat::Png, 12, 12);
        let decoded = decode(&bytes, "png").unwrap();

        let jpeg = DecodedImage {
            image: decoded.image.clone(),
            kind: ImageKind::Jpeg,
        }
        .encode()
        .unwrap();
        assert_eq!(&jpeg[0..3], &[0xFF, 0xD8, 0xFF]);

        let gif = DecodedImage {
            image: decoded.image,
            kind: ImageKind::Gif,
        }
        .encode()
        .unwrap();
        assert_eq!(&gif[0..4], b"GIF8");
    }
}
