//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG data (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::AcquireError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use std::fs;
use std::path::Path;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Encoded formats that get a dedicated decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Other,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg") => Self::Jpeg,
            _ => Self::Other,
        }
    }

    /// Detect format from the leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&JPEG_MAGIC) {
            Self::Jpeg
        } else {
            Self::Other
        }
    }
}

/// Image decoder that picks the fastest available backend per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an image file.
    ///
    /// - JPEG: Uses zune-jpeg, falling back to image crate on failure
    /// - Other formats: image crate
    pub fn decode(path: &Path) -> Result<DynamicImage, AcquireError> {
        let bytes = fs::read(path).map_err(|e| AcquireError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let origin = path.display().to_string();
        let format = match ImageFormat::from_path(path) {
            ImageFormat::Jpeg => ImageFormat::Jpeg,
            ImageFormat::Other => ImageFormat::sniff(&bytes),
        };
        Self::decode_with_format(&bytes, format, &origin)
    }

    /// Decode an in-memory encoded image (e.g. a downloaded buffer)
    pub fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, AcquireError> {
        Self::decode_with_format(bytes, ImageFormat::sniff(bytes), "<buffer>")
    }

    fn decode_with_format(
        bytes: &[u8],
        format: ImageFormat,
        origin: &str,
    ) -> Result<DynamicImage, AcquireError> {
        if bytes.is_empty() {
            return Err(AcquireError::EmptyImage {
                origin: origin.to_string(),
            });
        }
        let image = match format {
            ImageFormat::Jpeg => {
                Self::decode_jpeg(bytes, origin).or_else(|_| Self::decode_fallback(bytes, origin))
            }
            ImageFormat::Other => Self::decode_fallback(bytes, origin),
        }?;

        if image.width() == 0 || image.height() == 0 {
            return Err(AcquireError::EmptyImage {
                origin: origin.to_string(),
            });
        }
        tracing::trace!(origin, width = image.width(), height = image.height(), "decoded image");
        Ok(image)
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(bytes: &[u8], origin: &str) -> Result<DynamicImage, AcquireError> {
        let decode_error = |reason: String| AcquireError::Decode {
            origin: origin.to_string(),
            reason,
        };

        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder
            .decode()
            .map_err(|e| decode_error(format!("zune-jpeg decode failed: {:?}", e)))?;

        let info = decoder
            .info()
            .ok_or_else(|| decode_error("Failed to get image info".to_string()))?;

        let width = info.width as u32;
        let height = info.height as u32;

        // Get actual output colorspace after decoding
        let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

        let image = match out_colorspace {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create RGB buffer".to_string()))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create RGBA buffer".to_string()))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| decode_error("Failed to create Luma buffer".to_string()))?;
                DynamicImage::ImageLuma8(buffer)
            }
            other => {
                return Err(decode_error(format!("unsupported colorspace {:?}", other)));
            }
        };

        Ok(image)
    }

    fn decode_fallback(bytes: &[u8], origin: &str) -> Result<DynamicImage, AcquireError> {
        image::load_from_memory(bytes).map_err(|e| AcquireError::Decode {
            origin: origin.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded_png() -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_fn(4, 3, |x, y| {
            Rgb([(x * 60) as u8, (y * 80) as u8, 10])
        }));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn format_detection_jpeg() {
        assert_eq!(ImageFormat::from_path(Path::new("photo.jpg")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("photo.JPEG")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_path(Path::new("photo.png")), ImageFormat::Other);
    }

    #[test]
    fn sniff_detects_jpeg_magic() {
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::sniff(b"\x89PNG"), ImageFormat::Other);
        assert_eq!(ImageFormat::sniff(&[]), ImageFormat::Other);
    }

    #[test]
    fn decode_bytes_reads_png() {
        let image = FastDecoder::decode_bytes(&encoded_png()).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }

    #[test]
    fn decode_bytes_rejects_garbage() {
        let result = FastDecoder::decode_bytes(b"this is not an image");
        assert!(matches!(result, Err(AcquireError::Decode { .. })));
    }

    #[test]
    fn decode_bytes_rejects_empty() {
        assert!(matches!(
            FastDecoder::decode_bytes(&[]),
            Err(AcquireError::EmptyImage { .. })
        ));
    }

    #[test]
    fn decode_missing_file_is_io_error() {
        let result = FastDecoder::decode(Path::new("/definitely/not/here.png"));
        assert!(matches!(result, Err(AcquireError::Io { .. })));
    }
}
