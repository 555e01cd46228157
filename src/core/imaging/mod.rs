//! # Imaging Module
//!
//! Turns an image source into the small grayscale [`PixelGrid`] the
//! fingerprint engines consume.
//!
//! ## Steps
//! 1. Load and decode the source (file path or in-memory buffer)
//! 2. Flatten any alpha channel against black
//! 3. Convert to single-channel luminance
//! 4. Resize to the exact grid the algorithm asks for
//!
//! Nothing here is retried: decode and I/O failures surface as
//! [`AcquireError`] unchanged.

mod decode;
mod resize;

pub use decode::{FastDecoder, ImageFormat};
pub use resize::FastResizer;

use super::grid::PixelGrid;
use crate::error::{AcquireError, FingerprintError};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Interpolation kernel used when shrinking to the hash grid
///
/// Defaults to Lanczos3 when the caller does not pick one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    Linear,
    Cubic,
    Mitchell,
    #[default]
    Lanczos3,
}

/// Where the raw image comes from.
///
/// Remote resources are fetched by the host application and passed in as
/// [`ImageSource::Bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl ImageSource {
    /// Decode the source into memory
    pub fn load(&self) -> Result<DynamicImage, AcquireError> {
        match self {
            ImageSource::Path(path) => FastDecoder::decode(path),
            ImageSource::Bytes(bytes) => FastDecoder::decode_bytes(bytes),
        }
    }

    /// Short label for logs and batch reports
    pub fn label(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// Single-channel luminance with any alpha composited over black
pub fn flatten_to_luma(image: &DynamicImage) -> GrayImage {
    if !image.color().has_alpha() {
        return image.to_luma8();
    }
    let with_alpha = image.to_luma_alpha8();
    ImageBuffer::from_fn(with_alpha.width(), with_alpha.height(), |x, y| {
        let [luma, alpha] = with_alpha.get_pixel(x, y).0;
        let composited = (u32::from(luma) * u32::from(alpha) + 127) / 255;
        Luma([composited as u8])
    })
}

/// Flatten, grayscale and resize a decoded image into a `width x height` grid
pub fn pixelate_image(
    image: &DynamicImage,
    width: u32,
    height: u32,
    filter: Option<ResizeFilter>,
) -> Result<PixelGrid, FingerprintError> {
    let gray = flatten_to_luma(image);
    let resized = FastResizer::new().resize(gray, width, height, filter.unwrap_or_default())?;
    Ok(PixelGrid::from_gray(&resized)?)
}

/// Load a source and pixelate it into a `width x height` grid
pub fn pixelate_source(
    source: &ImageSource,
    width: u32,
    height: u32,
    filter: Option<ResizeFilter>,
) -> Result<PixelGrid, FingerprintError> {
    let image = source.load()?;
    pixelate_image(&image, width, height, filter)
}
