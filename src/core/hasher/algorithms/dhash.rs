//! Difference Hash (dHash) implementation.
//!
//! dHash works by:
//! 1. Resizing the image to (hash_size+1) x hash_size
//! 2. Converting to grayscale
//! 3. Comparing each pixel to the one to its right
//! 4. If left pixel is brighter, set bit to 1, else 0
//!
//! Bits are read row by row, first bit most significant, so the fingerprint
//! fits in `hash_size * hash_size` bits.

use super::super::traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue};
use crate::core::fingerprint::Fingerprint;
use crate::core::grid::PixelGrid;
use crate::core::imaging::{pixelate_image, pixelate_source, ImageSource, ResizeFilter};
use crate::error::{HashError, Result};
use image::DynamicImage;

pub const DEFAULT_HASH_SIZE: u32 = 8;
/// Largest supported hash size (4096-bit fingerprints)
pub const MAX_HASH_SIZE: u32 = 64;

/// Reject hash sizes outside `1..=MAX_HASH_SIZE`
pub fn check_hash_size(hash_size: u32) -> std::result::Result<u32, HashError> {
    if (1..=MAX_HASH_SIZE).contains(&hash_size) {
        Ok(hash_size)
    } else {
        Err(HashError::UnsupportedSize {
            parameter: "hash size",
            value: hash_size,
            min: 1,
            max: MAX_HASH_SIZE,
        })
    }
}

/// Load a source and shrink it to the `(hash_size+1) x hash_size` grid
pub fn pixelate(
    source: &ImageSource,
    hash_size: u32,
    filter: Option<ResizeFilter>,
) -> Result<PixelGrid> {
    check_hash_size(hash_size)?;
    pixelate_source(source, hash_size + 1, hash_size, filter)
}

/// Compute the fingerprint of an already pixelated grid
pub fn hash_grid(grid: &PixelGrid, hash_size: u32) -> std::result::Result<Fingerprint, HashError> {
    check_hash_size(hash_size)?;
    let (width, height) = (hash_size as usize + 1, hash_size as usize);
    if grid.width() != width || grid.height() != height {
        return Err(HashError::GridShape {
            expected: format!("{}x{}", width, height),
            actual: grid.describe_shape(),
        });
    }

    let bits = grid
        .rows()
        .flat_map(|row| row.windows(2).map(|pair| pair[0] > pair[1]));
    Ok(Fingerprint::from_bits(bits))
}

/// Fingerprint an image source
pub fn calculate(
    source: &ImageSource,
    hash_size: u32,
    filter: Option<ResizeFilter>,
) -> Result<Fingerprint> {
    let grid = pixelate(source, hash_size, filter)?;
    let fingerprint = hash_grid(&grid, hash_size)?;
    tracing::debug!(source = %source.label(), hash_size, %fingerprint, "computed dHash");
    Ok(fingerprint)
}

/// Fingerprint an image that is already decoded (alpha is flattened first)
pub fn calculate_image(
    image: &DynamicImage,
    hash_size: u32,
    filter: Option<ResizeFilter>,
) -> Result<Fingerprint> {
    check_hash_size(hash_size)?;
    let grid = pixelate_image(image, hash_size + 1, hash_size, filter)?;
    Ok(hash_grid(&grid, hash_size)?)
}

/// Number of differing bits.
///
/// No width check: both fingerprints are assumed to come from the same
/// hash size.
pub fn hamming(a: &Fingerprint, b: &Fingerprint) -> u32 {
    (a ^ b).count_ones()
}

/// Difference Hash (dHash) hasher
#[derive(Debug, Clone)]
pub struct DifferenceHasher {
    /// Side of the comparison grid (hash has hash_size^2 bits)
    hash_size: u32,
    filter: Option<ResizeFilter>,
}

impl DifferenceHasher {
    /// Create a new dHash hasher
    pub fn new(hash_size: u32) -> Self {
        Self {
            hash_size,
            filter: None,
        }
    }

    /// Use a specific resize kernel instead of the default
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }
}

impl Default for DifferenceHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_SIZE)
    }
}

impl HashAlgorithm for DifferenceHasher {
    fn hash_grid(&self, grid: &PixelGrid) -> std::result::Result<ImageHashValue, HashError> {
        let fingerprint = hash_grid(grid, self.hash_size)?;
        Ok(ImageHashValue::new(
            fingerprint,
            HashAlgorithmKind::Difference,
            self.hash_size,
        ))
    }

    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue> {
        let fingerprint = calculate_image(image, self.hash_size, self.filter)?;
        Ok(ImageHashValue::new(
            fingerprint,
            HashAlgorithmKind::Difference,
            self.hash_size,
        ))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Difference
    }
}
