//! Trait definitions for perceptual hashing.

use super::algorithms::{dhash, idhash};
use crate::core::fingerprint::Fingerprint;
use crate::core::grid::PixelGrid;
use crate::core::imaging::{FastDecoder, ImageSource};
use crate::error::{CompareError, HashError, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A computed perceptual hash that can be compared
pub trait PerceptualHash: Clone + Send + Sync {
    /// Compute the distance to another hash
    ///
    /// Lower distance = more similar images. Hashes taken with a different
    /// algorithm or size are rejected rather than compared.
    fn distance(&self, other: &Self) -> std::result::Result<u32, CompareError>;

    /// Total number of bits in this hash
    fn bit_count(&self) -> u32;

    /// Largest distance two hashes of this shape can have
    fn comparable_bits(&self) -> u32;

    /// Get the hash as a hexadecimal string
    fn to_hex(&self) -> String;

    /// Calculate similarity as a percentage (0-100)
    fn similarity(&self, other: &Self) -> std::result::Result<f64, CompareError> {
        let distance = self.distance(other)?;
        let max_distance = self.comparable_bits();
        if max_distance == 0 {
            return Ok(100.0);
        }
        Ok((1.0 - (distance as f64 / max_distance as f64)) * 100.0)
    }
}

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithmKind {
    /// Difference Hash (dHash) - sign of horizontal gradients
    Difference,
    /// Importance-Difference Hash (IDHash) - gradient signs weighted by magnitude
    ImportanceDifference,
}

impl HashAlgorithmKind {
    /// Get a human-readable description of the algorithm
    pub fn description(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Difference => {
                "Difference Hash (dHash) - Compares brightness gradients between pixels"
            }
            HashAlgorithmKind::ImportanceDifference => {
                "Importance-Difference Hash (IDHash) - Gradient signs in both directions, compared only where the gradient is strong"
            }
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithmKind::Difference => write!(f, "dHash"),
            HashAlgorithmKind::ImportanceDifference => write!(f, "IDHash"),
        }
    }
}

/// Trait for hash algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Compute a hash from a grid that already has the algorithm's shape
    fn hash_grid(&self, grid: &PixelGrid) -> std::result::Result<ImageHashValue, HashError>;

    /// Compute a hash from an already-loaded image
    fn hash_image(&self, image: &DynamicImage) -> Result<ImageHashValue>;

    /// Compute a hash directly from a file path.
    ///
    /// JPEG files go through zune-jpeg, everything else through the image crate.
    fn hash_file(&self, path: &Path) -> Result<ImageHashValue> {
        let image = FastDecoder::decode(path)?;
        self.hash_image(&image)
    }

    /// Compute a hash from an encoded in-memory image
    fn hash_bytes(&self, bytes: &[u8]) -> Result<ImageHashValue> {
        let image = FastDecoder::decode_bytes(bytes)?;
        self.hash_image(&image)
    }

    fn hash_source(&self, source: &ImageSource) -> Result<ImageHashValue> {
        let image = source.load()?;
        self.hash_image(&image)
    }

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;
}

/// A fingerprint tagged with the algorithm and size that produced it.
///
/// `parameter` is the hash size for dHash and the power for IDHash. Carrying
/// it means comparisons never have to guess the width from the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHashValue {
    fingerprint: Fingerprint,
    algorithm: HashAlgorithmKind,
    parameter: u32,
}

impl ImageHashValue {
    pub fn new(fingerprint: Fingerprint, algorithm: HashAlgorithmKind, parameter: u32) -> Self {
        Self {
            fingerprint,
            algorithm,
            parameter,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn into_fingerprint(self) -> Fingerprint {
        self.fingerprint
    }

    /// Get the algorithm that produced this hash
    pub fn algorithm(&self) -> HashAlgorithmKind {
        self.algorithm
    }

    /// Hash size (dHash) or power (IDHash)
    pub fn parameter(&self) -> u32 {
        self.parameter
    }

    /// Side of the grid the hash was computed on
    pub fn grid_side(&self) -> u32 {
        match self.algorithm {
            HashAlgorithmKind::Difference => self.parameter,
            HashAlgorithmKind::ImportanceDifference => {
                1u32.checked_shl(self.parameter).unwrap_or(u32::MAX)
            }
        }
    }

    fn band_bits(&self) -> u32 {
        self.grid_side().saturating_mul(self.grid_side())
    }
}

impl PerceptualHash for ImageHashValue {
    fn distance(&self, other: &Self) -> std::result::Result<u32, CompareError> {
        if self.algorithm != other.algorithm {
            return Err(CompareError::AlgorithmMismatch {
                left: self.algorithm.to_string(),
                right: other.algorithm.to_string(),
            });
        }
        if self.parameter != other.parameter {
            return Err(CompareError::SizeMismatch {
                left: self.grid_side(),
                right: other.grid_side(),
            });
        }

        match self.algorithm {
            HashAlgorithmKind::Difference => {
                let max = u64::from(self.bit_count());
                for fingerprint in [&self.fingerprint, &other.fingerprint] {
                    if fingerprint.bit_len() > max {
                        return Err(CompareError::FingerprintTooWide {
                            bits: fingerprint.bit_len(),
                            max,
                        });
                    }
                }
                Ok(dhash::hamming(&self.fingerprint, &other.fingerprint))
            }
            HashAlgorithmKind::ImportanceDifference => {
                idhash::distance_for_power(&self.fingerprint, &other.fingerprint, self.parameter)
            }
        }
    }

    fn bit_count(&self) -> u32 {
        match self.algorithm {
            HashAlgorithmKind::Difference => self.band_bits(),
            HashAlgorithmKind::ImportanceDifference => self.band_bits().saturating_mul(4),
        }
    }

    fn comparable_bits(&self) -> u32 {
        match self.algorithm {
            HashAlgorithmKind::Difference => self.band_bits(),
            HashAlgorithmKind::ImportanceDifference => self.band_bits().saturating_mul(2),
        }
    }

    fn to_hex(&self) -> String {
        self.fingerprint.to_hex()
    }
}
