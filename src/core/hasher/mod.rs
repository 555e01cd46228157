//! # Hasher Module
//!
//! Computes perceptual fingerprints for images.
//!
//! ## Supported Algorithms
//! - **dHash (Difference Hash)** - Sign of horizontal gradients, plain Hamming distance
//! - **IDHash (Importance-Difference Hash)** - Gradient signs in both directions,
//!   compared only where the gradient is strong
//!
//! ## How It Works
//! 1. Resize image to a small grid (9x8 for dHash, 8x8 for IDHash by default)
//! 2. Convert to grayscale
//! 3. Compute bits from neighbouring pixel relationships
//! 4. Compare fingerprints by counting differing bits
//!
//! ## Example
//! ```rust,ignore
//! use photo_fingerprint::core::hasher::{HasherConfig, HashAlgorithmKind, PerceptualHash};
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::ImportanceDifference)
//!     .power(4)
//!     .build()?;
//!
//! let a = hasher.hash_file(&first)?;
//! let b = hasher.hash_file(&second)?;
//! let distance = a.distance(&b)?;
//! ```

mod algorithms;
mod traits;

pub use algorithms::{dhash, idhash, DifferenceHasher, IdHasher};
pub use traits::{HashAlgorithm, HashAlgorithmKind, ImageHashValue, PerceptualHash};

use crate::core::imaging::ResizeFilter;
use crate::error::HashError;

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Algorithm to use
    algorithm: HashAlgorithmKind,
    /// dHash grid side (1-64)
    hash_size: u32,
    /// IDHash grid side exponent (1-6)
    power: u32,
    /// dHash resize kernel; `None` uses the default
    filter: Option<ResizeFilter>,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithmKind::Difference,
            hash_size: dhash::DEFAULT_HASH_SIZE,
            power: idhash::DEFAULT_POWER,
            filter: None,
        }
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the dHash size.
    ///
    /// - 8: 64 bits, fast, good for most uses
    /// - 16: 256 bits, more accurate
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    /// Set the IDHash power (grid side is `2^power`).
    ///
    /// - 3: 8x8 grid, 256-bit fingerprint
    /// - 4: 16x16 grid, 1024-bit fingerprint
    pub fn power(mut self, power: u32) -> Self {
        self.power = power;
        self
    }

    /// Set the resize kernel used by dHash
    pub fn filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Build the hasher, rejecting sizes outside the supported range
    pub fn build(self) -> Result<Box<dyn HashAlgorithm>, HashError> {
        match self.algorithm {
            HashAlgorithmKind::Difference => {
                let hash_size = dhash::check_hash_size(self.hash_size)?;
                let hasher = DifferenceHasher::new(hash_size);
                Ok(Box::new(match self.filter {
                    Some(filter) => hasher.with_filter(filter),
                    None => hasher,
                }))
            }
            HashAlgorithmKind::ImportanceDifference => {
                idhash::side_for_power(self.power)?;
                Ok(Box::new(IdHasher::new(self.power)))
            }
        }
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}
