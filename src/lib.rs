//! # Photo Fingerprint
//!
//! Perceptual image fingerprints for near-duplicate photo detection.
//!
//! Two algorithms are provided:
//! - **dHash** - one bit per horizontal gradient sign, compared by Hamming distance
//! - **IDHash** - gradient signs in both directions plus "importance" bits from
//!   a median threshold; comparison only counts sign changes where a gradient
//!   matters
//!
//! Fingerprints are arbitrary-precision integers ([`Fingerprint`]). Their width
//! follows from the algorithm and size parameter that produced them, so two
//! fingerprints are only comparable when both were taken the same way.
//!
//! ## Architecture
//! - `core` - Fingerprint engines, image preparation and batch helpers
//! - `error` - Error types
//!
//! ## Example
//! ```rust,ignore
//! use photo_fingerprint::{idhash_distance, idhash_fingerprint, ImageSource};
//!
//! let a = idhash_fingerprint(&ImageSource::from("a.jpg"), 3)?;
//! let b = idhash_fingerprint(&ImageSource::from("b.jpg"), 3)?;
//! println!("distance: {}", idhash_distance(&a, &b)?);
//! ```

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use crate::core::hasher::{dhash, idhash};
pub use crate::core::{Fingerprint, ImageSource, PixelGrid, ResizeFilter};
pub use error::{FingerprintError, Result};

/// Difference hash of an image source.
///
/// `hash_size` is the grid side (default 8); `filter` overrides the resize kernel.
pub fn dhash_calculate(
    source: &ImageSource,
    hash_size: u32,
    filter: Option<ResizeFilter>,
) -> Result<Fingerprint> {
    dhash::calculate(source, hash_size, filter)
}

/// Number of differing bits between two dHash fingerprints
pub fn dhash_hamming(a: &Fingerprint, b: &Fingerprint) -> u32 {
    dhash::hamming(a, b)
}

/// IDHash of an image source on a `2^power` grid (default power 3)
pub fn idhash_fingerprint(source: &ImageSource, power: u32) -> Result<Fingerprint> {
    idhash::fingerprint(source, power)
}

/// IDHash distance, inferring each fingerprint's size from its magnitude.
///
/// Fails with a size mismatch when the two were taken with different powers.
pub fn idhash_distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32> {
    Ok(idhash::distance(a, b)?)
}

/// Initialize tracing for the host application
///
/// Honors `RUST_LOG`. Fails if a global subscriber is already installed.
pub fn init_tracing() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| FingerprintError::Config(format!("Failed to set tracing subscriber: {}", e)))
}
