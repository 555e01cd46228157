//! # Core Module
//!
//! The fingerprint engine.
//!
//! ## Modules
//! - `fingerprint` - Arbitrary-precision fingerprint values
//! - `popcount` - Hardware and portable bit counting
//! - `median` - Tie-sensitive median used by IDHash
//! - `grid` - Pixel grids consumed by the algorithms
//! - `imaging` - Decoding, alpha flattening, grayscale and resizing
//! - `hasher` - dHash and IDHash algorithms and their distances
//! - `batch` - Parallel fingerprinting of many sources

pub mod batch;
pub mod fingerprint;
pub mod grid;
pub mod hasher;
pub mod imaging;
pub mod median;
pub mod popcount;

// Re-export commonly used types
pub use fingerprint::Fingerprint;
pub use grid::PixelGrid;
pub use hasher::{HashAlgorithmKind, HasherConfig, ImageHashValue, PerceptualHash};
pub use imaging::{ImageSource, ResizeFilter};
