//! # Error Module
//!
//! Error types for fingerprint computation and comparison.
//!
//! ## Design Principles
//! - **Never panic** on image data - return errors instead
//! - **Include context** - paths, sizes, what went wrong
//! - **No silent coercion** - comparing fingerprints of different sizes is an error

use std::path::PathBuf;
use thiserror::Error;

/// Top-level library error
#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("Image acquisition error: {0}")]
    Acquire(#[from] AcquireError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while loading or preparing an image.
///
/// These are propagated unchanged; nothing in this crate retries them.
#[derive(Error, Debug)]
pub enum AcquireError {
    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {origin}: {reason}")]
    Decode { origin: String, reason: String },

    #[error("Image is empty or corrupted: {origin}")]
    EmptyImage { origin: String },

    #[error("Resize failed: {0}")]
    Resize(String),
}

/// Precondition violations while computing a fingerprint
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HashError {
    #[error("Unsupported {parameter}: {value} (must be {min}-{max})")]
    UnsupportedSize {
        parameter: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("Pixel grid is {actual}, expected {expected}")]
    GridShape { expected: String, actual: String },

    #[error("Invalid pixel grid: {0}")]
    InvalidGrid(String),
}

/// Errors that occur when comparing fingerprints
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CompareError {
    #[error("Fingerprints were taken with different sizes: {left} and {right}")]
    SizeMismatch { left: u32, right: u32 },

    #[error("Cannot compare a {left} fingerprint with a {right} fingerprint")]
    AlgorithmMismatch { left: String, right: String },

    #[error("Fingerprint has {bits} bits, more than the {max} its size allows")]
    FingerprintTooWide { bits: u64, max: u64 },

    #[error("Unsupported power: {power}")]
    UnsupportedPower { power: u32 },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FingerprintError>;
