//! Hash algorithm implementations.

pub mod dhash;
pub mod idhash;

pub use dhash::DifferenceHasher;
pub use idhash::IdHasher;
