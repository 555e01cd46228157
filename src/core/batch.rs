//! Parallel fingerprinting of independent image sources.
//!
//! Every source is hashed on the rayon pool; a failing source is reported in
//! its outcome and never stops the others.

use super::hasher::{HashAlgorithm, ImageHashValue};
use super::imaging::ImageSource;
use rayon::prelude::*;

/// Result of fingerprinting one source
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Label of the source (path or buffer size)
    pub source: String,
    /// The hash, or the error message explaining why there is none
    pub result: Result<ImageHashValue, String>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fingerprint all sources in parallel, keeping input order
pub fn fingerprint_all(hasher: &dyn HashAlgorithm, sources: &[ImageSource]) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = sources
        .par_iter()
        .map(|source| {
            let label = source.label();
            let result = hasher.hash_source(source).map_err(|e| {
                tracing::warn!(source = %label, error = %e, "fingerprint failed");
                e.to_string()
            });
            BatchOutcome {
                source: label,
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
    tracing::debug!(
        algorithm = %hasher.kind(),
        total = outcomes.len(),
        failed,
        "batch fingerprinting finished"
    );
    outcomes
}
