//! Tracing setup runs in its own test binary: the global subscriber can only
//! be installed once per process.

use photo_fingerprint::{init_tracing, FingerprintError};

#[test]
fn init_tracing_installs_once() {
    assert!(init_tracing().is_ok());
    assert!(matches!(init_tracing(), Err(FingerprintError::Config(_))));
}
