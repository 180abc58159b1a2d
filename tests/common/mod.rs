//! Common test utilities for integration tests
//!
//! Provides the reference expansion of pi and small helpers shared by the
//! integration test files.

#![allow(dead_code)]

use std::path::PathBuf;

use picalc::{Outcome, PiApproximation};
use tempfile::TempDir;

/// Path of the reference fixture (3200 decimals)
pub fn reference_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/pi_reference.txt")
}

/// The reference expansion, trimmed
pub fn reference() -> String {
    std::fs::read_to_string(reference_path())
        .expect("Failed to read reference fixture")
        .trim()
        .to_string()
}

/// Pi truncated to `digits` significant digits, e.g. `3.14` for 3.
pub fn pi_truncated(digits: u64) -> String {
    let reference = reference();
    let end = if digits <= 1 { 1 } else { digits as usize + 1 };
    reference[..end].to_string()
}

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Unwrap a finalized outcome
pub fn finalized(outcome: Outcome) -> PiApproximation {
    match outcome {
        Outcome::Finalized(approximation) => approximation,
        Outcome::Cancelled { .. } => panic!("Expected a finalized outcome"),
    }
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
