//! Shared test utilities for the vector-render workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A recording layer and render target for observing draw passes
//! - Feature cache generators
//! - Common bounding boxes and style records
//! - Path helpers for test data and temporary output
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in integration tests:
//!
//! ```ignore
//! use test_utils::{RecordingLayer, RecordingTarget, fixtures};
//! ```
//!
//! The recording types implement traits from `feature-renderer`, so use them
//! from a crate's `tests/` directory rather than its inline unit tests.

pub mod fixtures;
pub mod generators;
pub mod layer;
pub mod paths;
pub mod target;

// Re-export commonly used items at the crate root
pub use generators::*;
pub use layer::RecordingLayer;
pub use paths::*;
pub use target::RecordingTarget;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro asserting that a sequence of progress fractions ends at 1.0 and
/// never decreases.
///
/// ```ignore
/// assert_progress_complete!(layer.reports(), 5);
/// ```
#[macro_export]
macro_rules! assert_progress_complete {
    ($reports:expr, $count:expr) => {{
        let reports: Vec<f32> = $reports;
        assert_eq!(reports.len(), $count, "progress reports: {:?}", reports);
        assert!(
            reports.windows(2).all(|w| w[0] <= w[1]),
            "progress went backwards: {:?}",
            reports
        );
        $crate::assert_approx_eq!(*reports.last().expect("no progress reported"), 1.0, 1e-6);
    }};
}
