//! Error types for the benchmark engine.

use thiserror::Error;

/// Errors produced by [`Bencher`](crate::Bencher) construction and statistics.
///
/// A failing timed block is *not* represented here: the caller's own error
/// type flows through [`Bencher::try_run`](crate::Bencher::try_run) unchanged
/// once the partial measurement has been recorded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BenchError {
    /// `bestof` group size must be at least 1.
    #[error("bestof group size must be at least 1, got {0}")]
    InvalidBestof(usize),

    /// A fixed iteration count must be at least 1.
    #[error("fixed iteration count must be at least 1, got {0}")]
    InvalidIterations(usize),

    /// A statistic was requested before any measurement was recorded.
    ///
    /// Recoverable: run at least one iteration first.
    #[error("no measurements recorded yet")]
    EmptyMeasurement,
}
