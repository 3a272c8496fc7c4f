//! Benchmark setup error type.

use ratefill_core::RatingError;
use ratefill_providers_records::SyntheticError;

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic rating generation failed.
    #[error("synthetic rating generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Matrix construction, fitting or prediction failed.
    #[error("rating pipeline failed: {0}")]
    Rating(#[from] RatingError),
}
