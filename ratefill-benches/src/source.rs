//! Seeded rating matrices for benchmarks.

use ratefill_core::RatingMatrix;
use ratefill_providers_records::{SyntheticRatingsConfig, generate_ratings};

use crate::{error::BenchSetupError, params::MatrixBenchParams};

/// Skip probability used for every benchmark matrix.
pub const SPARSITY: f64 = 0.4;

/// Builds a synthetic matrix with the requested shape.
///
/// # Errors
/// Returns [`BenchSetupError`] when generation or matrix construction fails.
pub fn synthetic_matrix(
    params: MatrixBenchParams,
    seed: u64,
) -> Result<RatingMatrix, BenchSetupError> {
    let records = generate_ratings(&SyntheticRatingsConfig {
        vendor_count: params.vendor_count,
        supplier_count: params.supplier_count,
        sparsity: SPARSITY,
        seed,
    })?;
    Ok(RatingMatrix::build(&records)?)
}
