use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing rating JSON files.
#[derive(Debug, Error)]
pub enum RecordProviderError {
    #[error("failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed rating JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "record {index} (vendor `{vendor_id}`, supplier `{supplier_id}`) has neither a rating nor numeric sub-metrics"
    )]
    MissingRating {
        index: usize,
        vendor_id: String,
        supplier_id: String,
    },
    #[error("record {index} has a non-finite `{field}` value")]
    NonFinite { index: usize, field: String },
}

/// Errors raised by the synthetic rating generator.
#[derive(Debug, Error, PartialEq)]
pub enum SyntheticError {
    /// The requested vendor count was zero.
    #[error("vendor count must be greater than zero")]
    ZeroVendors,
    /// The requested supplier count was zero.
    #[error("supplier count must be greater than zero")]
    ZeroSuppliers,
    /// The skip probability lies outside `[0, 1)`.
    #[error("sparsity must lie in [0, 1) (got {value})")]
    InvalidSparsity {
        /// The rejected probability.
        value: f64,
    },
    /// A sampled value was not finite.
    #[error("invalid floating-point parameter `{parameter}`")]
    InvalidFloatParameter {
        /// Name of the sampler that failed.
        parameter: &'static str,
    },
}
