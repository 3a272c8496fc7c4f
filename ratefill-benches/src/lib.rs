//! Benchmark support crate for ratefill.
//!
//! Builds seeded synthetic rating matrices and names benchmark parameters for
//! the Criterion benches over index fitting and prediction.

pub mod error;
pub mod params;
pub mod source;
