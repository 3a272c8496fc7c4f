//! Rating record providers: JSON files and a seeded synthetic generator.

mod errors;
mod json;
mod synthetic;

pub use errors::{RecordProviderError, SyntheticError};
pub use json::{
    load_records, read_records, save_predictions, save_records, write_predictions, write_records,
};
pub use synthetic::{
    MAX_SCORE, METRICS, MIN_SCORE, MetricProfile, SyntheticRatingsConfig, generate_ratings,
};
