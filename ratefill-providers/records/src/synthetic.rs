//! Seeded generator for sparse vendor×supplier ratings.
//!
//! Every vendor/supplier pair is either skipped, with probability
//! `sparsity`, or scored on six supplier metrics drawn from clipped normal
//! distributions. The record's rating is the mean of its metrics.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use ratefill_core::{RatingRecord, SubMetrics};
use tracing::{debug, instrument};

use crate::errors::SyntheticError;

/// Lowest score any metric can take.
pub const MIN_SCORE: f64 = 1.0;
/// Highest score any metric can take.
pub const MAX_SCORE: f64 = 5.0;

/// Normal distribution a metric is sampled from before clipping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricProfile {
    /// Field name used in exported records.
    pub name: &'static str,
    /// Mean of the underlying normal distribution.
    pub mean: f64,
    /// Standard deviation of the underlying normal distribution.
    pub std_dev: f64,
    /// Whether the sampled value measures something bad, so the score is
    /// `MAX_SCORE − sample`.
    pub inverted: bool,
}

/// The six supplier metrics, in the order they are sampled.
pub const METRICS: [MetricProfile; 6] = [
    MetricProfile {
        name: "freshness_rating",
        mean: 4.0,
        std_dev: 0.5,
        inverted: false,
    },
    MetricProfile {
        name: "rejection_rate",
        mean: 1.0,
        std_dev: 0.3,
        inverted: true,
    },
    MetricProfile {
        name: "on_time_delivery",
        mean: 4.0,
        std_dev: 0.7,
        inverted: false,
    },
    MetricProfile {
        name: "fulfillment_accuracy",
        mean: 4.0,
        std_dev: 0.5,
        inverted: false,
    },
    MetricProfile {
        name: "value_for_money",
        mean: 4.0,
        std_dev: 0.7,
        inverted: false,
    },
    MetricProfile {
        name: "customer_support",
        mean: 3.5,
        std_dev: 0.8,
        inverted: false,
    },
];

/// Shape and seed of a synthetic rating set.
///
/// # Examples
/// ```
/// use ratefill_providers_records::SyntheticRatingsConfig;
///
/// let config = SyntheticRatingsConfig::default();
/// assert_eq!((config.vendor_count, config.supplier_count), (10, 5));
/// assert_eq!(config.sparsity, 0.4);
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticRatingsConfig {
    /// Number of vendors, named `V1..=Vn`.
    pub vendor_count: usize,
    /// Number of suppliers, named `S1..=Sn`.
    pub supplier_count: usize,
    /// Probability in `[0, 1)` that a pair is left unrated.
    pub sparsity: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

impl Default for SyntheticRatingsConfig {
    fn default() -> Self {
        Self {
            vendor_count: 10,
            supplier_count: 5,
            sparsity: 0.4,
            seed: 42,
        }
    }
}

impl SyntheticRatingsConfig {
    fn validate(&self) -> Result<(), SyntheticError> {
        if self.vendor_count == 0 {
            return Err(SyntheticError::ZeroVendors);
        }
        if self.supplier_count == 0 {
            return Err(SyntheticError::ZeroSuppliers);
        }
        if !(0.0..1.0).contains(&self.sparsity) {
            return Err(SyntheticError::InvalidSparsity {
                value: self.sparsity,
            });
        }
        Ok(())
    }
}

/// Generates a sparse rating set.
///
/// Pairs are visited vendor-major. When every pair happens to be skipped the
/// last pair is rated anyway, so the result is never empty.
///
/// # Errors
/// Returns [`SyntheticError`] when the configuration is invalid.
///
/// # Examples
/// ```
/// use ratefill_providers_records::{SyntheticRatingsConfig, generate_ratings};
///
/// let records = generate_ratings(&SyntheticRatingsConfig::default())?;
/// assert!(!records.is_empty());
/// assert!(records.len() <= 50);
/// assert!(records.iter().all(|r| (1.0..=5.0).contains(&r.aggregate_rating())));
/// # Ok::<(), ratefill_providers_records::SyntheticError>(())
/// ```
#[instrument(
    name = "records.generate",
    err,
    skip(config),
    fields(
        vendors = config.vendor_count,
        suppliers = config.supplier_count,
        sparsity = config.sparsity,
        seed = config.seed,
    ),
)]
pub fn generate_ratings(config: &SyntheticRatingsConfig) -> Result<Vec<RatingRecord>, SyntheticError> {
    config.validate()?;
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut records = Vec::new();

    for vendor in 1..=config.vendor_count {
        for supplier in 1..=config.supplier_count {
            if rng.gen_range(0.0_f64..1.0) < config.sparsity {
                continue;
            }
            records.push(rated_pair(&mut rng, vendor, supplier)?);
        }
    }

    if records.is_empty() {
        records.push(rated_pair(
            &mut rng,
            config.vendor_count,
            config.supplier_count,
        )?);
    }

    debug!(records = records.len(), "synthetic ratings generated");
    Ok(records)
}

fn rated_pair(
    rng: &mut SmallRng,
    vendor: usize,
    supplier: usize,
) -> Result<RatingRecord, SyntheticError> {
    let mut metrics = SubMetrics::new();
    for profile in &METRICS {
        metrics.insert(profile.name.to_owned(), sample_metric(rng, profile)?);
    }
    RatingRecord::from_sub_metrics(format!("V{vendor}"), format!("S{supplier}"), metrics).ok_or(
        SyntheticError::InvalidFloatParameter {
            parameter: "metrics",
        },
    )
}

fn sample_metric(rng: &mut SmallRng, profile: &MetricProfile) -> Result<f64, SyntheticError> {
    let sample = profile.mean + profile.std_dev * standard_normal_sample(rng)?;
    let score = if profile.inverted {
        MAX_SCORE - sample
    } else {
        sample
    };
    Ok(score.clamp(MIN_SCORE, MAX_SCORE))
}

fn standard_normal_sample(rng: &mut SmallRng) -> Result<f64, SyntheticError> {
    let u1 = rng.gen_range(0.0_f64..1.0_f64).max(f64::EPSILON);
    let u2 = rng.gen_range(0.0_f64..1.0_f64);
    let radius = (-2.0_f64 * u1.ln()).sqrt();
    let sample = radius * (2.0_f64 * PI * u2).cos();
    if sample.is_finite() {
        Ok(sample)
    } else {
        Err(SyntheticError::InvalidFloatParameter {
            parameter: "standard_normal_sample",
        })
    }
}
