//! Weighted-neighbour prediction of missing ratings.
//!
//! For each supplier a vendor has not rated, the neighbours that did rate it
//! contribute `1 − distance` weighted ratings. Weights are normalised to sum to
//! one when their raw sum is positive. When no neighbour rated the supplier the
//! matrix-wide mean is used instead.

mod prediction;

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{Span, debug, field, instrument, warn};

use crate::{
    Result,
    error::RatingError,
    index::{Neighbour, SimilarityIndex},
    matrix::RatingMatrix,
};

pub use self::prediction::{
    Contribution, PredictedRating, Prediction, PredictionBasis, PredictionResult,
    VendorPredictions,
};

/// Predicts missing ratings from a matrix and the index fitted on it.
///
/// The predictor only borrows its inputs and may be shared across threads.
///
/// # Examples
/// ```
/// use ratefill_core::{Predictor, RatingMatrix, RatingRecord, SimilarityIndex};
///
/// let matrix = RatingMatrix::build(&[
///     RatingRecord::aggregate("V1", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S2", 5.0),
///     RatingRecord::aggregate("V3", "S1", 2.0),
/// ])?;
/// let index = SimilarityIndex::fit(&matrix, 2)?;
/// let predictor = Predictor::new(&matrix, &index)?;
///
/// let v1 = predictor.predict_missing("V1")?;
/// assert_eq!(v1.get("S2"), Some(5.0));
/// assert!(predictor.predict_missing("V2")?.is_empty());
/// # Ok::<(), ratefill_core::RatingError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Predictor<'a> {
    matrix: &'a RatingMatrix,
    index: &'a SimilarityIndex,
}

impl<'a> Predictor<'a> {
    /// Pairs a matrix with the index fitted on it.
    ///
    /// # Errors
    /// Returns [`RatingError::IndexMismatch`] when the index was fitted on a
    /// matrix with different vendors or suppliers.
    pub fn new(matrix: &'a RatingMatrix, index: &'a SimilarityIndex) -> Result<Self> {
        if index.vendors() != matrix.vendors() || index.dimension() != matrix.supplier_count() {
            return Err(RatingError::IndexMismatch {
                index_rows: index.len(),
                matrix_rows: matrix.vendor_count(),
            });
        }
        Ok(Self { matrix, index })
    }

    /// Predicts every supplier `vendor_id` has not rated.
    ///
    /// # Errors
    /// Returns [`RatingError::NotFound`] when the vendor is unknown.
    #[instrument(
        name = "core.predict_missing",
        err,
        skip(self, vendor_id),
        fields(vendor_id = %vendor_id, missing = field::Empty, fallbacks = field::Empty),
    )]
    pub fn predict_missing(&self, vendor_id: &str) -> Result<PredictionResult> {
        let row = self.matrix.vendor_row(vendor_id)?;
        let neighbours = self.index.neighbours_at(row);
        let vendor = self.matrix.row_at(row);

        let mut predictions = Vec::new();
        for (column, (supplier, cell)) in vendor.iter().enumerate() {
            if !cell.is_missing() {
                continue;
            }
            let (rating, basis) = self.predict_cell(neighbours, column)?;
            predictions.push(Prediction::new(
                Arc::clone(&self.matrix.suppliers()[column]),
                rating,
                basis,
            ));
            debug!(supplier, rating, "supplier predicted");
        }

        let result = PredictionResult::new(Arc::clone(&self.matrix.vendors()[row]), predictions);
        let span = Span::current();
        span.record("missing", result.len());
        span.record("fallbacks", result.fallback_count());
        Ok(result)
    }

    /// Predicts every vendor in row order.
    ///
    /// Each vendor carries its own [`Result`]; one failure never discards the
    /// predictions of the others. Vendors are spread over the rayon pool when
    /// the index was fitted with a parallel strategy.
    #[instrument(
        name = "core.predict_all",
        skip(self),
        fields(vendors = self.matrix.vendor_count(), failures = field::Empty),
    )]
    pub fn predict_all(&self) -> Vec<VendorPredictions> {
        let predict = |vendor_id: &Arc<str>| VendorPredictions {
            vendor_id: Arc::clone(vendor_id),
            result: self.predict_missing(vendor_id),
        };
        let vendors = self.matrix.vendors();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<VendorPredictions> =
            if self.index.params().execution_strategy().runs_parallel() {
                vendors.par_iter().map(predict).collect()
            } else {
                vendors.iter().map(predict).collect()
            };
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<VendorPredictions> = vendors.iter().map(predict).collect();

        let failures = outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .count();
        Span::current().record("failures", failures);
        if failures > 0 {
            warn!(failures, "some vendors could not be predicted");
        }
        outcomes
    }

    /// Matrix the predictor reads ratings from.
    #[must_use]
    pub fn matrix(&self) -> &'a RatingMatrix {
        self.matrix
    }

    /// Index the predictor reads neighbours from.
    #[must_use]
    pub fn index(&self) -> &'a SimilarityIndex {
        self.index
    }

    fn predict_cell(
        &self,
        neighbours: &[Neighbour],
        column: usize,
    ) -> Result<(f64, PredictionBasis)> {
        let mut contributions: Vec<Contribution> = neighbours
            .iter()
            .filter_map(|neighbour| {
                self.matrix
                    .cell_at(neighbour.row, column)
                    .rating()
                    .map(|rating| Contribution {
                        vendor_id: Arc::clone(&neighbour.vendor_id),
                        distance: neighbour.distance,
                        rating,
                        weight: neighbour.weight(),
                    })
            })
            .collect();

        if contributions.is_empty() {
            return Ok((self.matrix.global_mean()?, PredictionBasis::GlobalMean));
        }

        let total: f64 = contributions.iter().map(|c| c.weight).sum();
        if total > 0.0 {
            for contribution in &mut contributions {
                contribution.weight /= total;
            }
        }
        let rating: f64 = contributions.iter().map(|c| c.weight * c.rating).sum();
        Ok((rating, PredictionBasis::Neighbours(contributions)))
    }
}
