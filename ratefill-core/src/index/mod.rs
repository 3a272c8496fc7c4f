//! Brute-force cosine k-nearest-neighbour index over vendor rows.
//!
//! Fitting computes the cosine distance between every pair of filled vendor
//! vectors and keeps the closest `k` per vendor. The pass is quadratic in the
//! number of vendors, which is acceptable for the matrix sizes this crate
//! targets. The index is immutable once fitted and can be queried from many
//! threads at once.

mod brute;
mod neighbour;
mod params;

use std::sync::Arc;

use tracing::{Span, debug, field, info, instrument};

use crate::{Result, error::RatingError, matrix::RatingMatrix};

use self::brute::BruteForce;
pub use self::{
    neighbour::{Neighbour, NeighbourSet},
    params::{DEFAULT_NEIGHBOURS, ExecutionStrategy, IndexParams, IndexParamsBuilder, SelfMatch},
};

/// Fitted nearest-neighbour structure for one [`RatingMatrix`].
///
/// # Examples
/// ```
/// use ratefill_core::{RatingMatrix, RatingRecord, SimilarityIndex};
///
/// let matrix = RatingMatrix::build(&[
///     RatingRecord::aggregate("V1", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S2", 5.0),
///     RatingRecord::aggregate("V3", "S1", 2.0),
/// ])?;
/// let index = SimilarityIndex::fit(&matrix, 2)?;
/// let nearest = index.query("V1", 2)?;
/// // V3 points the same way as V1; V2 also rated S2.
/// assert_eq!(nearest.ids().collect::<Vec<_>>(), ["V3", "V2"]);
/// assert_eq!(nearest.as_slice()[0].distance, 0.0);
/// # Ok::<(), ratefill_core::RatingError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SimilarityIndex {
    params: IndexParams,
    vendors: Vec<Arc<str>>,
    dimension: usize,
    neighbours: Vec<Vec<Neighbour>>,
}

impl SimilarityIndex {
    /// Fits an index keeping `neighbours` per vendor with default settings.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidNeighbourCount`] when `neighbours` is zero
    /// and [`RatingError::Distance`] when a vendor vector cannot be compared.
    pub fn fit(matrix: &RatingMatrix, neighbours: usize) -> Result<Self> {
        let params = IndexParams::new(neighbours)?;
        Self::fit_with(matrix, &params)
    }

    /// Fits an index using explicit parameters.
    ///
    /// A `k` larger than the number of candidate vendors is clamped: each
    /// neighbour list simply holds every other vendor.
    ///
    /// # Errors
    /// Returns [`RatingError::BackendUnavailable`] when the parameters request
    /// a scheduling this build lacks and [`RatingError::Distance`] when a
    /// vendor vector cannot be compared.
    #[instrument(
        name = "core.index.fit",
        err,
        skip(matrix, params),
        fields(
            vendors = matrix.vendor_count(),
            suppliers = matrix.supplier_count(),
            neighbours = params.neighbours().get(),
            strategy = ?params.execution_strategy(),
            parallel = field::Empty,
        ),
    )]
    pub fn fit_with(matrix: &RatingMatrix, params: &IndexParams) -> Result<Self> {
        let filled = matrix.filled_view();
        let brute = BruteForce::new(
            matrix.vendors(),
            &filled,
            params.neighbours().get(),
            params.self_match(),
        )?;

        let parallel = params.execution_strategy().runs_parallel();
        Span::current().record("parallel", parallel);
        let neighbours = if parallel {
            run_parallel(&brute, params.execution_strategy())?
        } else {
            brute.run_sequential()?
        };

        info!(
            vendors = neighbours.len(),
            dimension = filled.dimension(),
            "similarity index fitted"
        );

        Ok(Self {
            params: params.clone(),
            vendors: matrix.vendors().to_vec(),
            dimension: filled.dimension(),
            neighbours,
        })
    }

    /// Returns the `k` nearest vendors to `vendor_id`.
    ///
    /// Fewer than `k` neighbours come back when the matrix holds fewer
    /// candidate vendors.
    ///
    /// # Errors
    /// Returns [`RatingError::InvalidNeighbourCount`] for `k == 0`,
    /// [`RatingError::NeighbourCountExceedsFit`] when `k` exceeds the fitted
    /// neighbour count and [`RatingError::NotFound`] for an unknown vendor.
    pub fn query(&self, vendor_id: &str, k: usize) -> Result<NeighbourSet> {
        if k == 0 {
            return Err(RatingError::InvalidNeighbourCount { got: k });
        }
        let fitted = self.params.neighbours().get();
        if k > fitted {
            return Err(RatingError::NeighbourCountExceedsFit {
                requested: k,
                fitted,
            });
        }
        let row = self.vendor_row(vendor_id)?;
        let neighbours = &self.neighbours[row];
        let kept = neighbours.len().min(k);
        debug!(vendor_id, k, kept, "similarity index queried");
        Ok(NeighbourSet::new(
            Arc::clone(&self.vendors[row]),
            neighbours[..kept].to_vec(),
        ))
    }

    /// Returns every fitted neighbour of `vendor_id`.
    ///
    /// # Errors
    /// Returns [`RatingError::NotFound`] for an unknown vendor.
    pub fn neighbours(&self, vendor_id: &str) -> Result<&[Neighbour]> {
        let row = self.vendor_row(vendor_id)?;
        Ok(self.neighbours_at(row))
    }

    /// Parameters the index was fitted with.
    #[must_use]
    pub fn params(&self) -> &IndexParams {
        &self.params
    }

    /// Number of vendors covered by the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    /// Whether the index covers no vendors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    /// Length of the vendor vectors the index was fitted on.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Vendor identifiers in row order.
    #[must_use]
    pub fn vendors(&self) -> &[Arc<str>] {
        &self.vendors
    }

    pub(crate) fn neighbours_at(&self, row: usize) -> &[Neighbour] {
        self.neighbours.get(row).map_or(&[], Vec::as_slice)
    }

    fn vendor_row(&self, vendor_id: &str) -> Result<usize> {
        self.vendors
            .binary_search_by(|candidate| (**candidate).cmp(vendor_id))
            .map_err(|_| RatingError::vendor_not_found(vendor_id))
    }
}

#[cfg(feature = "parallel")]
fn run_parallel(brute: &BruteForce<'_>, _requested: ExecutionStrategy) -> Result<Vec<Vec<Neighbour>>> {
    brute.run_parallel()
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(_brute: &BruteForce<'_>, requested: ExecutionStrategy) -> Result<Vec<Vec<Neighbour>>> {
    Err(RatingError::BackendUnavailable { requested })
}

#[cfg(test)]
mod tests;
