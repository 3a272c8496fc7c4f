//! Prediction result types.

use std::{cmp::Ordering, sync::Arc};

/// A neighbour's share of one prediction.
///
/// Identity, distance and rating travel together so a contribution can never
/// be paired with the wrong neighbour.
#[derive(Clone, Debug, PartialEq)]
pub struct Contribution {
    /// Neighbour that rated the supplier.
    pub vendor_id: Arc<str>,
    /// Cosine distance between the queried vendor and this neighbour.
    pub distance: f64,
    /// The neighbour's rating for the supplier.
    pub rating: f64,
    /// Weight applied to `rating`, normalised when the raw weights sum above
    /// zero.
    pub weight: f64,
}

/// How a predicted rating was obtained.
#[derive(Clone, Debug, PartialEq)]
pub enum PredictionBasis {
    /// No neighbour rated the supplier; the matrix-wide mean was used.
    GlobalMean,
    /// Weighted average over neighbours that rated the supplier, in
    /// neighbour order.
    Neighbours(Vec<Contribution>),
}

impl PredictionBasis {
    /// Whether the prediction fell back to the global mean.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::GlobalMean)
    }

    /// Contributions behind a neighbour-based prediction, empty for the
    /// fallback.
    #[must_use]
    pub fn contributions(&self) -> &[Contribution] {
        match self {
            Self::GlobalMean => &[],
            Self::Neighbours(contributions) => contributions,
        }
    }
}

/// Predicted rating for one supplier the vendor never rated.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    supplier_id: Arc<str>,
    rating: f64,
    basis: PredictionBasis,
}

impl Prediction {
    pub(crate) fn new(supplier_id: Arc<str>, rating: f64, basis: PredictionBasis) -> Self {
        Self {
            supplier_id,
            rating,
            basis,
        }
    }

    /// Supplier the rating was predicted for.
    #[must_use]
    pub fn supplier_id(&self) -> &str {
        &self.supplier_id
    }

    /// Predicted rating.
    #[must_use]
    pub fn rating(&self) -> f64 {
        self.rating
    }

    /// How the rating was obtained.
    #[must_use]
    pub fn basis(&self) -> &PredictionBasis {
        &self.basis
    }
}

/// One exported `(vendor, supplier, predicted rating)` row.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictedRating {
    /// Vendor the prediction belongs to.
    pub vendor_id: Arc<str>,
    /// Supplier the rating was predicted for.
    pub supplier_id: Arc<str>,
    /// Predicted rating.
    pub predicted_rating: f64,
}

/// Predictions for every supplier a vendor has not rated.
///
/// Entries are sorted by predicted rating, highest first. Equal ratings keep
/// supplier column order.
///
/// # Examples
/// ```
/// use ratefill_core::{Predictor, RatingMatrix, RatingRecord, SimilarityIndex};
///
/// let matrix = RatingMatrix::build(&[
///     RatingRecord::aggregate("V1", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S2", 5.0),
/// ])?;
/// let index = SimilarityIndex::fit(&matrix, 1)?;
/// let result = Predictor::new(&matrix, &index)?.predict_missing("V1")?;
/// assert_eq!(result.get("S2"), Some(5.0));
/// let rows = result.to_rows();
/// assert_eq!(&*rows[0].vendor_id, "V1");
/// assert_eq!(rows[0].predicted_rating, 5.0);
/// # Ok::<(), ratefill_core::RatingError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionResult {
    vendor_id: Arc<str>,
    predictions: Vec<Prediction>,
}

impl PredictionResult {
    pub(crate) fn new(vendor_id: Arc<str>, mut predictions: Vec<Prediction>) -> Self {
        // Stable sort keeps column order on ties.
        predictions.sort_by(|left, right| {
            right
                .rating
                .partial_cmp(&left.rating)
                .unwrap_or(Ordering::Equal)
        });
        Self {
            vendor_id,
            predictions,
        }
    }

    /// Vendor the predictions were made for.
    #[must_use]
    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    /// Predicted rating for `supplier_id`, or `None` when the vendor already
    /// rated it or the supplier is unknown.
    #[must_use]
    pub fn get(&self, supplier_id: &str) -> Option<f64> {
        self.predictions
            .iter()
            .find(|prediction| prediction.supplier_id() == supplier_id)
            .map(Prediction::rating)
    }

    /// Predictions, highest rating first.
    #[must_use]
    pub fn as_slice(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Iterates predictions, highest rating first.
    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.predictions.iter()
    }

    /// Number of predicted suppliers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    /// Whether the vendor had nothing left to predict.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Number of predictions that fell back to the global mean.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.predictions
            .iter()
            .filter(|prediction| prediction.basis.is_fallback())
            .count()
    }

    /// Flattens the result into export rows, keeping the sorted order.
    #[must_use]
    pub fn to_rows(&self) -> Vec<PredictedRating> {
        self.predictions
            .iter()
            .map(|prediction| PredictedRating {
                vendor_id: Arc::clone(&self.vendor_id),
                supplier_id: Arc::clone(&prediction.supplier_id),
                predicted_rating: prediction.rating,
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a PredictionResult {
    type Item = &'a Prediction;
    type IntoIter = std::slice::Iter<'a, Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.predictions.iter()
    }
}

/// Outcome of predicting one vendor inside a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct VendorPredictions {
    /// Vendor the batch entry belongs to.
    pub vendor_id: Arc<str>,
    /// Predictions, or the error that aborted this vendor only.
    pub result: crate::Result<PredictionResult>,
}
