//! Rating observations fed into the matrix.

use std::{collections::BTreeMap, sync::Arc};

/// Named sub-metric scores that make up an aggregate rating.
pub type SubMetrics = BTreeMap<String, f64>;

/// A single vendor-on-supplier observation.
///
/// The aggregate rating is fixed when the record is created and never changes
/// afterwards.
///
/// # Examples
/// ```
/// use ratefill_core::{RatingRecord, SubMetrics};
///
/// let metrics = SubMetrics::from([
///     ("freshness_rating".to_owned(), 4.0),
///     ("customer_support".to_owned(), 3.0),
/// ]);
/// let record = RatingRecord::from_sub_metrics("V1", "S1", metrics).expect("metrics present");
/// assert_eq!(record.aggregate_rating(), 3.5);
/// assert_eq!(record.vendor_id(), "V1");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RatingRecord {
    vendor_id: Arc<str>,
    supplier_id: Arc<str>,
    aggregate_rating: f64,
    sub_metrics: SubMetrics,
}

impl RatingRecord {
    /// Creates a record with an explicit aggregate rating.
    #[must_use]
    pub fn new(
        vendor_id: impl Into<Arc<str>>,
        supplier_id: impl Into<Arc<str>>,
        aggregate_rating: f64,
        sub_metrics: SubMetrics,
    ) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            supplier_id: supplier_id.into(),
            aggregate_rating,
            sub_metrics,
        }
    }

    /// Creates a record with only an aggregate rating.
    ///
    /// # Examples
    /// ```
    /// use ratefill_core::RatingRecord;
    ///
    /// let record = RatingRecord::aggregate("V2", "S1", 4.0);
    /// assert!(record.sub_metrics().is_empty());
    /// ```
    #[must_use]
    pub fn aggregate(
        vendor_id: impl Into<Arc<str>>,
        supplier_id: impl Into<Arc<str>>,
        aggregate_rating: f64,
    ) -> Self {
        Self::new(vendor_id, supplier_id, aggregate_rating, SubMetrics::new())
    }

    /// Creates a record whose aggregate is the arithmetic mean of `sub_metrics`.
    ///
    /// Returns `None` when no sub-metrics are supplied.
    #[must_use]
    pub fn from_sub_metrics(
        vendor_id: impl Into<Arc<str>>,
        supplier_id: impl Into<Arc<str>>,
        sub_metrics: SubMetrics,
    ) -> Option<Self> {
        let aggregate = mean(sub_metrics.values().copied())?;
        Some(Self::new(vendor_id, supplier_id, aggregate, sub_metrics))
    }

    /// Returns the rating vendor.
    #[must_use]
    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    /// Returns the rated supplier.
    #[must_use]
    pub fn supplier_id(&self) -> &str {
        &self.supplier_id
    }

    /// Returns the aggregate rating.
    #[must_use]
    pub fn aggregate_rating(&self) -> f64 {
        self.aggregate_rating
    }

    /// Returns the sub-metric scores, ordered by name.
    #[must_use]
    pub fn sub_metrics(&self) -> &SubMetrics {
        &self.sub_metrics
    }

    pub(crate) fn vendor_arc(&self) -> &Arc<str> {
        &self.vendor_id
    }

    pub(crate) fn supplier_arc(&self) -> &Arc<str> {
        &self.supplier_id
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "sub-metric counts are tiny compared to f64 mantissa"
)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0_f64, 0_usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    (count > 0).then(|| sum / count as f64)
}
