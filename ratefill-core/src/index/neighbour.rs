//! Neighbour ordering semantics for the similarity index.

use std::{cmp::Ordering, sync::Arc};

/// Vendor found near a query vendor, with its cosine distance.
///
/// Neighbours order by ascending distance and then by matrix row, so ties
/// resolve the same way on every run regardless of scheduling.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use ratefill_core::Neighbour;
///
/// let near = Neighbour { vendor_id: Arc::from("V2"), row: 1, distance: 0.1 };
/// let far = Neighbour { vendor_id: Arc::from("V1"), row: 0, distance: 0.4 };
/// assert!(near < far);
/// ```
#[derive(Clone, Debug)]
pub struct Neighbour {
    /// Identifier of the neighbouring vendor.
    pub vendor_id: Arc<str>,
    /// Row of the neighbouring vendor in the rating matrix.
    pub row: usize,
    /// Cosine distance in `[0, 2]` between the query and this vendor.
    pub distance: f64,
}

impl Neighbour {
    /// Weight contributed by this neighbour, `1 − distance`.
    #[must_use]
    pub fn weight(&self) -> f64 {
        1.0 - self.distance
    }
}

impl PartialEq for Neighbour {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbour {}

impl Ord for Neighbour {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.row.cmp(&other.row))
    }
}

impl PartialOrd for Neighbour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordered neighbours returned for one query vendor.
///
/// # Examples
/// ```
/// use ratefill_core::{RatingMatrix, RatingRecord, SimilarityIndex};
///
/// let matrix = RatingMatrix::build(&[
///     RatingRecord::aggregate("V1", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S1", 4.0),
///     RatingRecord::aggregate("V3", "S2", 2.0),
/// ])?;
/// let index = SimilarityIndex::fit(&matrix, 2)?;
/// let set = index.query("V1", 1)?;
/// assert_eq!(set.vendor_id(), "V1");
/// assert_eq!(set.ids().collect::<Vec<_>>(), ["V2"]);
/// # Ok::<(), ratefill_core::RatingError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighbourSet {
    vendor_id: Arc<str>,
    neighbours: Vec<Neighbour>,
}

impl NeighbourSet {
    pub(crate) fn new(vendor_id: Arc<str>, neighbours: Vec<Neighbour>) -> Self {
        Self {
            vendor_id,
            neighbours,
        }
    }

    /// Vendor the neighbours were computed for.
    #[must_use]
    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    /// Neighbours in ascending distance order.
    #[must_use]
    pub fn as_slice(&self) -> &[Neighbour] {
        &self.neighbours
    }

    /// Iterates neighbours in ascending distance order.
    pub fn iter(&self) -> std::slice::Iter<'_, Neighbour> {
        self.neighbours.iter()
    }

    /// Iterates neighbour identifiers in ascending distance order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.neighbours.iter().map(|neighbour| &*neighbour.vendor_id)
    }

    /// Number of neighbours in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    /// Whether the set is empty, which happens for a single-vendor matrix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }

    /// Consumes the set, returning the neighbours.
    #[must_use]
    pub fn into_vec(self) -> Vec<Neighbour> {
        self.neighbours
    }
}

impl<'a> IntoIterator for &'a NeighbourSet {
    type Item = &'a Neighbour;
    type IntoIter = std::slice::Iter<'a, Neighbour>;

    fn into_iter(self) -> Self::IntoIter {
        self.neighbours.iter()
    }
}
