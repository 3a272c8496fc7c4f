//! Zero-filled numeric view of the rating matrix.

use super::Cell;

/// Row-major matrix where missing cells read as `0.0`.
///
/// This view only feeds vector similarity. It cannot answer whether a vendor
/// rated a supplier; use [`super::RatingMatrix::cell`] for that.
///
/// # Examples
/// ```
/// use ratefill_core::{RatingMatrix, RatingRecord};
///
/// let matrix = RatingMatrix::build(&[
///     RatingRecord::aggregate("V1", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S2", 5.0),
/// ])?;
/// let filled = matrix.filled_view();
/// assert_eq!(filled.row(0), Some(&[4.0, 0.0][..]));
/// assert_eq!(filled.row(1), Some(&[0.0, 5.0][..]));
/// # Ok::<(), ratefill_core::RatingError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FilledView {
    rows: usize,
    dimension: usize,
    values: Vec<f64>,
}

impl FilledView {
    pub(crate) fn from_cells(rows: usize, dimension: usize, cells: &[Cell]) -> Self {
        debug_assert_eq!(cells.len(), rows * dimension);
        Self {
            rows,
            dimension,
            values: cells.iter().map(|cell| cell.filled()).collect(),
        }
    }

    /// Number of vendor rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Length of each row vector.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the vector for `row`, or `None` when out of bounds.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.values.get(start..end)
    }

    /// Iterates row vectors in matrix order.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).filter_map(|row| self.row(row))
    }

    /// Returns the underlying row-major buffer.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.values
    }
}
