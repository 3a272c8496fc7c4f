//! Dense vendor×supplier rating matrix with explicit missing cells.
//!
//! Rows are the distinct vendors seen in the input and columns the distinct
//! suppliers, both sorted by identifier so every run lays the matrix out the
//! same way. The full cross-product is materialised; pairs without an
//! observation hold [`Cell::Missing`].

mod cell;
mod filled;

use std::{collections::BTreeSet, sync::Arc};

use tracing::{Span, debug, field, instrument};

use crate::{Result, error::RatingError, record::RatingRecord};

pub use self::{
    cell::{Cell, Row},
    filled::FilledView,
};

/// Immutable rating matrix built once from the full record set.
///
/// # Examples
/// ```
/// use ratefill_core::{Cell, RatingMatrix, RatingRecord};
///
/// let matrix = RatingMatrix::build(&[
///     RatingRecord::aggregate("V1", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S2", 5.0),
///     RatingRecord::aggregate("V3", "S1", 2.0),
/// ])?;
/// assert_eq!(matrix.vendor_count(), 3);
/// assert_eq!(matrix.supplier_count(), 2);
/// assert_eq!(matrix.cell("V1", "S2")?, Cell::Missing);
/// assert_eq!(matrix.global_mean()?, 3.75);
/// # Ok::<(), ratefill_core::RatingError>(())
/// ```
#[derive(Clone, Debug)]
pub struct RatingMatrix {
    vendors: Vec<Arc<str>>,
    suppliers: Vec<Arc<str>>,
    cells: Vec<Cell>,
    rated: usize,
    global_mean: Option<f64>,
}

impl RatingMatrix {
    /// Builds the matrix from every observation.
    ///
    /// # Errors
    /// Returns [`RatingError::DuplicateEntry`] when two records share a vendor
    /// and supplier, and [`RatingError::InvalidRating`] when a record carries a
    /// non-finite aggregate. No matrix is produced in either case.
    #[instrument(
        name = "core.matrix.build",
        err,
        skip(records),
        fields(records = records.len(), vendors = field::Empty, suppliers = field::Empty),
    )]
    pub fn build(records: &[RatingRecord]) -> Result<Self> {
        let mut vendors = BTreeSet::new();
        let mut suppliers = BTreeSet::new();
        for record in records {
            let value = record.aggregate_rating();
            if !value.is_finite() {
                return Err(RatingError::InvalidRating {
                    vendor_id: Arc::clone(record.vendor_arc()),
                    supplier_id: Arc::clone(record.supplier_arc()),
                    value,
                });
            }
            vendors.insert(Arc::clone(record.vendor_arc()));
            suppliers.insert(Arc::clone(record.supplier_arc()));
        }

        let vendors: Vec<Arc<str>> = vendors.into_iter().collect();
        let suppliers: Vec<Arc<str>> = suppliers.into_iter().collect();
        let width = suppliers.len();
        let mut cells = vec![Cell::Missing; vendors.len() * width];

        for record in records {
            let row = position(&vendors, record.vendor_id())
                .ok_or_else(|| RatingError::vendor_not_found(record.vendor_id()))?;
            let column = position(&suppliers, record.supplier_id())
                .ok_or_else(|| RatingError::supplier_not_found(record.supplier_id()))?;
            let slot = &mut cells[row * width + column];
            if !slot.is_missing() {
                return Err(RatingError::DuplicateEntry {
                    vendor_id: Arc::clone(record.vendor_arc()),
                    supplier_id: Arc::clone(record.supplier_arc()),
                });
            }
            *slot = Cell::Rated(record.aggregate_rating());
        }

        let (rated, global_mean) = mean_of_rated(&cells);

        let span = Span::current();
        span.record("vendors", vendors.len());
        span.record("suppliers", suppliers.len());
        debug!(rated, cells = cells.len(), "rating matrix built");

        Ok(Self {
            vendors,
            suppliers,
            cells,
            rated,
            global_mean,
        })
    }

    /// Returns the cell for `vendor_id` × `supplier_id`.
    ///
    /// # Errors
    /// Returns [`RatingError::NotFound`] when either identifier is unknown.
    pub fn cell(&self, vendor_id: &str, supplier_id: &str) -> Result<Cell> {
        let row = self.vendor_row(vendor_id)?;
        let column = position(&self.suppliers, supplier_id)
            .ok_or_else(|| RatingError::supplier_not_found(supplier_id))?;
        Ok(self.cell_at(row, column))
    }

    /// Returns the ordered supplier → cell view for `vendor_id`.
    ///
    /// # Errors
    /// Returns [`RatingError::NotFound`] when the vendor is unknown.
    pub fn row(&self, vendor_id: &str) -> Result<Row<'_>> {
        let row = self.vendor_row(vendor_id)?;
        Ok(self.row_at(row))
    }

    /// Arithmetic mean of every rated cell.
    ///
    /// # Errors
    /// Returns [`RatingError::EmptyDataset`] when the matrix holds no ratings.
    pub fn global_mean(&self) -> Result<f64> {
        self.global_mean.ok_or(RatingError::EmptyDataset)
    }

    /// Suppliers `vendor_id` has not rated, in column order.
    ///
    /// # Errors
    /// Returns [`RatingError::NotFound`] when the vendor is unknown.
    pub fn missing_suppliers(&self, vendor_id: &str) -> Result<Vec<&str>> {
        let row = self.row(vendor_id)?;
        Ok(row
            .iter()
            .filter(|(_, cell)| cell.is_missing())
            .map(|(supplier, _)| supplier)
            .collect())
    }

    /// Builds the filled view used for vector similarity.
    #[must_use]
    pub fn filled_view(&self) -> FilledView {
        FilledView::from_cells(self.vendors.len(), self.suppliers.len(), &self.cells)
    }

    /// Vendor identifiers in row order.
    #[must_use]
    pub fn vendors(&self) -> &[Arc<str>] {
        &self.vendors
    }

    /// Supplier identifiers in column order.
    #[must_use]
    pub fn suppliers(&self) -> &[Arc<str>] {
        &self.suppliers
    }

    /// Number of vendor rows.
    #[must_use]
    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    /// Number of supplier columns.
    #[must_use]
    pub fn supplier_count(&self) -> usize {
        self.suppliers.len()
    }

    /// Number of rated cells.
    #[must_use]
    pub fn rated_count(&self) -> usize {
        self.rated
    }

    /// Whether the matrix has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    /// Fraction of cells that hold a rating, `0.0` for an empty matrix.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "cell counts stay far below the f64 mantissa"
    )]
    pub fn density(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.rated as f64 / self.cells.len() as f64
    }

    pub(crate) fn vendor_row(&self, vendor_id: &str) -> Result<usize> {
        position(&self.vendors, vendor_id).ok_or_else(|| RatingError::vendor_not_found(vendor_id))
    }

    pub(crate) fn row_at(&self, row: usize) -> Row<'_> {
        let width = self.suppliers.len();
        let start = row * width;
        Row::new(
            &self.vendors[row],
            &self.suppliers,
            &self.cells[start..start + width],
        )
    }

    pub(crate) fn cell_at(&self, row: usize, column: usize) -> Cell {
        self.cells[row * self.suppliers.len() + column]
    }
}

fn position(ids: &[Arc<str>], id: &str) -> Option<usize> {
    ids.binary_search_by(|candidate| (**candidate).cmp(id)).ok()
}

#[expect(
    clippy::cast_precision_loss,
    reason = "rating counts stay far below the f64 mantissa"
)]
fn mean_of_rated(cells: &[Cell]) -> (usize, Option<f64>) {
    let (sum, count) = cells
        .iter()
        .filter_map(|cell| cell.rating())
        .fold((0.0_f64, 0_usize), |(sum, count), value| (sum + value, count + 1));
    let mean = (count > 0).then(|| sum / count as f64);
    (count, mean)
}

#[cfg(test)]
mod tests;
