//! Matrix cell and row views.

use std::sync::Arc;

/// A single vendor×supplier entry.
///
/// Missing observations are explicit; they never masquerade as a numeric
/// default such as `0.0` or `NaN`.
///
/// # Examples
/// ```
/// use ratefill_core::Cell;
///
/// assert_eq!(Cell::Rated(4.0).rating(), Some(4.0));
/// assert!(Cell::Missing.is_missing());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell {
    /// The vendor rated the supplier.
    Rated(f64),
    /// No observation exists for the pair.
    Missing,
}

impl Cell {
    /// Returns the rating when present.
    #[must_use]
    pub fn rating(self) -> Option<f64> {
        match self {
            Self::Rated(value) => Some(value),
            Self::Missing => None,
        }
    }

    /// Whether the cell holds no observation.
    #[must_use]
    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Value used by the filled view: missing cells count as `0.0`.
    pub(crate) fn filled(self) -> f64 {
        self.rating().unwrap_or(0.0)
    }
}

/// Ordered supplier → cell view over one matrix row.
///
/// # Examples
/// ```
/// use ratefill_core::{Cell, RatingMatrix, RatingRecord};
///
/// let matrix = RatingMatrix::build(&[
///     RatingRecord::aggregate("V1", "S1", 4.0),
///     RatingRecord::aggregate("V2", "S2", 5.0),
/// ])?;
/// let row = matrix.row("V1")?;
/// let cells: Vec<_> = row.iter().collect();
/// assert_eq!(cells, [("S1", Cell::Rated(4.0)), ("S2", Cell::Missing)]);
/// # Ok::<(), ratefill_core::RatingError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    vendor_id: &'a str,
    suppliers: &'a [Arc<str>],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub(crate) fn new(vendor_id: &'a str, suppliers: &'a [Arc<str>], cells: &'a [Cell]) -> Self {
        debug_assert_eq!(suppliers.len(), cells.len());
        Self {
            vendor_id,
            suppliers,
            cells,
        }
    }

    /// Returns the vendor owning this row.
    #[must_use]
    pub fn vendor_id(&self) -> &'a str {
        self.vendor_id
    }

    /// Number of suppliers (columns) in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the matrix has no supplier columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell for `supplier_id`, or `None` for an unknown supplier.
    #[must_use]
    pub fn get(&self, supplier_id: &str) -> Option<Cell> {
        self.suppliers
            .iter()
            .position(|supplier| &**supplier == supplier_id)
            .and_then(|column| self.cells.get(column).copied())
    }

    /// Iterates `(supplier_id, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Cell)> + use<'a> {
        self.suppliers
            .iter()
            .map(|supplier| &**supplier)
            .zip(self.cells.iter().copied())
    }

    /// Returns the raw cells in column order.
    #[must_use]
    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }
}
