//! Benchmark parameter types.

use std::fmt;

/// Shape of a synthetic rating matrix under benchmark.
#[derive(Clone, Copy, Debug)]
pub struct MatrixBenchParams {
    /// Vendor rows.
    pub vendor_count: usize,
    /// Supplier columns.
    pub supplier_count: usize,
}

impl fmt::Display for MatrixBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={},s={}", self.vendor_count, self.supplier_count)
    }
}
