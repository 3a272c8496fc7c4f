//! Unit tests for rating matrix construction and lookups.

use super::*;
use crate::{IdKind, RatingErrorCode};
use rstest::{fixture, rstest};

#[fixture]
fn records() -> Vec<RatingRecord> {
    vec![
        RatingRecord::aggregate("V2", "S2", 5.0),
        RatingRecord::aggregate("V1", "S1", 4.0),
        RatingRecord::aggregate("V3", "S1", 2.0),
        RatingRecord::aggregate("V2", "S1", 4.0),
    ]
}

#[rstest]
fn rows_and_columns_are_sorted_and_unique(records: Vec<RatingRecord>) {
    let matrix = RatingMatrix::build(&records).expect("records are valid");
    let vendors: Vec<&str> = matrix.vendors().iter().map(|id| &**id).collect();
    let suppliers: Vec<&str> = matrix.suppliers().iter().map(|id| &**id).collect();
    assert_eq!(vendors, ["V1", "V2", "V3"]);
    assert_eq!(suppliers, ["S1", "S2"]);
    assert_eq!(matrix.rated_count(), 4);
}

#[rstest]
#[case("V1", "S1", Cell::Rated(4.0))]
#[case("V1", "S2", Cell::Missing)]
#[case("V2", "S2", Cell::Rated(5.0))]
#[case("V3", "S2", Cell::Missing)]
fn cell_reports_rating_or_missing(
    records: Vec<RatingRecord>,
    #[case] vendor: &str,
    #[case] supplier: &str,
    #[case] expected: Cell,
) {
    let matrix = RatingMatrix::build(&records).expect("records are valid");
    assert_eq!(matrix.cell(vendor, supplier).expect("ids exist"), expected);
}

#[rstest]
fn duplicate_pair_is_rejected(mut records: Vec<RatingRecord>) {
    records.push(RatingRecord::aggregate("V1", "S1", 1.0));
    let err = RatingMatrix::build(&records).expect_err("duplicates must fail");
    assert_eq!(err.code(), RatingErrorCode::DuplicateEntry);
    assert!(matches!(
        err,
        RatingError::DuplicateEntry { ref vendor_id, ref supplier_id }
            if &**vendor_id == "V1" && &**supplier_id == "S1"
    ));
}

#[rstest]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn non_finite_rating_is_rejected(mut records: Vec<RatingRecord>, #[case] value: f64) {
    records.push(RatingRecord::aggregate("V4", "S1", value));
    let err = RatingMatrix::build(&records).expect_err("non-finite ratings must fail");
    assert_eq!(err.code(), RatingErrorCode::InvalidRating);
}

#[rstest]
fn global_mean_covers_every_rated_cell(records: Vec<RatingRecord>) {
    let matrix = RatingMatrix::build(&records).expect("records are valid");
    assert_eq!(matrix.global_mean().expect("ratings exist"), 3.75);
}

#[test]
fn global_mean_of_empty_matrix_fails() {
    let matrix = RatingMatrix::build(&[]).expect("empty input builds an empty matrix");
    assert!(matrix.is_empty());
    assert_eq!(matrix.global_mean(), Err(RatingError::EmptyDataset));
    assert_eq!(matrix.density(), 0.0);
}

#[rstest]
#[case::vendor("V9", "S1", IdKind::Vendor, "V9")]
#[case::supplier("V1", "S9", IdKind::Supplier, "S9")]
fn unknown_ids_are_not_found(
    records: Vec<RatingRecord>,
    #[case] vendor: &str,
    #[case] supplier: &str,
    #[case] kind: IdKind,
    #[case] id: &str,
) {
    let matrix = RatingMatrix::build(&records).expect("records are valid");
    let err = matrix.cell(vendor, supplier).expect_err("unknown id must fail");
    assert_eq!(
        err,
        RatingError::NotFound {
            kind,
            id: Arc::from(id),
        }
    );
}

#[rstest]
fn row_lists_every_supplier_in_column_order(records: Vec<RatingRecord>) {
    let matrix = RatingMatrix::build(&records).expect("records are valid");
    let row = matrix.row("V3").expect("vendor exists");
    assert_eq!(row.vendor_id(), "V3");
    assert_eq!(row.len(), 2);
    assert_eq!(row.get("S1"), Some(Cell::Rated(2.0)));
    assert_eq!(row.get("S9"), None);
    let cells: Vec<_> = row.iter().collect();
    assert_eq!(cells, [("S1", Cell::Rated(2.0)), ("S2", Cell::Missing)]);
}

#[rstest]
fn missing_suppliers_exclude_rated_cells(records: Vec<RatingRecord>) {
    let matrix = RatingMatrix::build(&records).expect("records are valid");
    assert_eq!(matrix.missing_suppliers("V1").expect("vendor exists"), ["S2"]);
    assert!(matrix.missing_suppliers("V2").expect("vendor exists").is_empty());
}

#[rstest]
fn filled_view_substitutes_zero_for_missing(records: Vec<RatingRecord>) {
    let matrix = RatingMatrix::build(&records).expect("records are valid");
    let filled = matrix.filled_view();
    assert_eq!(filled.rows(), 3);
    assert_eq!(filled.dimension(), 2);
    assert_eq!(filled.data(), [4.0, 0.0, 4.0, 5.0, 2.0, 0.0]);
    assert_eq!(filled.row(3), None);
    assert_eq!(filled.iter().count(), 3);
}

#[rstest]
fn density_counts_rated_fraction(records: Vec<RatingRecord>) {
    let matrix = RatingMatrix::build(&records).expect("records are valid");
    assert!((matrix.density() - 4.0 / 6.0).abs() < 1e-12);
}
