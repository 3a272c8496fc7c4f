use std::sync::Arc;

use ratefill_core::{DistanceError, ExecutionStrategy, IdKind, RatingError, RatingErrorCode};
use rstest::rstest;

#[rstest]
#[case(
    RatingError::NotFound { kind: IdKind::Vendor, id: Arc::from("V9") },
    RatingErrorCode::NotFound,
    "RATEFILL_NOT_FOUND",
)]
#[case(
    RatingError::DuplicateEntry { vendor_id: Arc::from("V1"), supplier_id: Arc::from("S1") },
    RatingErrorCode::DuplicateEntry,
    "RATEFILL_DUPLICATE_ENTRY",
)]
#[case(RatingError::EmptyDataset, RatingErrorCode::EmptyDataset, "RATEFILL_EMPTY_DATASET")]
#[case(
    RatingError::InvalidRating {
        vendor_id: Arc::from("V1"),
        supplier_id: Arc::from("S1"),
        value: f64::NAN,
    },
    RatingErrorCode::InvalidRating,
    "RATEFILL_INVALID_RATING",
)]
#[case(
    RatingError::InvalidNeighbourCount { got: 0 },
    RatingErrorCode::InvalidNeighbourCount,
    "RATEFILL_INVALID_NEIGHBOUR_COUNT",
)]
#[case(
    RatingError::NeighbourCountExceedsFit { requested: 4, fitted: 3 },
    RatingErrorCode::NeighbourCountExceedsFit,
    "RATEFILL_NEIGHBOUR_COUNT_EXCEEDS_FIT",
)]
#[case(
    RatingError::IndexMismatch { index_rows: 1, matrix_rows: 2 },
    RatingErrorCode::IndexMismatch,
    "RATEFILL_INDEX_MISMATCH",
)]
#[case(
    RatingError::BackendUnavailable { requested: ExecutionStrategy::Parallel },
    RatingErrorCode::BackendUnavailable,
    "RATEFILL_BACKEND_UNAVAILABLE",
)]
#[case(
    RatingError::Distance {
        left: Arc::from("V1"),
        right: Arc::from("V2"),
        error: DistanceError::ZeroLength,
    },
    RatingErrorCode::DistanceFailure,
    "RATEFILL_DISTANCE_FAILURE",
)]
fn returns_expected_rating_code(
    #[case] error: RatingError,
    #[case] expected: RatingErrorCode,
    #[case] raw: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), raw);
    assert_eq!(expected.to_string(), raw);
}

#[rstest]
fn not_found_message_names_the_identifier_space() {
    let err = RatingError::NotFound {
        kind: IdKind::Supplier,
        id: Arc::from("S7"),
    };
    assert_eq!(err.to_string(), "supplier `S7` not found");
}

#[rstest]
fn distance_failure_exposes_source() {
    let err = RatingError::Distance {
        left: Arc::from("V1"),
        right: Arc::from("V2"),
        error: DistanceError::DimensionMismatch { left: 2, right: 3 },
    };
    let source = std::error::Error::source(&err).expect("distance errors carry a source");
    assert_eq!(
        source.to_string(),
        DistanceError::DimensionMismatch { left: 2, right: 3 }.to_string()
    );
}
