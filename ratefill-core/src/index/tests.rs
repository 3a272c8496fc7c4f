//! Unit tests for fitting and querying the similarity index.

use super::*;
use crate::{RatingErrorCode, record::RatingRecord, test_utils::suite_proptest_config};
use proptest::prelude::*;
use rstest::{fixture, rstest};

#[fixture]
fn matrix() -> RatingMatrix {
    RatingMatrix::build(&[
        RatingRecord::aggregate("V1", "S1", 4.0),
        RatingRecord::aggregate("V2", "S1", 4.0),
        RatingRecord::aggregate("V2", "S2", 5.0),
        RatingRecord::aggregate("V3", "S1", 2.0),
    ])
    .expect("records are valid")
}

fn ids(neighbours: &[Neighbour]) -> Vec<&str> {
    neighbours.iter().map(|n| &*n.vendor_id).collect()
}

#[rstest]
fn neighbours_ascend_by_distance(matrix: RatingMatrix) {
    let index = SimilarityIndex::fit(&matrix, 2).expect("fit succeeds");
    let v1 = index.neighbours("V1").expect("vendor exists");
    assert_eq!(ids(v1), ["V3", "V2"]);
    assert_eq!(v1[0].distance, 0.0);
    let expected = 1.0 - 16.0 / (4.0 * 41.0_f64.sqrt());
    assert!((v1[1].distance - expected).abs() < 1e-12);
    assert!((v1[1].distance - 0.375).abs() < 1e-3);
}

#[rstest]
fn self_is_excluded_by_default(matrix: RatingMatrix) {
    let index = SimilarityIndex::fit(&matrix, 3).expect("fit succeeds");
    for vendor in ["V1", "V2", "V3"] {
        let set = index.neighbours(vendor).expect("vendor exists");
        assert_eq!(set.len(), 2, "k is clamped to the other vendors");
        assert!(set.iter().all(|n| &*n.vendor_id != vendor));
    }
}

#[rstest]
fn self_match_include_lets_vendor_compete(matrix: RatingMatrix) {
    let params = IndexParamsBuilder::new()
        .with_neighbours(2)
        .with_self_match(SelfMatch::Include)
        .build()
        .expect("params are valid");
    let index = SimilarityIndex::fit_with(&matrix, &params).expect("fit succeeds");
    let v2 = index.neighbours("V2").expect("vendor exists");
    assert_eq!(&*v2[0].vendor_id, "V2");
    assert!(v2[0].distance.abs() < 1e-12);
}

#[rstest]
fn ties_break_by_row_order() {
    let matrix = RatingMatrix::build(&[
        RatingRecord::aggregate("A", "S1", 1.0),
        RatingRecord::aggregate("C", "S1", 3.0),
        RatingRecord::aggregate("B", "S1", 2.0),
    ])
    .expect("records are valid");
    let index = SimilarityIndex::fit(&matrix, 2).expect("fit succeeds");
    assert_eq!(ids(index.neighbours("C").expect("vendor exists")), ["A", "B"]);
    assert_eq!(ids(index.neighbours("A").expect("vendor exists")), ["B", "C"]);
}

#[rstest]
fn zero_vector_sits_at_unit_distance() {
    let matrix = RatingMatrix::build(&[
        RatingRecord::aggregate("V1", "S1", 4.0),
        RatingRecord::aggregate("V2", "S1", 0.0),
    ])
    .expect("records are valid");
    let index = SimilarityIndex::fit(&matrix, 1).expect("fit succeeds");
    let v1 = index.neighbours("V1").expect("vendor exists");
    assert_eq!(v1[0].distance, 1.0);
}

#[rstest]
#[case(1, &["V3"][..])]
#[case(2, &["V3", "V2"][..])]
fn query_returns_prefix(matrix: RatingMatrix, #[case] k: usize, #[case] expected: &[&str]) {
    let index = SimilarityIndex::fit(&matrix, 2).expect("fit succeeds");
    let set = index.query("V1", k).expect("query succeeds");
    assert_eq!(set.ids().collect::<Vec<_>>(), expected);
    assert_eq!(set.vendor_id(), "V1");
}

#[rstest]
#[case::zero(0, RatingErrorCode::InvalidNeighbourCount)]
#[case::above_fit(3, RatingErrorCode::NeighbourCountExceedsFit)]
fn query_rejects_bad_k(matrix: RatingMatrix, #[case] k: usize, #[case] code: RatingErrorCode) {
    let index = SimilarityIndex::fit(&matrix, 2).expect("fit succeeds");
    let err = index.query("V1", k).expect_err("query must fail");
    assert_eq!(err.code(), code);
}

#[rstest]
fn unknown_vendor_is_not_found(matrix: RatingMatrix) {
    let index = SimilarityIndex::fit(&matrix, 2).expect("fit succeeds");
    let err = index.query("V9", 1).expect_err("unknown vendor");
    assert_eq!(err, RatingError::vendor_not_found("V9"));
    assert!(index.neighbours("V9").is_err());
}

#[rstest]
fn zero_neighbours_rejected_at_fit(matrix: RatingMatrix) {
    let err = SimilarityIndex::fit(&matrix, 0).expect_err("k must be positive");
    assert_eq!(err, RatingError::InvalidNeighbourCount { got: 0 });
}

#[rstest]
fn single_vendor_has_no_neighbours() {
    let matrix = RatingMatrix::build(&[RatingRecord::aggregate("V1", "S1", 3.0)])
        .expect("records are valid");
    let index = SimilarityIndex::fit(&matrix, 3).expect("fit succeeds");
    assert!(index.query("V1", 3).expect("query succeeds").is_empty());
    assert_eq!(index.len(), 1);
    assert_eq!(index.dimension(), 1);
}

#[rstest]
fn empty_matrix_fits_empty_index() {
    let matrix = RatingMatrix::build(&[]).expect("empty input builds");
    let index = SimilarityIndex::fit(&matrix, 3).expect("fit succeeds");
    assert!(index.is_empty());
}

#[cfg(not(feature = "parallel"))]
#[rstest]
fn parallel_without_feature_is_unavailable() {
    let err = IndexParamsBuilder::new()
        .with_execution_strategy(ExecutionStrategy::Parallel)
        .build()
        .expect_err("parallel requires the feature");
    assert_eq!(err.code(), RatingErrorCode::BackendUnavailable);
}

fn sparse_records() -> impl Strategy<Value = Vec<RatingRecord>> {
    (2_usize..8, 1_usize..6).prop_flat_map(|(vendors, suppliers)| {
        proptest::collection::vec(
            proptest::option::weighted(0.6, -5.0_f64..5.0),
            vendors * suppliers,
        )
        .prop_map(move |cells| {
            cells
                .into_iter()
                .enumerate()
                .filter_map(|(slot, value)| {
                    value.map(|rating| {
                        RatingRecord::aggregate(
                            format!("V{}", slot / suppliers),
                            format!("S{}", slot % suppliers),
                            rating,
                        )
                    })
                })
                .collect()
        })
    })
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn distances_stay_in_range_and_sorted(records in sparse_records(), k in 1_usize..6) {
        let matrix = RatingMatrix::build(&records).expect("generated records are unique");
        let index = SimilarityIndex::fit(&matrix, k).expect("fit succeeds");
        for vendor in matrix.vendors() {
            let set = index.neighbours(vendor).expect("vendor exists");
            prop_assert!(set.len() <= k);
            prop_assert!(set.len() <= matrix.vendor_count().saturating_sub(1));
            prop_assert!(set.iter().all(|n| (0.0..=2.0).contains(&n.distance)));
            prop_assert!(set.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn sequential_and_parallel_fits_agree(records in sparse_records(), k in 1_usize..6) {
        let matrix = RatingMatrix::build(&records).expect("generated records are unique");
        let fit = |strategy| {
            let params = IndexParamsBuilder::new()
                .with_neighbours(k)
                .with_execution_strategy(strategy)
                .build()
                .expect("params are valid");
            SimilarityIndex::fit_with(&matrix, &params).expect("fit succeeds")
        };
        let sequential = fit(ExecutionStrategy::Sequential);
        let parallel = fit(ExecutionStrategy::Parallel);
        for vendor in matrix.vendors() {
            let left = sequential.neighbours(vendor).expect("vendor exists");
            let right = parallel.neighbours(vendor).expect("vendor exists");
            prop_assert_eq!(ids(left), ids(right));
            prop_assert!(left.iter().zip(right).all(|(a, b)| a.distance.to_bits() == b.distance.to_bits()));
        }
    }
}
