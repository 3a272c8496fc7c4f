//! File round trips for the JSON record provider.

use std::{fs, sync::Arc};

use ratefill_core::{PredictedRating, RatingMatrix, RatingRecord, SubMetrics};
use ratefill_providers_records::{
    RecordProviderError, SyntheticRatingsConfig, generate_ratings, load_records, read_records,
    save_predictions, save_records,
};
use rstest::rstest;
use serde_json::Value;
use tempfile::TempDir;

#[rstest]
fn saved_records_load_back_unchanged() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("ratings.json");
    let records = generate_ratings(&SyntheticRatingsConfig::default()).expect("config is valid");

    save_records(&path, &records).expect("records are written");
    let loaded = load_records(&path).expect("records are read");

    assert_eq!(loaded.len(), records.len());
    for (left, right) in loaded.iter().zip(&records) {
        assert_eq!(left.vendor_id(), right.vendor_id());
        assert_eq!(left.supplier_id(), right.supplier_id());
        assert!((left.aggregate_rating() - right.aggregate_rating()).abs() < 1e-12);
        assert_eq!(left.sub_metrics().len(), right.sub_metrics().len());
        for ((name, value), (other_name, other_value)) in
            left.sub_metrics().iter().zip(right.sub_metrics())
        {
            assert_eq!(name, other_name);
            assert!((value - other_value).abs() < 1e-12);
        }
    }
}

#[rstest]
fn records_are_written_as_flat_objects_with_four_space_indent() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("ratings.json");
    let metrics = SubMetrics::from([("customer_support".to_owned(), 3.0)]);
    save_records(&path, &[RatingRecord::new("V1", "S1", 3.0, metrics)]).expect("written");

    let text = fs::read_to_string(&path).expect("file exists");
    assert!(text.contains("\n    {\n        \"vendor_id\": \"V1\""));
    let value: Value = serde_json::from_str(&text).expect("valid JSON");
    let object = &value[0];
    assert_eq!(object["supplier_id"], "S1");
    assert_eq!(object["rating"], 3.0);
    assert_eq!(object["customer_support"], 3.0);
}

#[rstest]
fn predictions_are_written_as_triples() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("predictions.json");
    let rows = [
        PredictedRating {
            vendor_id: Arc::from("V1"),
            supplier_id: Arc::from("S2"),
            predicted_rating: 5.0,
        },
        PredictedRating {
            vendor_id: Arc::from("V1"),
            supplier_id: Arc::from("S4"),
            predicted_rating: 3.75,
        },
    ];
    save_predictions(&path, &rows).expect("written");

    let value: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("file exists")).expect("valid JSON");
    assert_eq!(
        value,
        serde_json::json!([
            {"vendor_id": "V1", "supplier_id": "S2", "predicted_rating": 5.0},
            {"vendor_id": "V1", "supplier_id": "S4", "predicted_rating": 3.75},
        ])
    );
}

#[rstest]
fn missing_rating_is_derived_and_non_numeric_fields_are_ignored() {
    let json = r#"[
        {"vendor_id": "V1", "supplier_id": "S1", "freshness_rating": 4.0, "customer_support": 2, "note": "late"}
    ]"#;
    let records = read_records(json.as_bytes()).expect("valid records");
    assert_eq!(records[0].aggregate_rating(), 3.0);
    assert_eq!(records[0].sub_metrics().len(), 2);
}

#[rstest]
fn record_without_rating_or_metrics_is_rejected() {
    let json = r#"[
        {"vendor_id": "V1", "supplier_id": "S1", "rating": 4.0},
        {"vendor_id": "V2", "supplier_id": "S3"}
    ]"#;
    let err = read_records(json.as_bytes()).expect_err("second record lacks a rating");
    assert!(matches!(
        err,
        RecordProviderError::MissingRating { index: 1, ref vendor_id, .. } if vendor_id == "V2"
    ));
}

#[rstest]
#[case::not_an_array(r#"{"vendor_id": "V1"}"#)]
#[case::missing_supplier(r#"[{"vendor_id": "V1", "rating": 3.0}]"#)]
#[case::truncated("[")]
fn malformed_json_is_rejected(#[case] json: &str) {
    let err = read_records(json.as_bytes()).expect_err("malformed input");
    assert!(matches!(err, RecordProviderError::Json(_)));
}

#[rstest]
fn missing_file_reports_path() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.json");
    let err = load_records(&path).expect_err("file does not exist");
    assert!(matches!(err, RecordProviderError::Io { path: ref reported, .. } if *reported == path));
}

#[rstest]
fn default_synthetic_set_builds_a_sparse_matrix() {
    let records = generate_ratings(&SyntheticRatingsConfig::default()).expect("config is valid");
    let matrix = RatingMatrix::build(&records).expect("generated pairs are unique");
    assert!(matrix.vendor_count() <= 10);
    assert!(matrix.supplier_count() <= 5);
    assert_eq!(matrix.rated_count(), records.len());
    assert!(matrix.global_mean().is_ok());
}
