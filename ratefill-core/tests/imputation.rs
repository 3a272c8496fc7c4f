//! End-to-end tests for building, fitting and predicting.

mod common;

use common::{scenario_matrix, scenario_records};
use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use ratefill_core::{
    Cell, ExecutionStrategy, IndexParamsBuilder, PredictionBasis, Predictor, RatingError,
    RatingMatrix, RatingRecord, SelfMatch, SimilarityIndex,
};
use ratefill_test_support::{
    ci::property_test_profile::ProptestRunProfile, tracing::RecordingLayer,
};
use rstest::rstest;
use test_strategy::Arbitrary;
use tracing_subscriber::layer::SubscriberExt;

#[rstest]
fn scenario_predicts_missing_supplier_from_nearest_rater() {
    let matrix = scenario_matrix();
    assert_eq!(matrix.global_mean().expect("ratings exist"), 3.75);
    assert_eq!(matrix.cell("V1", "S2").expect("ids exist"), Cell::Missing);
    assert_eq!(matrix.cell("V3", "S2").expect("ids exist"), Cell::Missing);

    let index = SimilarityIndex::fit(&matrix, 2).expect("fit succeeds");
    let nearest = index.query("V1", 2).expect("vendor exists");
    assert_eq!(nearest.ids().collect::<Vec<_>>(), ["V3", "V2"]);
    assert_eq!(nearest.as_slice()[0].distance, 0.0);
    assert!((nearest.as_slice()[1].distance - 0.375).abs() < 1e-3);

    let predictor = Predictor::new(&matrix, &index).expect("index matches");
    let rows = predictor
        .predict_missing("V1")
        .expect("vendor exists")
        .to_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(&*rows[0].vendor_id, "V1");
    assert_eq!(&*rows[0].supplier_id, "S2");
    assert_eq!(rows[0].predicted_rating, 5.0);
}

#[rstest]
fn predictor_is_shareable_across_threads() {
    let matrix = scenario_matrix();
    let index = SimilarityIndex::fit(&matrix, 2).expect("fit succeeds");
    let predictor = Predictor::new(&matrix, &index).expect("index matches");
    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["V1", "V3"]
            .into_iter()
            .map(|vendor| scope.spawn(move || predictor.predict_missing(vendor)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });
    for result in results {
        assert_eq!(result.expect("vendor exists").get("S2"), Some(5.0));
    }
}

#[rstest]
fn duplicate_records_build_nothing() {
    let mut records = scenario_records();
    records.push(RatingRecord::aggregate("V3", "S1", 1.0));
    assert!(matches!(
        RatingMatrix::build(&records),
        Err(RatingError::DuplicateEntry { .. })
    ));
}

#[rstest]
fn instrumentation_records_pipeline_spans() {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    tracing::subscriber::with_default(subscriber, || {
        let matrix = scenario_matrix();
        let params = IndexParamsBuilder::new()
            .with_neighbours(2)
            .with_execution_strategy(ExecutionStrategy::Sequential)
            .build()
            .expect("params are valid");
        let index = SimilarityIndex::fit_with(&matrix, &params).expect("fit succeeds");
        let predictor = Predictor::new(&matrix, &index).expect("index matches");
        predictor.predict_missing("V1").expect("vendor exists");
    });

    let spans = layer.spans();
    let build = spans
        .iter()
        .find(|span| span.name == "core.matrix.build")
        .expect("core.matrix.build span must exist");
    assert_eq!(build.fields.get("records"), Some(&"4".to_owned()));
    assert_eq!(build.fields.get("vendors"), Some(&"3".to_owned()));
    assert_eq!(build.fields.get("suppliers"), Some(&"2".to_owned()));

    let fit = spans
        .iter()
        .find(|span| span.name == "core.index.fit")
        .expect("core.index.fit span must exist");
    assert_eq!(fit.fields.get("neighbours"), Some(&"2".to_owned()));
    assert_eq!(fit.fields.get("strategy"), Some(&"Sequential".to_owned()));
    assert_eq!(fit.fields.get("parallel"), Some(&"false".to_owned()));

    let predict = spans
        .iter()
        .find(|span| span.name == "core.predict_missing")
        .expect("core.predict_missing span must exist");
    assert_eq!(predict.fields.get("vendor_id"), Some(&"V1".to_owned()));
    assert_eq!(predict.fields.get("missing"), Some(&"1".to_owned()));
    assert_eq!(predict.fields.get("fallbacks"), Some(&"0".to_owned()));
}

#[rstest]
fn failed_prediction_is_recorded_on_the_span() {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let matrix = scenario_matrix();
    let index = SimilarityIndex::fit(&matrix, 2).expect("fit succeeds");
    let predictor = Predictor::new(&matrix, &index).expect("index matches");

    let result = tracing::subscriber::with_default(subscriber, || predictor.predict_missing("V9"));
    assert!(result.is_err());

    let events = layer.events();
    assert!(
        events
            .iter()
            .any(|event| event.level == tracing::Level::ERROR
                && event.fields.get("error").is_some_and(|e| e.contains("V9"))),
        "instrument(err) must emit the failure"
    );
}

#[derive(Clone, Copy, Debug, Arbitrary)]
enum Scheduling {
    Auto,
    Sequential,
    Parallel,
}

impl From<Scheduling> for ExecutionStrategy {
    fn from(value: Scheduling) -> Self {
        match value {
            Scheduling::Auto => Self::Auto,
            Scheduling::Sequential => Self::Sequential,
            Scheduling::Parallel if cfg!(feature = "parallel") => Self::Parallel,
            Scheduling::Parallel => Self::Sequential,
        }
    }
}

fn ratings() -> impl Strategy<Value = Vec<RatingRecord>> {
    proptest::collection::btree_map((0_u8..6, 0_u8..5), 1.0_f64..=5.0, 1..24).prop_map(
        |cells| {
            cells
                .into_iter()
                .map(|((vendor, supplier), rating)| {
                    RatingRecord::aggregate(format!("V{vendor}"), format!("S{supplier}"), rating)
                })
                .collect()
        },
    )
}

fn profile_config() -> ProptestConfig {
    let profile = ProptestRunProfile::load(48, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

proptest! {
    #![proptest_config(profile_config())]

    #[test]
    fn scheduling_never_changes_predictions(
        records in ratings(),
        scheduling in any::<Scheduling>(),
        k in 1_usize..4,
        include_self in any::<bool>(),
    ) {
        let matrix = RatingMatrix::build(&records).expect("generated records are unique");
        let self_match = if include_self { SelfMatch::Include } else { SelfMatch::Exclude };
        let fit = |strategy: ExecutionStrategy| {
            let params = IndexParamsBuilder::new()
                .with_neighbours(k)
                .with_self_match(self_match)
                .with_execution_strategy(strategy)
                .build()
                .expect("params are valid");
            SimilarityIndex::fit_with(&matrix, &params).expect("fit succeeds")
        };
        let baseline = fit(ExecutionStrategy::Sequential);
        let candidate = fit(scheduling.into());
        let expected = Predictor::new(&matrix, &baseline).expect("index matches").predict_all();
        let actual = Predictor::new(&matrix, &candidate).expect("index matches").predict_all();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn fallback_predictions_equal_global_mean(records in ratings(), k in 1_usize..4) {
        let matrix = RatingMatrix::build(&records).expect("generated records are unique");
        let index = SimilarityIndex::fit(&matrix, k).expect("fit succeeds");
        let predictor = Predictor::new(&matrix, &index).expect("index matches");
        let mean = matrix.global_mean().expect("at least one rating");
        for outcome in predictor.predict_all() {
            let result = outcome.result.expect("every vendor exists");
            for prediction in &result {
                if prediction.basis() == &PredictionBasis::GlobalMean {
                    prop_assert_eq!(prediction.rating(), mean);
                }
                prop_assert!(matrix
                    .cell(result.vendor_id(), prediction.supplier_id())
                    .expect("ids exist")
                    .is_missing());
            }
        }
    }
}
