//! JSON import and export of rating records and predictions.
//!
//! Records are an array of flat objects:
//!
//! ```json
//! [
//!     {
//!         "vendor_id": "V1",
//!         "supplier_id": "S1",
//!         "rating": 3.9,
//!         "freshness_rating": 4.2,
//!         "customer_support": 3.6
//!     }
//! ]
//! ```
//!
//! Every numeric field besides `rating` is a sub-metric. When `rating` is
//! absent it is derived as the mean of the sub-metrics.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use ratefill_core::{PredictedRating, RatingRecord, SubMetrics};
use serde::{Deserialize, Serialize};
use serde_json::{Serializer, Value, ser::PrettyFormatter};
use tracing::{debug, instrument};

use crate::errors::RecordProviderError;

const INDENT: &[u8] = b"    ";

#[derive(Deserialize)]
struct RecordIn {
    vendor_id: String,
    supplier_id: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct RecordOut<'a> {
    vendor_id: &'a str,
    supplier_id: &'a str,
    rating: f64,
    #[serde(flatten)]
    sub_metrics: &'a SubMetrics,
}

#[derive(Serialize)]
struct PredictionOut<'a> {
    vendor_id: &'a str,
    supplier_id: &'a str,
    predicted_rating: f64,
}

/// Reads rating records from a JSON file.
///
/// # Errors
/// Returns [`RecordProviderError::Io`] when the file cannot be opened,
/// [`RecordProviderError::Json`] when it is not a valid record array and
/// [`RecordProviderError::MissingRating`] when a record carries neither a
/// rating nor numeric sub-metrics.
#[instrument(name = "records.load", err, skip(path), fields(path = %path.as_ref().display()))]
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<RatingRecord>, RecordProviderError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| RecordProviderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(BufReader::new(file))?;
    debug!(records = records.len(), "rating records loaded");
    Ok(records)
}

/// Reads rating records from any JSON reader.
///
/// # Errors
/// See [`load_records`].
///
/// # Examples
/// ```
/// use ratefill_providers_records::read_records;
///
/// let json = r#"[
///     {"vendor_id": "V1", "supplier_id": "S1", "rating": 4.5},
///     {"vendor_id": "V2", "supplier_id": "S1", "on_time_delivery": 3.0, "value_for_money": 4.0}
/// ]"#;
/// let records = read_records(json.as_bytes())?;
/// assert_eq!(records[0].aggregate_rating(), 4.5);
/// assert_eq!(records[1].aggregate_rating(), 3.5);
/// assert_eq!(records[1].sub_metrics().len(), 2);
/// # Ok::<(), ratefill_providers_records::RecordProviderError>(())
/// ```
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RatingRecord>, RecordProviderError> {
    let raw: Vec<RecordIn> = serde_json::from_reader(reader)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, record)| into_record(index, record))
        .collect()
}

fn into_record(index: usize, record: RecordIn) -> Result<RatingRecord, RecordProviderError> {
    let RecordIn {
        vendor_id,
        supplier_id,
        rating,
        extra,
    } = record;
    let sub_metrics: SubMetrics = extra
        .into_iter()
        .filter_map(|(name, value)| value.as_f64().map(|number| (name, number)))
        .collect();
    if let Some((name, _)) = sub_metrics.iter().find(|(_, value)| !value.is_finite()) {
        return Err(RecordProviderError::NonFinite {
            index,
            field: name.clone(),
        });
    }

    let record = match rating {
        Some(rating) => RatingRecord::new(vendor_id, supplier_id, rating, sub_metrics),
        None => {
            let derived = RatingRecord::from_sub_metrics(
                vendor_id.as_str(),
                supplier_id.as_str(),
                sub_metrics,
            );
            derived.ok_or(RecordProviderError::MissingRating {
                index,
                vendor_id,
                supplier_id,
            })?
        }
    };
    if !record.aggregate_rating().is_finite() {
        return Err(RecordProviderError::NonFinite {
            index,
            field: "rating".to_owned(),
        });
    }
    Ok(record)
}

/// Writes rating records as a four-space indented JSON array.
///
/// # Errors
/// Returns [`RecordProviderError::Json`] when serialisation or the underlying
/// writer fails.
pub fn write_records<W: Write>(
    writer: W,
    records: &[RatingRecord],
) -> Result<(), RecordProviderError> {
    let rows: Vec<RecordOut<'_>> = records
        .iter()
        .map(|record| RecordOut {
            vendor_id: record.vendor_id(),
            supplier_id: record.supplier_id(),
            rating: record.aggregate_rating(),
            sub_metrics: record.sub_metrics(),
        })
        .collect();
    write_pretty(writer, &rows)
}

/// Writes predictions as `[{vendor_id, supplier_id, predicted_rating}]`.
///
/// # Errors
/// Returns [`RecordProviderError::Json`] when serialisation or the underlying
/// writer fails.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use ratefill_core::PredictedRating;
/// use ratefill_providers_records::write_predictions;
///
/// let mut out = Vec::new();
/// write_predictions(&mut out, &[PredictedRating {
///     vendor_id: Arc::from("V1"),
///     supplier_id: Arc::from("S2"),
///     predicted_rating: 5.0,
/// }])?;
/// let text = String::from_utf8(out).expect("JSON is UTF-8");
/// assert!(text.contains("\n        \"predicted_rating\": 5.0"));
/// # Ok::<(), ratefill_providers_records::RecordProviderError>(())
/// ```
pub fn write_predictions<W: Write>(
    writer: W,
    predictions: &[PredictedRating],
) -> Result<(), RecordProviderError> {
    let rows: Vec<PredictionOut<'_>> = predictions
        .iter()
        .map(|row| PredictionOut {
            vendor_id: &row.vendor_id,
            supplier_id: &row.supplier_id,
            predicted_rating: row.predicted_rating,
        })
        .collect();
    write_pretty(writer, &rows)
}

/// Writes rating records to `path`, replacing any existing file.
///
/// # Errors
/// Returns [`RecordProviderError::Io`] when the file cannot be created or
/// flushed and [`RecordProviderError::Json`] when serialisation fails.
#[instrument(
    name = "records.save",
    err,
    skip(path, records),
    fields(path = %path.as_ref().display(), records = records.len()),
)]
pub fn save_records(
    path: impl AsRef<Path>,
    records: &[RatingRecord],
) -> Result<(), RecordProviderError> {
    write_file(path.as_ref(), |writer| write_records(writer, records))
}

/// Writes predictions to `path`, replacing any existing file.
///
/// # Errors
/// Returns [`RecordProviderError::Io`] when the file cannot be created or
/// flushed and [`RecordProviderError::Json`] when serialisation fails.
#[instrument(
    name = "records.save_predictions",
    err,
    skip(path, predictions),
    fields(path = %path.as_ref().display(), rows = predictions.len()),
)]
pub fn save_predictions(
    path: impl AsRef<Path>,
    predictions: &[PredictedRating],
) -> Result<(), RecordProviderError> {
    write_file(path.as_ref(), |writer| {
        write_predictions(writer, predictions)
    })
}

fn write_file<F>(path: &Path, write: F) -> Result<(), RecordProviderError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), RecordProviderError>,
{
    let io_error = |source| RecordProviderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush().map_err(io_error)
}

fn write_pretty<W: Write, T: Serialize>(writer: W, value: &T) -> Result<(), RecordProviderError> {
    let mut serializer = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    Ok(())
}
