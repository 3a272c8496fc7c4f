//! Command implementations and argument parsing for the `ratefill` binary.

use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ratefill_core::{
    DEFAULT_NEIGHBOURS, ExecutionStrategy, IndexParamsBuilder, PredictionResult, Predictor,
    RatingError, RatingMatrix, RatingRecord, SelfMatch, SimilarityIndex, VendorPredictions,
};
use ratefill_providers_records::{
    RecordProviderError, SyntheticError, SyntheticRatingsConfig, generate_ratings, load_records,
    save_predictions, save_records,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "ratefill", about = "Predict missing vendor ratings of suppliers.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Predict the ratings vendors have not given yet.
    Predict(PredictCommand),
    /// Write a synthetic rating set to a JSON file.
    Generate(GenerateCommand),
}

/// Options accepted by the `predict` command.
#[derive(Debug, Args, Clone)]
pub struct PredictCommand {
    /// Vendor to predict for; repeat to select several. Defaults to every vendor.
    #[arg(long = "vendor", value_name = "ID")]
    pub vendors: Vec<String>,

    /// Number of nearest vendors consulted per prediction.
    #[arg(long, default_value_t = DEFAULT_NEIGHBOURS)]
    pub neighbours: usize,

    /// Let a vendor occupy one of its own neighbour slots.
    #[arg(long)]
    pub include_self: bool,

    /// Scheduling of the pairwise distance pass.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Write the loaded ratings to this JSON file.
    #[arg(long, value_name = "PATH")]
    pub ratings_out: Option<PathBuf>,

    /// Write every predicted rating to this JSON file.
    #[arg(long, value_name = "PATH")]
    pub predictions_out: Option<PathBuf>,

    /// Where the ratings come from.
    #[command(subcommand)]
    pub source: RatingSource,
}

/// Rating sources accepted by `predict`.
#[derive(Debug, Subcommand, Clone)]
pub enum RatingSource {
    /// Read ratings from a JSON array of records.
    Json(JsonArgs),
    /// Generate ratings with the seeded synthetic generator.
    Synthetic(SyntheticArgs),
}

/// JSON ingestion arguments.
#[derive(Debug, Args, Clone)]
pub struct JsonArgs {
    /// Path to the JSON rating file.
    pub path: PathBuf,
}

/// Synthetic generator arguments.
#[derive(Debug, Args, Clone)]
pub struct SyntheticArgs {
    /// Number of vendors to simulate.
    #[arg(long, default_value_t = 10)]
    pub vendor_count: usize,

    /// Number of suppliers to simulate.
    #[arg(long, default_value_t = 5)]
    pub supplier_count: usize,

    /// Probability that a vendor/supplier pair stays unrated.
    #[arg(long, default_value_t = 0.4)]
    pub sparsity: f64,

    /// Seed for the random number generator.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<&SyntheticArgs> for SyntheticRatingsConfig {
    fn from(args: &SyntheticArgs) -> Self {
        Self {
            vendor_count: args.vendor_count,
            supplier_count: args.supplier_count,
            sparsity: args.sparsity,
            seed: args.seed,
        }
    }
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Destination JSON file.
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Shape and seed of the generated set.
    #[command(flatten)]
    pub synthetic: SyntheticArgs,
}

/// Command-line spelling of [`ExecutionStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Parallel when the build supports it.
    Auto,
    /// Single thread.
    Sequential,
    /// Rayon thread pool.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a JSON file failed.
    #[error(transparent)]
    Records(#[from] RecordProviderError),
    /// The synthetic generator rejected its configuration.
    #[error(transparent)]
    Synthetic(#[from] SyntheticError),
    /// Matrix construction, fitting or prediction failed.
    #[error(transparent)]
    Core(#[from] RatingError),
}

/// Outcome of a `predict` run.
#[derive(Debug, Clone)]
pub struct PredictionSummary {
    /// Where the ratings came from.
    pub source: String,
    /// Vendors in the matrix.
    pub vendors: usize,
    /// Suppliers in the matrix.
    pub suppliers: usize,
    /// Observed ratings.
    pub ratings: usize,
    /// Mean of every observed rating.
    pub global_mean: f64,
    /// Neighbour count the index was fitted with.
    pub neighbours: usize,
    /// Predictions or failure per requested vendor, in request order.
    pub results: Vec<VendorPredictions>,
}

impl PredictionSummary {
    /// Vendors whose prediction failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|entry| entry.result.is_err()).count()
    }
}

/// Outcome of a `generate` run.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    /// File the ratings were written to.
    pub path: PathBuf,
    /// Ratings written.
    pub ratings: usize,
    /// Distinct vendors among the ratings.
    pub vendors: usize,
    /// Distinct suppliers among the ratings.
    pub suppliers: usize,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Result of `predict`.
    Predict(PredictionSummary),
    /// Result of `generate`.
    Generate(GenerationSummary),
}

/// Executes the CLI command represented by `cli`.
///
/// Vendors that cannot be predicted are reported in the summary and do not
/// fail the command.
///
/// # Errors
/// Returns [`CliError`] when loading, writing, matrix construction or index
/// fitting fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use ratefill_cli::cli::{
/// #     Cli, Command, ExecutionSummary, PredictCommand, RatingSource, StrategyArg,
/// #     SyntheticArgs, run_cli,
/// # };
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let cli = Cli {
///     command: Command::Predict(PredictCommand {
///         vendors: vec!["V1".into()],
///         neighbours: 3,
///         include_self: false,
///         strategy: StrategyArg::Sequential,
///         ratings_out: None,
///         predictions_out: None,
///         source: RatingSource::Synthetic(SyntheticArgs {
///             vendor_count: 10,
///             supplier_count: 5,
///             sparsity: 0.4,
///             seed: 42,
///         }),
///     }),
/// };
/// let ExecutionSummary::Predict(summary) = run_cli(cli)? else {
///     panic!("predict yields a prediction summary");
/// };
/// assert_eq!(summary.results.len(), 1);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Predict(predict) => {
            Span::current().record("command", field::display("predict"));
            run_predict(predict).map(ExecutionSummary::Predict)
        }
        Command::Generate(generate) => {
            Span::current().record("command", field::display("generate"));
            run_generate(&generate).map(ExecutionSummary::Generate)
        }
    }
}

#[instrument(
    name = "cli.predict",
    err,
    skip(command),
    fields(
        source = field::Empty,
        neighbours = command.neighbours,
        strategy = ?command.strategy,
        failures = field::Empty,
    ),
)]
pub(super) fn run_predict(command: PredictCommand) -> Result<PredictionSummary, CliError> {
    let PredictCommand {
        vendors,
        neighbours,
        include_self,
        strategy,
        ratings_out,
        predictions_out,
        source,
    } = command;

    let params = IndexParamsBuilder::new()
        .with_neighbours(neighbours)
        .with_self_match(if include_self {
            SelfMatch::Include
        } else {
            SelfMatch::Exclude
        })
        .with_execution_strategy(strategy.into())
        .build()?;

    let (label, records) = load_source(&source)?;
    let span = Span::current();
    span.record("source", field::display(&label));
    if let Some(path) = &ratings_out {
        save_records(path, &records)?;
    }

    let matrix = RatingMatrix::build(&records)?;
    let global_mean = matrix.global_mean()?;
    let index = SimilarityIndex::fit_with(&matrix, &params)?;
    let predictor = Predictor::new(&matrix, &index)?;

    let results = if vendors.is_empty() {
        predictor.predict_all()
    } else {
        predict_listed(&predictor, &vendors)
    };

    if let Some(path) = &predictions_out {
        let rows: Vec<_> = results
            .iter()
            .filter_map(|entry| entry.result.as_ref().ok())
            .flat_map(PredictionResult::to_rows)
            .collect();
        save_predictions(path, &rows)?;
    }

    let summary = PredictionSummary {
        source: label,
        vendors: matrix.vendor_count(),
        suppliers: matrix.supplier_count(),
        ratings: matrix.rated_count(),
        global_mean,
        neighbours: params.neighbours().get(),
        results,
    };
    span.record("failures", summary.failures());
    info!(
        vendors = summary.results.len(),
        failures = summary.failures(),
        "prediction completed"
    );
    Ok(summary)
}

fn predict_listed(predictor: &Predictor<'_>, vendors: &[String]) -> Vec<VendorPredictions> {
    let results: Vec<VendorPredictions> = vendors
        .iter()
        .map(|vendor_id| VendorPredictions {
            vendor_id: Arc::from(vendor_id.as_str()),
            result: predictor.predict_missing(vendor_id),
        })
        .collect();
    let failures = results.iter().filter(|entry| entry.result.is_err()).count();
    if failures > 0 {
        warn!(failures, "some vendors could not be predicted");
    }
    results
}

fn load_source(source: &RatingSource) -> Result<(String, Vec<RatingRecord>), CliError> {
    match source {
        RatingSource::Json(args) => {
            let records = load_records(&args.path)?;
            Ok((args.path.display().to_string(), records))
        }
        RatingSource::Synthetic(args) => {
            let records = generate_ratings(&SyntheticRatingsConfig::from(args))?;
            Ok(("synthetic".to_owned(), records))
        }
    }
}

#[instrument(
    name = "cli.generate",
    err,
    skip(command),
    fields(path = %command.out.display(), seed = command.synthetic.seed),
)]
pub(super) fn run_generate(command: &GenerateCommand) -> Result<GenerationSummary, CliError> {
    let records = generate_ratings(&SyntheticRatingsConfig::from(&command.synthetic))?;
    save_records(&command.out, &records)?;

    let vendors: BTreeSet<&str> = records.iter().map(RatingRecord::vendor_id).collect();
    let suppliers: BTreeSet<&str> = records.iter().map(RatingRecord::supplier_id).collect();
    info!(ratings = records.len(), "synthetic ratings written");
    Ok(GenerationSummary {
        path: command.out.clone(),
        ratings: records.len(),
        vendors: vendors.len(),
        suppliers: suppliers.len(),
    })
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::path::PathBuf;
/// # use ratefill_cli::cli::{ExecutionSummary, GenerationSummary, render_summary};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary::Generate(GenerationSummary {
///     path: PathBuf::from("ratings.json"),
///     ratings: 31,
///     vendors: 10,
///     suppliers: 5,
/// });
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "wrote 31 ratings to ratings.json\nvendors: 10\nsuppliers: 5\n"
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Predict(predict) => render_predictions(predict, &mut writer),
        ExecutionSummary::Generate(generate) => {
            writeln!(
                writer,
                "wrote {} ratings to {}",
                generate.ratings,
                generate.path.display()
            )?;
            writeln!(writer, "vendors: {}", generate.vendors)?;
            writeln!(writer, "suppliers: {}", generate.suppliers)
        }
    }
}

fn render_predictions(summary: &PredictionSummary, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "source: {}", summary.source)?;
    writeln!(writer, "vendors: {}", summary.vendors)?;
    writeln!(writer, "suppliers: {}", summary.suppliers)?;
    writeln!(writer, "ratings: {}", summary.ratings)?;
    writeln!(writer, "global mean: {:.4}", summary.global_mean)?;
    writeln!(writer, "neighbours: {}", summary.neighbours)?;
    for entry in &summary.results {
        match &entry.result {
            Ok(result) => {
                writeln!(
                    writer,
                    "vendor {}: {} predicted ({} from global mean)",
                    entry.vendor_id,
                    result.len(),
                    result.fallback_count()
                )?;
                for prediction in result {
                    writeln!(
                        writer,
                        "  {}\t{:.4}",
                        prediction.supplier_id(),
                        prediction.rating()
                    )?;
                }
            }
            Err(err) => writeln!(writer, "vendor {}: failed: {err}", entry.vendor_id)?,
        }
    }
    Ok(())
}
