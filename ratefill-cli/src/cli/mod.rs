//! Command-line orchestration for the rating imputation pipeline.
//!
//! `predict` loads ratings from a JSON file or the synthetic generator, fits
//! the similarity index and prints predicted ratings per vendor. `generate`
//! writes a synthetic rating set to disk.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, GenerateCommand, GenerationSummary, JsonArgs,
    PredictCommand, PredictionSummary, RatingSource, StrategyArg, SyntheticArgs, render_summary,
    run_cli,
};
