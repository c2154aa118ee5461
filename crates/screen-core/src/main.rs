mod config;
mod pipeline;
pub mod results;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mofdata::{MofColumnSet, RunMode};

use config::load_config;
use pipeline::{PrepareArgs, RegistryArgs, ScoreArgs, StatsArgs};

/// mof-screen: dataset preparation, scoring, and evaluation for MOF
/// property-prediction experiments.
#[derive(Parser)]
#[command(name = "mof-screen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands for preparation, scoring, registry inspection, and stats.
#[derive(Subcommand)]
enum Command {
    /// Validate and filter a property CSV against the MOF vocabulary.
    Prepare {
        /// Reference (generator) CSV defining the MOF vocabulary.
        #[arg(long)]
        reference: PathBuf,
        /// Property CSV to validate and filter.
        #[arg(long)]
        input: PathBuf,
        /// Path for the cleaned output CSV.
        #[arg(long)]
        output: PathBuf,
        /// Path for the JSON removal-count report.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Target property columns that must be present.
        #[arg(long, required = true, value_delimiter = ',')]
        targets: Vec<String>,
        /// Run mode: "real" or "test" (test subsamples the data).
        #[arg(long, default_value = "real")]
        mode: String,
        /// Keep rows with duplicate SMILES in the reference set.
        #[arg(long)]
        keep_duplicates: bool,
        /// Attach synthesizability scores restored from this weights file.
        #[arg(long)]
        scscore_weights: Option<PathBuf>,
        /// Optional TOML config (filter bounds, column schema).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Score a CSV's SMILES column in parallel and write the augmented table.
    Score {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Scorer weights JSON file.
        #[arg(long)]
        weights: PathBuf,
        /// Worker thread count (default: available parallelism).
        #[arg(long)]
        workers: Option<usize>,
        /// Partitions per worker (default: the worker count).
        #[arg(long)]
        partition_multiplier: Option<usize>,
        /// Optional TOML config (column schema).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Build the identity registry from a reference CSV and print it.
    Registry {
        #[arg(long)]
        reference: PathBuf,
        /// Which columns to report: "id", "cats", or "all".
        #[arg(long, default_value = "all")]
        columns: String,
        /// Run mode: "real" or "test".
        #[arg(long, default_value = "real")]
        mode: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Compute R²/MAE/RMSE from a predictions CSV with *_true/*_pred columns.
    Stats {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, required = true, value_delimiter = ',')]
        targets: Vec<String>,
        /// Prefix for metric column names (e.g. "test_").
        #[arg(long, default_value = "")]
        prefix: String,
        /// Optional CSV output path for the diagnostics table.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Prepare {
            reference,
            input,
            output,
            report,
            targets,
            mode,
            keep_duplicates,
            scscore_weights,
            config,
        } => pipeline::run_prepare(PrepareArgs {
            reference,
            input,
            output,
            report,
            targets,
            mode: mode.parse::<RunMode>()?,
            keep_duplicates,
            scscore_weights,
            config: load_config(config.as_deref())?,
        }),
        Command::Score {
            input,
            output,
            weights,
            workers,
            partition_multiplier,
            config,
        } => pipeline::run_score(ScoreArgs {
            input,
            output,
            weights,
            workers,
            partition_multiplier,
            config: load_config(config.as_deref())?,
        }),
        Command::Registry {
            reference,
            columns,
            mode,
            config,
        } => pipeline::run_registry(RegistryArgs {
            reference,
            columns: columns.parse::<MofColumnSet>()?,
            mode: mode.parse::<RunMode>()?,
            config: load_config(config.as_deref())?,
        }),
        Command::Stats {
            input,
            targets,
            prefix,
            output,
        } => pipeline::run_stats(StatsArgs {
            input,
            targets,
            prefix,
            output,
        }),
    }
}
