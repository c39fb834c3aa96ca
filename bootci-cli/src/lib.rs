#![warn(missing_docs)]
//! bootci CLI Library
//!
//! Command-line front end for the bootstrap engine. Use `bootci_cli::run()` (or
//! `bootci::run()`) in a main function to get the full `bootci` experience.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     bootci_cli::run()
//! }
//! ```

mod commands;
mod config;
mod data;
mod formatting;
mod metadata;
mod progress;
mod settings;

pub use commands::{ModesComparison, compare_modes, init_config, run_bootstrap, run_simulation};
pub use config::*;
pub use data::{DataError, load_csv_dataset, parse_csv_dataset};
pub use formatting::{format_duration, format_human_output, format_modes_output};
pub use metadata::build_report_meta;
pub use settings::Settings;

use bootci_stats::{Correlation, Mean, RegressionSlope, Statistic};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// bootci CLI arguments
#[derive(Parser, Debug)]
#[command(name = "bootci")]
#[command(
    author,
    version,
    about = "bootci - bootstrap standard errors and confidence intervals"
)]
pub struct Cli {
    /// Optional subcommand (Run, Simulate, Modes, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Arguments for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,

    /// Configuration file (default: discover bootci.toml upwards from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bootstrap a statistic over a CSV dataset (default)
    Run(RunArgs),
    /// Simulate the true sampling distribution from a bivariate normal population
    /// and compare it with the bootstrap of one drawn sample
    Simulate(SimulateArgs),
    /// Run the same bootstrap sequentially and in parallel and compare
    Modes(RunArgs),
    /// Print or write a default bootci.toml
    Init {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Built-in statistics selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatisticKind {
    /// Mean of `--x`
    Mean,
    /// Pearson correlation of `--x` and `--y`
    #[default]
    Correlation,
    /// OLS slope of `--y` on `--x`
    Slope,
}

impl StatisticKind {
    /// Instantiate the statistic over the given columns
    pub fn build(self, x: &str, y: &str) -> Box<dyn Statistic> {
        match self {
            StatisticKind::Mean => Box::new(Mean::new(x)),
            StatisticKind::Correlation => Box::new(Correlation::new(x, y)),
            StatisticKind::Slope => Box::new(RegressionSlope::new(x, y)),
        }
    }

    /// Display label such as `correlation(x, y)`
    pub fn label(self, x: &str, y: &str) -> String {
        match self {
            StatisticKind::Mean => format!("mean({x})"),
            StatisticKind::Correlation => format!("correlation({x}, {y})"),
            StatisticKind::Slope => format!("slope({y} ~ {x})"),
        }
    }
}

/// Bootstrap options shared by all computing commands.
///
/// Every option is optional; unset options fall back to bootci.toml.
#[derive(Args, Debug, Clone, Default)]
pub struct BootstrapOpts {
    /// Bootstrap replicates (B)
    #[arg(short = 'B', long)]
    pub iterations: Option<usize>,

    /// Confidence level, e.g. 0.95
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Master seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads: 0 = all cores, 1 = sequential
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Random streams: per-trial or per-worker
    #[arg(long)]
    pub streams: Option<String>,

    /// Degenerate replicates: fail-fast or exclude
    #[arg(long)]
    pub nan_policy: Option<String>,

    /// Also compute the BCa interval
    #[arg(long)]
    pub bca: bool,

    /// Histogram bins in the report (0 = none)
    #[arg(long)]
    pub bins: Option<usize>,
}

/// Output options
#[derive(Args, Debug, Clone, Default)]
pub struct OutputOpts {
    /// Output format: human, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `run` and `modes`
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// CSV dataset with a header row
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Statistic to bootstrap
    #[arg(short, long, value_enum, default_value_t = StatisticKind::Correlation)]
    pub statistic: StatisticKind,

    /// First (or only) column
    #[arg(long, default_value = "x")]
    pub x: String,

    /// Second column, for correlation and slope
    #[arg(long, default_value = "y")]
    pub y: String,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub boot: BootstrapOpts,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub out: OutputOpts,
}

/// Arguments for `simulate`
#[derive(Args, Debug, Clone, Default)]
pub struct SimulateArgs {
    /// Population correlation
    #[arg(long, allow_negative_numbers = true)]
    pub rho: Option<f64>,

    /// Rows per sample
    #[arg(short = 'n', long)]
    pub sample_size: Option<usize>,

    /// Number of simulated samples
    #[arg(short, long)]
    pub trials: Option<usize>,

    /// Statistic to study
    #[arg(short, long, value_enum, default_value_t = StatisticKind::Correlation)]
    pub statistic: StatisticKind,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub boot: BootstrapOpts,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub out: OutputOpts,
}

/// Run the bootci CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the bootci CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    // Explicit --config must load; a discovered bootci.toml is best-effort
    let config = match &cli.config {
        Some(path) => BootConfig::load(path)?,
        None => BootConfig::discover().unwrap_or_default(),
    };

    match cli.command {
        Some(Commands::Run(ref args)) => run_bootstrap(args, &config),
        Some(Commands::Simulate(ref args)) => run_simulation(args, &config),
        Some(Commands::Modes(ref args)) => compare_modes(args, &config),
        Some(Commands::Init { ref output }) => init_config(output.as_deref()),
        None => run_bootstrap(&cli.run, &config),
    }
}

/// Logs go to stderr so reports on stdout stay machine-readable.
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "bootci=debug" } else { "bootci=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A second init (e.g. repeated run_with_cli calls in one process) is a no-op
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
