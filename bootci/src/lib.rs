#![warn(missing_docs)]
//! # bootci
//!
//! Nonparametric bootstrap for standard errors and confidence intervals.
//!
//! A statistic is evaluated on B resamples (drawn with replacement) of a
//! tabular dataset. The replicates give a standard error, a normal-approximation
//! interval, a percentile interval and optionally a BCa interval. Trials run
//! sequentially or on a fixed pool of worker threads, each with its own
//! independent random stream, so a run is reproducible from its seed alone.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bootci::prelude::*;
//!
//! let data = Dataset::paired(x, y)?;
//! let config = BootstrapConfig {
//!     iterations: 2000,
//!     mode: ExecutionMode::Parallel { workers: 4 },
//!     ..Default::default()
//! };
//! let result = compute_bootstrap(&data, &Correlation::new("x", "y"), &config)?;
//! println!("SE = {:.4}, 95% CI = {:?}", result.standard_error, result.percentile_ci);
//! ```
//!
//! ## Custom Statistics
//!
//! Any `Fn(&Resample) -> Result<f64, StatisticError>` closure is a statistic,
//! as is any type implementing [`Statistic`].

// Re-export the engine
pub use bootci_stats::{
    Aggregate, BivariateNormal, BootstrapConfig, BootstrapError, BootstrapResult,
    ConfidenceInterval, Correlation, Dataset, DatasetError, ExecutionMode, Mean, NanPolicy,
    Population, RegressionSlope, ReplicateSet, Resample, Statistic, StatisticError,
    StreamDerivation, TrialPlan, aggregate, compute_bootstrap, point_estimate, run_bootstrap,
    simulate_sampling_distribution,
};

// Re-export reports
pub use bootci_report::{
    OutputFormat, Report, generate_csv_report, generate_json_report, parse_json_report,
};

/// Lower-level building blocks: quantiles, normal distribution, resampling
pub mod stats {
    pub use bootci_stats::*;
}

/// Report model and renderers
pub mod report {
    pub use bootci_report::*;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BootstrapConfig, BootstrapError, Correlation, Dataset, ExecutionMode, Mean, NanPolicy,
        RegressionSlope, Statistic, StreamDerivation, compute_bootstrap,
    };
}

/// Run the bootci CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     bootci::run()
/// }
/// ```
pub use bootci_cli::run;
