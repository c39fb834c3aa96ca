#![warn(missing_docs)]
//! bootci Statistical Engine
//!
//! Nonparametric bootstrap for an arbitrary scalar statistic over an
//! in-memory tabular dataset:
//! - Resampling with replacement from explicit, per-trial or per-worker streams
//! - Sequential or parallel replicate generation on a fixed worker pool
//! - Standard error, normal-approximation, percentile and BCa intervals
//! - Repeated simulation from a known population for comparison

mod aggregate;
mod bca;
mod bootstrap;
mod dataset;
mod error;
mod execution;
mod normal;
mod quantile;
mod replicates;
mod resampler;
mod simulation;
mod statistic;

pub use aggregate::{
    Aggregate, ConfidenceInterval, MIN_REPLICATES, NanPolicy, aggregate, percentile_interval,
    usable_replicates, validate_confidence_level,
};
pub use bca::{acceleration, bca_interval, jackknife};
pub use bootstrap::{BootstrapConfig, BootstrapResult, compute_bootstrap, point_estimate};
pub use dataset::{Dataset, ResampledColumn, Resample};
pub use error::{BootstrapError, DatasetError, StatisticError};
pub use execution::{
    ExecutionMode, MAX_REPORTED_INDICES, StreamDerivation, TrialPlan, available_workers,
    run_bootstrap,
};
pub use normal::{critical_value, inverse_normal_cdf, normal_cdf};
pub use quantile::{quantile, quantile_sorted, sorted_copy};
pub use replicates::{Histogram, HistogramBin, ReplicateSet};
pub use resampler::{
    StreamRng, counter_rng_seed, distinct_count, draw_indices, draw_indices_into, trial_rng,
    worker_rng,
};
pub use simulation::{BivariateNormal, Population, simulate_sampling_distribution};
pub use statistic::{Correlation, Mean, RegressionSlope, Statistic};

/// Default number of bootstrap replicates
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Default confidence level (95%)
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default master seed
pub const DEFAULT_SEED: u64 = 0x5EED;
