//! Error Types
//!
//! Every failure mode of a bootstrap run. Runs are fail-fast: an error in any
//! trial aborts the whole run, so a replicate set that reaches aggregation
//! always holds exactly B values.

use thiserror::Error;

/// Errors raised by a statistic while evaluating one resample
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatisticError {
    /// The statistic is undefined on this resample (e.g. zero variance)
    #[error("statistic undefined: {0}")]
    Degenerate(String),

    /// The statistic asked for a column the dataset does not have
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}

/// Errors raised while building a dataset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("dataset has no columns")]
    NoColumns,

    #[error("column '{name}' has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        got: usize,
        expected: usize,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// Errors that can occur during a bootstrap run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BootstrapError {
    /// A size parameter (rows, replicates, workers) is out of range
    #[error("invalid {what}: got {got}, need at least {min}")]
    InvalidSize {
        what: &'static str,
        got: usize,
        min: usize,
    },

    #[error("invalid confidence level: {0} (must be strictly between 0 and 1)")]
    InvalidConfidenceLevel(f64),

    /// The statistic is undefined on a resample.
    ///
    /// `trial` is `None` when the failure happened on the original data
    /// (point estimate or jackknife). `indices` carries the offending index
    /// set for small datasets so the failure can be replayed from `seed`.
    #[error("degenerate input{}: {reason}", trial_suffix(.trial))]
    DegenerateInput {
        trial: Option<usize>,
        seed: u64,
        reason: String,
        indices: Option<Vec<usize>>,
    },

    #[error("not enough usable replicates: got {got}, need at least {min}")]
    InsufficientReplicates { got: usize, min: usize },

    /// A trial panicked inside a worker
    #[error("worker {worker} failed on trial {trial}: {message}")]
    WorkerFailure {
        worker: usize,
        trial: usize,
        message: String,
    },

    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("run cancelled after {completed} trials")]
    Cancelled { completed: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Statistic(#[from] StatisticError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

fn trial_suffix(trial: &Option<usize>) -> String {
    match trial {
        Some(t) => format!(" on trial {t}"),
        None => String::new(),
    }
}

impl BootstrapError {
    /// Whether this error came from the statistic being undefined
    pub fn is_degenerate(&self) -> bool {
        matches!(self, BootstrapError::DegenerateInput { .. })
    }
}
