//! Replicate Aggregation
//!
//! Turns a replicate set into a standard error and confidence intervals:
//!
//! - standard error: sample standard deviation of the replicates (divisor B - 1)
//! - normal interval: `point_estimate +/- z * SE`, z from the inverse normal CDF
//! - percentile interval: type-7 quantiles at `alpha / 2` and `1 - alpha / 2`

use crate::error::BootstrapError;
use crate::normal::critical_value;
use crate::quantile::{quantile_sorted, sorted_copy};
use crate::replicates::sample_std_dev;

/// Minimum number of usable replicates for a standard error
pub const MIN_REPLICATES: usize = 2;

/// What to do with NaN or infinite replicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NanPolicy {
    /// Abort with `DegenerateInput` on the first non-finite replicate
    #[default]
    FailFast,
    /// Drop non-finite replicates and report how many were dropped
    Exclude,
}

impl std::str::FromStr for NanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail-fast" | "fail" => Ok(NanPolicy::FailFast),
            "exclude" | "drop" => Ok(NanPolicy::Exclude),
            other => Err(format!("Unknown NaN policy: {}", other)),
        }
    }
}

impl std::fmt::Display for NanPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NanPolicy::FailFast => write!(f, "fail-fast"),
            NanPolicy::Exclude => write!(f, "exclude"),
        }
    }
}

/// Confidence interval bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

impl ConfidenceInterval {
    /// Distance between the bounds
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Whether `value` lies within the closed interval
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Summary of a replicate distribution
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Sample standard deviation of usable replicates
    pub standard_error: f64,
    /// `point_estimate +/- z * standard_error`
    pub normal_ci: ConfidenceInterval,
    /// Empirical quantiles of usable replicates
    pub percentile_ci: ConfidenceInterval,
    /// Mean of usable replicates
    pub replicate_mean: f64,
    /// `replicate_mean - point_estimate`
    pub bias: f64,
    /// Replicates that entered the computation
    pub used: usize,
    /// Non-finite replicates dropped under `NanPolicy::Exclude`
    pub excluded: usize,
}

/// Check that a confidence level lies strictly inside (0, 1)
pub fn validate_confidence_level(confidence_level: f64) -> Result<(), BootstrapError> {
    if confidence_level > 0.0 && confidence_level < 1.0 {
        Ok(())
    } else {
        Err(BootstrapError::InvalidConfidenceLevel(confidence_level))
    }
}

/// Keep the finite replicates according to `policy`.
///
/// Returns the usable values and the number excluded. Aggregation sees values
/// only, so a `DegenerateInput` raised here has `seed: 0` and no indices;
/// `run_bootstrap` reports degenerate trials with the master seed before
/// they ever reach this point.
pub fn usable_replicates(
    replicates: &[f64],
    nan_policy: NanPolicy,
) -> Result<(Vec<f64>, usize), BootstrapError> {
    match nan_policy {
        NanPolicy::FailFast => {
            if let Some(pos) = replicates.iter().position(|v| !v.is_finite()) {
                return Err(BootstrapError::DegenerateInput {
                    trial: Some(pos),
                    seed: 0,
                    reason: format!("replicate {pos} is {}", replicates[pos]),
                    indices: None,
                });
            }
            Ok((replicates.to_vec(), 0))
        }
        NanPolicy::Exclude => {
            let usable: Vec<f64> = replicates.iter().copied().filter(|v| v.is_finite()).collect();
            let excluded = replicates.len() - usable.len();
            if excluded > 0 {
                tracing::warn!(
                    excluded,
                    total = replicates.len(),
                    "excluding non-finite replicates"
                );
            }
            Ok((usable, excluded))
        }
    }
}

/// Aggregate replicates into a standard error and two confidence intervals.
///
/// # Errors
///
/// - `InvalidConfidenceLevel` unless `0 < confidence_level < 1`
/// - `DegenerateInput` for a non-finite replicate under `NanPolicy::FailFast`
/// - `InsufficientReplicates` with fewer than two usable replicates
pub fn aggregate(
    replicates: &[f64],
    point_estimate: f64,
    confidence_level: f64,
    nan_policy: NanPolicy,
) -> Result<Aggregate, BootstrapError> {
    validate_confidence_level(confidence_level)?;

    let (usable, excluded) = usable_replicates(replicates, nan_policy)?;
    if usable.len() < MIN_REPLICATES {
        return Err(BootstrapError::InsufficientReplicates {
            got: usable.len(),
            min: MIN_REPLICATES,
        });
    }

    let standard_error = sample_std_dev(&usable);
    let replicate_mean = usable.iter().sum::<f64>() / usable.len() as f64;

    let z = critical_value(confidence_level);
    let normal_ci = ConfidenceInterval {
        lower: point_estimate - z * standard_error,
        upper: point_estimate + z * standard_error,
        level: confidence_level,
    };

    let sorted = sorted_copy(&usable);
    let percentile_ci = percentile_interval(&sorted, confidence_level);

    Ok(Aggregate {
        standard_error,
        normal_ci,
        percentile_ci,
        replicate_mean,
        bias: replicate_mean - point_estimate,
        used: usable.len(),
        excluded,
    })
}

/// Percentile interval from sorted replicates
pub fn percentile_interval(sorted: &[f64], confidence_level: f64) -> ConfidenceInterval {
    let alpha = 1.0 - confidence_level;
    ConfidenceInterval {
        lower: quantile_sorted(sorted, alpha / 2.0),
        upper: quantile_sorted(sorted, 1.0 - alpha / 2.0),
        level: confidence_level,
    }
}
