//! Bootstrap Resampling
//!
//! The complete routine: point estimate on the original data, B resampled
//! replicates through the execution strategy, then aggregation into a standard
//! error and normal, percentile and (optionally) BCa intervals.

use crate::aggregate::{aggregate, validate_confidence_level, ConfidenceInterval, NanPolicy};
use crate::bca::{bca_interval, jackknife};
use crate::dataset::Dataset;
use crate::error::{BootstrapError, StatisticError};
use crate::execution::{run_bootstrap, ExecutionMode, StreamDerivation, TrialPlan};
use crate::quantile::sorted_copy;
use crate::replicates::ReplicateSet;
use crate::statistic::Statistic;
use crate::{DEFAULT_CONFIDENCE_LEVEL, DEFAULT_ITERATIONS, DEFAULT_SEED};
use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::Arc;

/// Bootstrap configuration
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Number of bootstrap replicates B (default: 10,000)
    pub iterations: usize,
    /// Confidence level (default: 0.95 for 95% CI)
    pub confidence_level: f64,
    /// Master seed
    pub seed: u64,
    /// Sequential or parallel execution (default: parallel on all cores)
    pub mode: ExecutionMode,
    /// Random stream assignment
    pub streams: StreamDerivation,
    /// Handling of degenerate and non-finite replicates
    pub nan_policy: NanPolicy,
    /// Also compute the BCa interval (costs n extra evaluations)
    pub bca: bool,
    /// Cooperative cancellation flag
    pub cancel: Option<Arc<AtomicBool>>,
    /// Completed-trial counter for progress display
    pub progress: Option<Arc<AtomicUsize>>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            seed: DEFAULT_SEED,
            mode: ExecutionMode::default(),
            streams: StreamDerivation::default(),
            nan_policy: NanPolicy::default(),
            bca: false,
            cancel: None,
            progress: None,
        }
    }
}

impl BootstrapConfig {
    /// The execution plan for this configuration
    pub fn plan(&self) -> TrialPlan {
        TrialPlan {
            seed: self.seed,
            mode: self.mode,
            streams: self.streams,
            nan_policy: self.nan_policy,
            cancel: self.cancel.clone(),
            progress: self.progress.clone(),
        }
    }
}

/// Result of a bootstrap run
#[derive(Debug, Clone)]
pub struct BootstrapResult {
    /// Name of the statistic
    pub statistic: String,
    /// Statistic on the original data
    pub point_estimate: f64,
    /// Sample standard deviation of the replicates
    pub standard_error: f64,
    /// Normal-approximation interval
    pub normal_ci: ConfidenceInterval,
    /// Percentile interval
    pub percentile_ci: ConfidenceInterval,
    /// BCa interval, when requested
    pub bca_ci: Option<ConfidenceInterval>,
    /// Mean of the usable replicates
    pub replicate_mean: f64,
    /// `replicate_mean - point_estimate`
    pub bias: f64,
    /// All B replicates in trial order
    pub replicates: ReplicateSet,
    /// Replicates dropped under `NanPolicy::Exclude`
    pub excluded: usize,
    /// Rows in the dataset
    pub sample_size: usize,
    /// Warning message if any
    pub warning: Option<String>,
}

impl BootstrapResult {
    /// Number of replicates B
    pub fn iterations(&self) -> usize {
        self.replicates.len()
    }
}

/// Evaluate `statistic` on the unresampled dataset
pub fn point_estimate<S>(dataset: &Dataset, statistic: &S, seed: u64) -> Result<f64, BootstrapError>
where
    S: Statistic + ?Sized,
{
    let indices = dataset.full_indices();
    let degenerate = |reason: String| BootstrapError::DegenerateInput {
        trial: None,
        seed,
        reason,
        indices: None,
    };

    match statistic.evaluate(&dataset.resample(&indices)) {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(value) => Err(degenerate(format!("point estimate is {value}"))),
        Err(StatisticError::Degenerate(reason)) => Err(degenerate(reason)),
        Err(other) => Err(other.into()),
    }
}

/// Bootstrap `statistic` over `dataset`.
///
/// # Errors
///
/// Any `BootstrapError`; see [`run_bootstrap`] and [`aggregate`]. The point
/// estimate itself must be finite, otherwise `DegenerateInput` with
/// `trial = None` is returned before any resampling.
pub fn compute_bootstrap<S>(
    dataset: &Dataset,
    statistic: &S,
    config: &BootstrapConfig,
) -> Result<BootstrapResult, BootstrapError>
where
    S: Statistic + ?Sized,
{
    validate_confidence_level(config.confidence_level)?;
    if dataset.is_empty() {
        return Err(BootstrapError::InvalidSize {
            what: "dataset rows",
            got: 0,
            min: 1,
        });
    }

    let point = point_estimate(dataset, statistic, config.seed)?;
    let replicates = run_bootstrap(dataset, statistic, config.iterations, &config.plan())?;
    let summary = aggregate(
        replicates.values(),
        point,
        config.confidence_level,
        config.nan_policy,
    )?;

    let bca_ci = if config.bca {
        let jk = jackknife(dataset, statistic, config.seed)?;
        let sorted = sorted_copy(&replicates.finite().collect::<Vec<_>>());
        Some(bca_interval(&sorted, point, &jk, config.confidence_level))
    } else {
        None
    };

    let warning = (summary.excluded > 0).then(|| {
        format!(
            "{} of {} replicates were non-finite and excluded",
            summary.excluded,
            replicates.len()
        )
    });

    tracing::debug!(
        statistic = statistic.name(),
        point,
        se = summary.standard_error,
        excluded = summary.excluded,
        "bootstrap complete"
    );

    Ok(BootstrapResult {
        statistic: statistic.name().to_string(),
        point_estimate: point,
        standard_error: summary.standard_error,
        normal_ci: summary.normal_ci,
        percentile_ci: summary.percentile_ci,
        bca_ci,
        replicate_mean: summary.replicate_mean,
        bias: summary.bias,
        replicates,
        excluded: summary.excluded,
        sample_size: dataset.n_rows(),
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Resample;
    use crate::statistic::{Correlation, Mean};

    fn sequential(iterations: usize, seed: u64) -> BootstrapConfig {
        BootstrapConfig {
            iterations,
            seed,
            mode: ExecutionMode::Sequential,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = BootstrapConfig::default();
        assert_eq!(config.iterations, 10_000);
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.streams, StreamDerivation::PerTrial);
        assert_eq!(config.nan_policy, NanPolicy::FailFast);
        assert!(config.mode.workers() >= 1);
    }

    #[test]
    fn test_mean_bootstrap() {
        let values: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        let ds = Dataset::from_columns([("v", values)]).unwrap();
        let result = compute_bootstrap(&ds, &Mean::new("v"), &sequential(2000, 7)).unwrap();

        assert!((result.point_estimate - 25.5).abs() < 1e-12);
        assert_eq!(result.iterations(), 2000);
        assert_eq!(result.sample_size, 50);
        assert_eq!(result.statistic, "mean");

        // SE of the mean is sd / sqrt(n), about 2.04 here
        let expected = (50.0f64 * 51.0 / 12.0).sqrt() / 50.0f64.sqrt();
        assert!((result.standard_error - expected).abs() < 0.2 * expected);
        assert!(result.percentile_ci.contains(result.point_estimate));
        assert!(result.normal_ci.contains(result.point_estimate));
        assert!(result.bca_ci.is_none());
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_bca_requested() {
        let values: Vec<f64> = (1..=30).map(|x| (x as f64).powi(2)).collect();
        let ds = Dataset::from_columns([("v", values)]).unwrap();
        let config = BootstrapConfig {
            bca: true,
            ..sequential(2000, 3)
        };
        let result = compute_bootstrap(&ds, &Mean::new("v"), &config).unwrap();
        let bca = result.bca_ci.unwrap();
        assert!(bca.lower < result.point_estimate && result.point_estimate < bca.upper);
    }

    #[test]
    fn test_degenerate_point_estimate() {
        let ds = Dataset::paired(vec![2.0; 4], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let err = compute_bootstrap(&ds, &Correlation::new("x", "y"), &sequential(100, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::DegenerateInput { trial: None, .. }
        ));
    }

    #[test]
    fn test_exclude_policy_keeps_b() {
        let ds = Dataset::paired(vec![1.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        let config = BootstrapConfig {
            nan_policy: NanPolicy::Exclude,
            ..sequential(500, 11)
        };
        let result = compute_bootstrap(&ds, &Correlation::new("x", "y"), &config).unwrap();
        assert_eq!(result.replicates.len(), 500);
        assert!(result.excluded > 0);
        assert_eq!(result.excluded, result.replicates.non_finite_count());
        assert!(result.warning.is_some());
    }

    #[test]
    fn test_bca_with_nan_jackknife_is_degenerate() {
        // 0/0 on a constant x yields NaN instead of a Degenerate error
        fn naive_correlation(s: &Resample<'_>) -> Result<f64, StatisticError> {
            let x = s.column("x")?.to_vec();
            let y = s.column("y")?.to_vec();
            let n = x.len() as f64;
            let (mx, my) = (x.iter().sum::<f64>() / n, y.iter().sum::<f64>() / n);
            let sxy: f64 = x.iter().zip(&y).map(|(a, b)| (a - mx) * (b - my)).sum();
            let sxx: f64 = x.iter().map(|a| (a - mx).powi(2)).sum();
            let syy: f64 = y.iter().map(|b| (b - my).powi(2)).sum();
            Ok(sxy / (sxx * syy).sqrt())
        }

        // Dropping the only x = 5 row leaves x constant
        let ds = Dataset::paired(vec![1.0, 1.0, 5.0, 1.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let config = BootstrapConfig {
            nan_policy: NanPolicy::Exclude,
            bca: true,
            ..sequential(300, 11)
        };
        let err = compute_bootstrap(&ds, &naive_correlation, &config).unwrap_err();
        match err {
            BootstrapError::DegenerateInput {
                trial, seed, reason, ..
            } => {
                assert_eq!(trial, None);
                assert_eq!(seed, 11);
                assert!(reason.contains("jackknife without row 2"));
            }
            other => panic!("expected DegenerateInput, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_confidence_checked_first() {
        let ds = Dataset::from_columns([("v", vec![1.0, 2.0, 3.0])]).unwrap();
        let config = BootstrapConfig {
            confidence_level: 1.0,
            ..sequential(100, 1)
        };
        let err = compute_bootstrap(&ds, &Mean::new("v"), &config).unwrap_err();
        assert_eq!(err, BootstrapError::InvalidConfidenceLevel(1.0));
    }
}
