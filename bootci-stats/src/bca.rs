//! BCa (Bias-Corrected and Accelerated) Intervals
//!
//! Adjusts the percentile interval for median bias (`z0`, from the share of
//! replicates below the point estimate) and skewness (`a`, from jackknife
//! estimates). More accurate than the plain percentile interval for small
//! samples and skewed statistics.

use crate::aggregate::ConfidenceInterval;
use crate::dataset::Dataset;
use crate::error::{BootstrapError, StatisticError};
use crate::normal::{inverse_normal_cdf, normal_cdf};
use crate::quantile::quantile_sorted;
use crate::statistic::Statistic;

/// Leave-one-out estimates of `statistic`.
///
/// Element `i` is the statistic evaluated on every row except row `i`. The
/// dataset is read through index views, never copied.
///
/// # Errors
///
/// `InvalidSize` with fewer than two rows, `DegenerateInput` (carrying `seed`)
/// if any leave-one-out subset is degenerate or yields a non-finite value.
pub fn jackknife<S>(dataset: &Dataset, statistic: &S, seed: u64) -> Result<Vec<f64>, BootstrapError>
where
    S: Statistic + ?Sized,
{
    let n = dataset.n_rows();
    if n < 2 {
        return Err(BootstrapError::InvalidSize {
            what: "dataset rows for jackknife",
            got: n,
            min: 2,
        });
    }

    let mut indices: Vec<usize> = Vec::with_capacity(n - 1);
    let mut estimates = Vec::with_capacity(n);

    for left_out in 0..n {
        indices.clear();
        indices.extend((0..n).filter(|&i| i != left_out));

        let reason = match statistic.evaluate(&dataset.resample(&indices)) {
            Ok(value) if value.is_finite() => {
                estimates.push(value);
                continue;
            }
            Ok(value) => format!("statistic returned {value}"),
            Err(StatisticError::Degenerate(reason)) => reason,
            Err(other) => return Err(BootstrapError::Statistic(other)),
        };

        return Err(BootstrapError::DegenerateInput {
            trial: None,
            seed,
            reason: format!("jackknife without row {left_out}: {reason}"),
            indices: None,
        });
    }

    Ok(estimates)
}

/// Acceleration constant from jackknife estimates.
///
/// `a = sum(d^3) / (6 * sum(d^2)^1.5)` with `d = mean - theta_i`; zero when
/// the jackknife estimates do not vary.
pub fn acceleration(jackknife: &[f64]) -> f64 {
    if jackknife.is_empty() {
        return 0.0;
    }
    let mean = jackknife.iter().sum::<f64>() / jackknife.len() as f64;
    let numerator: f64 = jackknife.iter().map(|x| (mean - x).powi(3)).sum();
    let denominator: f64 = jackknife.iter().map(|x| (mean - x).powi(2)).sum();

    if denominator.abs() < 1e-300 {
        0.0
    } else {
        numerator / (6.0 * denominator.powf(1.5))
    }
}

/// BCa interval from sorted finite replicates.
///
/// `sorted` must be in ascending order and non-empty.
pub fn bca_interval(
    sorted: &[f64],
    point_estimate: f64,
    jackknife: &[f64],
    confidence_level: f64,
) -> ConfidenceInterval {
    let b = sorted.len();

    // Bias correction: share of replicates below the point estimate
    let below = sorted.iter().filter(|&&x| x < point_estimate).count();
    let prop = (below as f64 / b as f64).clamp(1.0 / (2.0 * b as f64), 1.0 - 1.0 / (2.0 * b as f64));
    let z0 = inverse_normal_cdf(prop);

    let a = acceleration(jackknife);

    let alpha = 1.0 - confidence_level;
    let adjust = |z_alpha: f64| -> f64 {
        let shifted = z0 + z_alpha;
        let denom = 1.0 - a * shifted;
        if denom <= 0.0 {
            // Acceleration too large for this tail; fall back to the extreme
            return if shifted < 0.0 { 0.0 } else { 1.0 };
        }
        normal_cdf(z0 + shifted / denom).clamp(0.0, 1.0)
    };

    // Non-finite adjustments fall back to the plain percentile bound
    let p_lower = Some(adjust(inverse_normal_cdf(alpha / 2.0)))
        .filter(|p| p.is_finite())
        .unwrap_or(alpha / 2.0);
    let p_upper = Some(adjust(inverse_normal_cdf(1.0 - alpha / 2.0)))
        .filter(|p| p.is_finite())
        .unwrap_or(1.0 - alpha / 2.0);

    ConfidenceInterval {
        lower: quantile_sorted(sorted, p_lower),
        upper: quantile_sorted(sorted, p_upper),
        level: confidence_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::percentile_interval;
    use crate::dataset::Resample;
    use crate::statistic::{Correlation, Mean};

    #[test]
    fn test_jackknife_mean() {
        let ds = Dataset::from_columns([("v", vec![1.0, 2.0, 3.0, 6.0])]).unwrap();
        let jk = jackknife(&ds, &Mean::new("v"), 0).unwrap();
        assert_eq!(jk.len(), 4);
        assert!((jk[0] - 11.0 / 3.0).abs() < 1e-12);
        assert!((jk[3] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_jackknife_needs_two_rows() {
        let ds = Dataset::from_columns([("v", vec![1.0])]).unwrap();
        let err = jackknife(&ds, &Mean::new("v"), 0).unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidSize { got: 1, .. }));
    }

    #[test]
    fn test_jackknife_degenerate() {
        // Dropping row 2 leaves x constant
        let ds = Dataset::paired(vec![1.0, 1.0, 5.0], vec![1.0, 2.0, 3.0]).unwrap();
        let err = jackknife(&ds, &Correlation::new("x", "y"), 17).unwrap_err();
        assert!(matches!(
            err,
            BootstrapError::DegenerateInput {
                trial: None,
                seed: 17,
                ..
            }
        ));
    }

    #[test]
    fn test_jackknife_nan_is_degenerate() {
        let ds = Dataset::from_columns([("v", vec![1.0, 2.0, 3.0])]).unwrap();
        let nan_without_first = |s: &Resample<'_>| -> Result<f64, StatisticError> {
            if s.indices()[0] == 0 {
                Ok(1.0)
            } else {
                Ok(f64::NAN)
            }
        };
        let err = jackknife(&ds, &nan_without_first, 5).unwrap_err();
        match err {
            BootstrapError::DegenerateInput { seed, reason, .. } => {
                assert_eq!(seed, 5);
                assert!(reason.contains("without row 0"));
            }
            other => panic!("expected DegenerateInput, got {other:?}"),
        }
    }

    #[test]
    fn test_nan_jackknife_falls_back_to_percentile() {
        let sorted: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        let bca = bca_interval(&sorted, 0.4995, &[f64::NAN, 0.0, 1.0], 0.95);
        let pct = percentile_interval(&sorted, 0.95);
        assert_eq!(bca.lower, pct.lower);
        assert_eq!(bca.upper, pct.upper);
    }

    #[test]
    fn test_symmetric_acceleration_is_zero() {
        assert_eq!(acceleration(&[-1.0, 0.0, 1.0]), 0.0);
        assert_eq!(acceleration(&[2.0, 2.0, 2.0]), 0.0);
        // Long left tail in the estimates means mean - x is large and positive
        assert!(acceleration(&[-10.0, 1.0, 1.0, 1.0]) > 0.0);
    }

    #[test]
    fn test_reduces_to_percentile_without_bias_or_skew() {
        let sorted: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        // Exactly half the replicates lie below 0.4995
        let bca = bca_interval(&sorted, 0.4995, &[-1.0, 0.0, 1.0], 0.95);
        let pct = percentile_interval(&sorted, 0.95);
        assert!((bca.lower - pct.lower).abs() < 1e-3);
        assert!((bca.upper - pct.upper).abs() < 1e-3);
    }

    #[test]
    fn test_bias_shifts_interval() {
        let sorted: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        let pct = percentile_interval(&sorted, 0.95);
        // Point estimate above most replicates pushes both bounds up
        let bca = bca_interval(&sorted, 0.7, &[-1.0, 0.0, 1.0], 0.95);
        assert!(bca.lower > pct.lower);
        assert!(bca.upper >= pct.upper);
    }
}
