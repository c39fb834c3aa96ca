//! Statistic Evaluation
//!
//! A statistic maps one resample to one scalar. Implementations must be pure:
//! the same resample always yields the same value, and no state is shared
//! between calls. That is what makes runs reproducible and lets trials execute
//! on any worker.
//!
//! Degenerate resamples (for example a column with zero variance) may either
//! return `NaN` or `Err(StatisticError::Degenerate)`; the run's `NanPolicy`
//! decides what happens next.

use crate::dataset::{Resample, ResampledColumn};
use crate::error::StatisticError;

/// A pure function from a resample to a scalar estimate
pub trait Statistic: Send + Sync {
    /// Evaluate on one resample
    fn evaluate(&self, sample: &Resample<'_>) -> Result<f64, StatisticError>;

    /// Short name used in logs and reports
    fn name(&self) -> &str {
        "statistic"
    }
}

impl<F> Statistic for F
where
    F: Fn(&Resample<'_>) -> Result<f64, StatisticError> + Send + Sync,
{
    fn evaluate(&self, sample: &Resample<'_>) -> Result<f64, StatisticError> {
        self(sample)
    }
}

/// Arithmetic mean of one column
#[derive(Debug, Clone)]
pub struct Mean {
    /// Column to average
    pub column: String,
}

impl Mean {
    /// Mean of `column`
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl Statistic for Mean {
    fn evaluate(&self, sample: &Resample<'_>) -> Result<f64, StatisticError> {
        let col = sample.column(&self.column)?;
        if col.is_empty() {
            return Err(StatisticError::Degenerate("empty resample".to_string()));
        }
        Ok(col.iter().sum::<f64>() / col.len() as f64)
    }

    fn name(&self) -> &str {
        "mean"
    }
}

/// Pearson correlation between two columns
#[derive(Debug, Clone)]
pub struct Correlation {
    /// First column
    pub x: String,
    /// Second column
    pub y: String,
}

impl Correlation {
    /// Correlation of `x` with `y`
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl Statistic for Correlation {
    fn evaluate(&self, sample: &Resample<'_>) -> Result<f64, StatisticError> {
        let x = sample.column(&self.x)?;
        let y = sample.column(&self.y)?;
        let moments = CrossMoments::compute(&x, &y)?;

        if moments.sxx == 0.0 {
            return Err(zero_variance(&self.x));
        }
        if moments.syy == 0.0 {
            return Err(zero_variance(&self.y));
        }

        Ok(moments.sxy / (moments.sxx * moments.syy).sqrt())
    }

    fn name(&self) -> &str {
        "correlation"
    }
}

/// Ordinary least-squares slope of `y` regressed on `x`
#[derive(Debug, Clone)]
pub struct RegressionSlope {
    /// Predictor column
    pub x: String,
    /// Response column
    pub y: String,
}

impl RegressionSlope {
    /// Slope of `y` on `x`
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

impl Statistic for RegressionSlope {
    fn evaluate(&self, sample: &Resample<'_>) -> Result<f64, StatisticError> {
        let x = sample.column(&self.x)?;
        let y = sample.column(&self.y)?;
        let moments = CrossMoments::compute(&x, &y)?;

        if moments.sxx == 0.0 {
            return Err(zero_variance(&self.x));
        }

        Ok(moments.sxy / moments.sxx)
    }

    fn name(&self) -> &str {
        "slope"
    }
}

/// Centered sums of squares and cross products
struct CrossMoments {
    sxx: f64,
    syy: f64,
    sxy: f64,
}

impl CrossMoments {
    fn compute(x: &ResampledColumn<'_>, y: &ResampledColumn<'_>) -> Result<Self, StatisticError> {
        let n = x.len();
        if n < 2 {
            return Err(StatisticError::Degenerate(format!(
                "need at least 2 rows, got {n}"
            )));
        }

        let mean_x = x.iter().sum::<f64>() / n as f64;
        let mean_y = y.iter().sum::<f64>() / n as f64;

        let mut sxx = 0.0;
        let mut syy = 0.0;
        let mut sxy = 0.0;
        for (a, b) in x.iter().zip(y.iter()) {
            let dx = a - mean_x;
            let dy = b - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        Ok(Self { sxx, syy, sxy })
    }
}

fn zero_variance(column: &str) -> StatisticError {
    StatisticError::Degenerate(format!("zero variance in '{column}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn eval<S: Statistic>(stat: &S, ds: &Dataset, indices: &[usize]) -> Result<f64, StatisticError> {
        stat.evaluate(&ds.resample(indices))
    }

    #[test]
    fn test_mean_counts_duplicates() {
        let ds = Dataset::from_columns([("v", vec![1.0, 2.0, 10.0])]).unwrap();
        // Row 2 twice, row 0 once: (10 + 10 + 1) / 3
        let m = eval(&Mean::new("v"), &ds, &[2, 2, 0]).unwrap();
        assert!((m - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_correlation() {
        let ds = Dataset::paired(vec![1.0, 2.0, 3.0, 4.0], vec![2.0, 4.0, 6.0, 8.0]).unwrap();
        let r = eval(&Correlation::new("x", "y"), &ds, &ds.full_indices()).unwrap();
        assert!((r - 1.0).abs() < 1e-12);

        let ds = Dataset::paired(vec![1.0, 2.0, 3.0, 4.0], vec![8.0, 6.0, 4.0, 2.0]).unwrap();
        let r = eval(&Correlation::new("x", "y"), &ds, &ds.full_indices()).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_known_value() {
        // sxy = 8, sxx = 10, syy = 10 -> r = 0.8
        let ds = Dataset::paired(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.0, 1.0, 4.0, 3.0, 5.0])
            .unwrap();
        let r = eval(&Correlation::new("x", "y"), &ds, &ds.full_indices()).unwrap();
        assert!((r - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_correlation_zero_variance_is_degenerate() {
        let ds = Dataset::paired(vec![1.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]).unwrap();
        // Only rows with x == 1 selected
        let err = eval(&Correlation::new("x", "y"), &ds, &[0, 1, 0]).unwrap_err();
        assert_eq!(err, StatisticError::Degenerate("zero variance in 'x'".to_string()));
    }

    #[test]
    fn test_slope() {
        let ds = Dataset::paired(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 3.0, 5.0, 7.0]).unwrap();
        let b = eval(&RegressionSlope::new("x", "y"), &ds, &ds.full_indices()).unwrap();
        assert!((b - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_slope_ignores_constant_response() {
        let ds = Dataset::paired(vec![0.0, 1.0, 2.0], vec![4.0, 4.0, 4.0]).unwrap();
        let b = eval(&RegressionSlope::new("x", "y"), &ds, &ds.full_indices()).unwrap();
        assert_eq!(b, 0.0);
    }

    fn column_max(s: &Resample<'_>) -> Result<f64, StatisticError> {
        Ok(s.column("v")?.iter().fold(f64::NEG_INFINITY, f64::max))
    }

    #[test]
    fn test_function_statistic() {
        let ds = Dataset::from_columns([("v", vec![3.0, 5.0])]).unwrap();
        assert_eq!(eval(&column_max, &ds, &[0, 1]).unwrap(), 5.0);
        assert_eq!(Statistic::name(&column_max), "statistic");
    }
}
