//! Replicate Sets
//!
//! The collection of B statistic values produced by a run, plus the
//! diagnostics computed from it (moments and a histogram).

/// All replicates produced by one run, in trial order.
///
/// A set returned by a successful run always holds exactly the requested
/// number of replicates. Under `NanPolicy::Exclude` some of them may be NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateSet {
    values: Vec<f64>,
}

impl ReplicateSet {
    /// Wrap replicate values
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Replicate values in trial order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the set, returning the values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of replicates (B)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterator over finite replicates
    pub fn finite(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| v.is_finite())
    }

    /// Number of non-finite replicates
    pub fn non_finite_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }

    /// Mean of finite replicates (NaN if there are none)
    pub fn mean(&self) -> f64 {
        let (sum, count) = self.finite().fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }

    /// Sample standard deviation (divisor n - 1) of finite replicates.
    ///
    /// NaN with fewer than two finite replicates.
    pub fn std_dev(&self) -> f64 {
        let finite: Vec<f64> = self.finite().collect();
        sample_std_dev(&finite)
    }

    /// Smallest finite replicate
    pub fn min(&self) -> Option<f64> {
        self.finite().min_by(|a, b| a.total_cmp(b))
    }

    /// Largest finite replicate
    pub fn max(&self) -> Option<f64> {
        self.finite().max_by(|a, b| a.total_cmp(b))
    }

    /// Equal-width histogram of finite replicates.
    ///
    /// Returns an empty histogram if `bins == 0` or there are no finite values.
    /// When every value is equal, a single bin holds them all.
    pub fn histogram(&self, bins: usize) -> Histogram {
        let (Some(min), Some(max)) = (self.min(), self.max()) else {
            return Histogram { bins: Vec::new() };
        };
        if bins == 0 {
            return Histogram { bins: Vec::new() };
        }
        if min == max {
            return Histogram {
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: self.finite().count(),
                }],
            };
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in self.finite() {
            // The maximum lands in the last bin
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + i as f64 * width,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + (i + 1) as f64 * width
                },
                count,
            })
            .collect();

        Histogram { bins }
    }
}

impl From<Vec<f64>> for ReplicateSet {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Sample standard deviation with divisor `n - 1`
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Equal-width histogram of replicate values
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bins in ascending order
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Total number of counted values
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// One histogram bin covering `[lower, upper)` (the last bin is closed)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let set = ReplicateSet::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((set.mean() - 3.0).abs() < 1e-12);
        assert!((set.std_dev() - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(set.min(), Some(1.0));
        assert_eq!(set.max(), Some(5.0));
    }

    #[test]
    fn test_non_finite_ignored_in_moments() {
        let set = ReplicateSet::new(vec![1.0, f64::NAN, 3.0]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.non_finite_count(), 1);
        assert!((set.mean() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_histogram_counts_everything() {
        let values: Vec<f64> = (0..100).map(|x| x as f64).collect();
        let hist = ReplicateSet::new(values).histogram(10);
        assert_eq!(hist.bins.len(), 10);
        assert_eq!(hist.total(), 100);
        assert!(hist.bins.iter().all(|b| b.count == 10));
        assert_eq!(hist.bins[0].lower, 0.0);
        assert_eq!(hist.bins[9].upper, 99.0);
    }

    #[test]
    fn test_histogram_constant_values() {
        let hist = ReplicateSet::new(vec![2.0; 5]).histogram(4);
        assert_eq!(hist.bins.len(), 1);
        assert_eq!(hist.bins[0].count, 5);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(ReplicateSet::new(vec![]).histogram(4).bins.is_empty());
        assert!(ReplicateSet::new(vec![f64::NAN]).histogram(4).bins.is_empty());
        assert!(ReplicateSet::new(vec![1.0, 2.0]).histogram(0).bins.is_empty());
    }
}
