//! Quantile Computation
//!
//! All percentile bounds in this crate use one fixed rule, Hyndman & Fan
//! type 7 (the default of R and NumPy): for sorted values `x[0..n]` and
//! probability `p`, let `h = (n - 1) * p`; the quantile is
//! `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.
//!
//! Percentile confidence bounds are sensitive to the interpolation rule, so
//! this choice is part of the reproducibility contract of a run.

/// Quantile of already-sorted values using type-7 interpolation.
///
/// # Panics
///
/// Panics if `sorted` is empty or `p` is outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute quantile of empty slice");
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p;
    let lower_idx = h.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = h - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}

/// Quantile of unsorted values.
///
/// Sorts a copy; use [`quantile_sorted`] when computing several quantiles of
/// the same data.
///
/// # Panics
///
/// Panics if `data` is empty or `p` is outside `[0, 1]`.
pub fn quantile(data: &[f64], p: f64) -> f64 {
    let sorted = sorted_copy(data);
    quantile_sorted(&sorted, p)
}

/// Sorted copy of `data` in ascending total order
pub fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        let samples = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        assert!((quantile(&samples, 0.5) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_type7_interpolation() {
        // h = 4 * 0.025 = 0.1 -> 1 + 0.1 * (2 - 1)
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((quantile(&samples, 0.025) - 1.1).abs() < 1e-12);
        assert!((quantile(&samples, 0.975) - 4.9).abs() < 1e-12);
    }

    #[test]
    fn test_matches_numpy_default() {
        // numpy.percentile(range(1, 101), [25, 75]) -> [25.75, 75.25]
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert!((quantile(&samples, 0.25) - 25.75).abs() < 1e-9);
        assert!((quantile(&samples, 0.75) - 75.25).abs() < 1e-9);
    }

    #[test]
    fn test_extremes() {
        let samples = vec![3.0, -1.0, 7.0];
        assert_eq!(quantile(&samples, 0.0), -1.0);
        assert_eq!(quantile(&samples, 1.0), 7.0);
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(quantile(&[42.0], 0.3), 42.0);
    }

    #[test]
    #[should_panic(expected = "empty slice")]
    fn test_empty_panics() {
        quantile(&[], 0.5);
    }
}
