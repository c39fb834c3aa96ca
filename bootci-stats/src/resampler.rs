//! Resampling With Replacement
//!
//! Draws bootstrap index sets and derives the independent random streams that
//! feed them. Two derivations are supported:
//!
//! - **Per trial**: trial `t` gets its own generator seeded from
//!   `counter_rng_seed(master, t)`. Results do not depend on how trials are
//!   scheduled.
//! - **Per worker**: worker `w` owns one generator that starts `w` jumps
//!   (2^128 draws each) past the master-seeded generator, so worker streams
//!   never overlap.

use crate::error::BootstrapError;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Generator used for every resampling stream
pub type StreamRng = Xoshiro256PlusPlus;

/// Counter-based RNG seed generation using SplitMix64.
///
/// A stateless mixing function that maps `(base_seed, counter)` to a
/// well-distributed 64-bit seed. Consecutive counters give unrelated seeds,
/// unlike plain `base_seed + counter`.
#[inline]
pub fn counter_rng_seed(base_seed: u64, counter: u64) -> u64 {
    // See: https://xoshiro.di.unimi.it/splitmix64.c
    let mut z = base_seed.wrapping_add(counter.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generator for a single trial under per-trial stream derivation
pub fn trial_rng(master_seed: u64, trial: usize) -> StreamRng {
    StreamRng::seed_from_u64(counter_rng_seed(master_seed, trial as u64))
}

/// Generator owned by one worker under per-worker stream derivation.
///
/// Worker 0 uses the master-seeded stream itself; worker `w` is advanced by
/// `w` calls to `jump()`.
pub fn worker_rng(master_seed: u64, worker: usize) -> StreamRng {
    let mut rng = StreamRng::seed_from_u64(master_seed);
    for _ in 0..worker {
        rng.jump();
    }
    rng
}

/// Draw `n` indices uniformly from `0..n` with replacement.
///
/// # Errors
///
/// `InvalidSize` if `n == 0`.
pub fn draw_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Vec<usize>, BootstrapError> {
    if n == 0 {
        return Err(BootstrapError::InvalidSize {
            what: "dataset rows",
            got: 0,
            min: 1,
        });
    }
    let mut out = vec![0; n];
    draw_indices_into(rng, &mut out);
    Ok(out)
}

/// Fill `out` with indices drawn uniformly from `0..out.len()` with replacement.
///
/// Allocation-free variant of [`draw_indices`] for hot loops that reuse one
/// buffer per worker. Does nothing on an empty buffer.
pub fn draw_indices_into<R: Rng + ?Sized>(rng: &mut R, out: &mut [usize]) {
    let n = out.len();
    for slot in out.iter_mut() {
        *slot = rng.random_range(0..n);
    }
}

/// Number of distinct values in an index set
pub fn distinct_count(indices: &[usize]) -> usize {
    let mut seen = vec![false; indices.iter().copied().max().map_or(0, |m| m + 1)];
    let mut distinct = 0;
    for &i in indices {
        if !seen[i] {
            seen[i] = true;
            distinct += 1;
        }
    }
    distinct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_seed_spreads_consecutive_counters() {
        let a = counter_rng_seed(42, 0);
        let b = counter_rng_seed(42, 1);
        assert_ne!(a, b);
        // Mixed seeds should differ in many bits, not just the low ones
        assert!((a ^ b).count_ones() > 10);
    }

    #[test]
    fn test_indices_in_range() {
        let mut rng = trial_rng(7, 0);
        let idx = draw_indices(50, &mut rng).unwrap();
        assert_eq!(idx.len(), 50);
        assert!(idx.iter().all(|&i| i < 50));
    }

    #[test]
    fn test_zero_rows_rejected() {
        let mut rng = trial_rng(7, 0);
        let err = draw_indices(0, &mut rng).unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidSize { got: 0, .. }));
    }

    #[test]
    fn test_single_row() {
        let mut rng = trial_rng(7, 0);
        assert_eq!(draw_indices(1, &mut rng).unwrap(), vec![0]);
    }

    #[test]
    fn test_draws_with_replacement() {
        // Expected distinct fraction is 1 - (1 - 1/n)^n, about 0.632 for large n
        let n = 1000;
        let draws = 200;
        let mut total = 0.0;
        for t in 0..draws {
            let mut rng = trial_rng(2024, t);
            let idx = draw_indices(n, &mut rng).unwrap();
            total += distinct_count(&idx) as f64 / n as f64;
        }
        let mean_fraction = total / draws as f64;
        let expected = 1.0 - (1.0 - 1.0 / n as f64).powi(n as i32);
        assert!(
            (mean_fraction - expected).abs() < 0.01,
            "distinct fraction {mean_fraction} far from {expected}"
        );
        // Never a permutation in practice
        assert!(mean_fraction < 0.7);
    }

    #[test]
    fn test_trial_streams_reproducible() {
        let a = draw_indices(64, &mut trial_rng(99, 5)).unwrap();
        let b = draw_indices(64, &mut trial_rng(99, 5)).unwrap();
        let c = draw_indices(64, &mut trial_rng(99, 6)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_worker_streams_do_not_share_prefixes() {
        let workers = 8;
        let prefixes: Vec<Vec<u64>> = (0..workers)
            .map(|w| {
                let mut rng = worker_rng(123, w);
                (0..256).map(|_| rng.random::<u64>()).collect()
            })
            .collect();

        for a in 0..workers {
            for b in (a + 1)..workers {
                let shared = prefixes[a]
                    .iter()
                    .filter(|v| prefixes[b].contains(v))
                    .count();
                assert_eq!(shared, 0, "workers {a} and {b} share outputs");
            }
        }
    }

    #[test]
    fn test_worker_streams_uncorrelated() {
        let draws = 20_000;
        let uniforms = |w: usize| -> Vec<f64> {
            let mut rng = worker_rng(77, w);
            (0..draws).map(|_| rng.random::<f64>()).collect()
        };
        let a = uniforms(0);
        let b = uniforms(1);

        let mean = |v: &[f64]| v.iter().sum::<f64>() / v.len() as f64;
        let (ma, mb) = (mean(&a), mean(&b));
        let cov: f64 = a.iter().zip(&b).map(|(x, y)| (x - ma) * (y - mb)).sum();
        let va: f64 = a.iter().map(|x| (x - ma).powi(2)).sum();
        let vb: f64 = b.iter().map(|y| (y - mb).powi(2)).sum();
        let r = cov / (va * vb).sqrt();

        // SD of r under independence is 1/sqrt(draws) ~= 0.007
        assert!(r.abs() < 0.04, "cross correlation {r}");
    }

    #[test]
    fn test_worker_zero_is_master_stream() {
        let mut master = StreamRng::seed_from_u64(5);
        let mut w0 = worker_rng(5, 0);
        for _ in 0..16 {
            assert_eq!(master.random::<u64>(), w0.random::<u64>());
        }
    }

    #[test]
    fn test_distinct_count() {
        assert_eq!(distinct_count(&[0, 0, 2, 2, 1]), 3);
        assert_eq!(distinct_count(&[]), 0);
    }
}
