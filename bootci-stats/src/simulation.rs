//! Repeated Simulation
//!
//! The idealized counterpart of the bootstrap: when the population is known,
//! the sampling distribution of a statistic can be observed directly by
//! drawing many fresh samples from it. The standard deviation of those
//! estimates is the true standard error the bootstrap tries to approximate.

use crate::aggregate::NanPolicy;
use crate::dataset::Dataset;
use crate::error::{BootstrapError, StatisticError};
use crate::execution::{execute, TrialPlan};
use crate::replicates::ReplicateSet;
use crate::resampler::StreamRng;
use crate::statistic::Statistic;
use rand::Rng;
use rand_distr::StandardNormal;

/// A distribution datasets can be drawn from
pub trait Population: Send + Sync {
    /// Draw a dataset of `n` independent rows
    fn draw(&self, n: usize, rng: &mut StreamRng) -> Result<Dataset, BootstrapError>;

    /// Short description for logs and reports
    fn describe(&self) -> String;
}

/// Bivariate normal population of `(x, y)` pairs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BivariateNormal {
    rho: f64,
    mean_x: f64,
    mean_y: f64,
    sd_x: f64,
    sd_y: f64,
}

impl BivariateNormal {
    /// Standard margins with correlation `rho`
    pub fn new(rho: f64) -> Result<Self, BootstrapError> {
        Self::with_params(rho, 0.0, 0.0, 1.0, 1.0)
    }

    /// Fully parameterized population.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `|rho| > 1` or either standard deviation is not
    /// positive.
    pub fn with_params(
        rho: f64,
        mean_x: f64,
        mean_y: f64,
        sd_x: f64,
        sd_y: f64,
    ) -> Result<Self, BootstrapError> {
        if !(-1.0..=1.0).contains(&rho) {
            return Err(BootstrapError::InvalidParameter(format!(
                "correlation must be in [-1, 1], got {rho}"
            )));
        }
        if !(sd_x > 0.0 && sd_y > 0.0) {
            return Err(BootstrapError::InvalidParameter(format!(
                "standard deviations must be positive, got {sd_x} and {sd_y}"
            )));
        }
        if !(mean_x.is_finite() && mean_y.is_finite()) {
            return Err(BootstrapError::InvalidParameter(
                "means must be finite".to_string(),
            ));
        }
        Ok(Self {
            rho,
            mean_x,
            mean_y,
            sd_x,
            sd_y,
        })
    }

    /// Population correlation
    pub fn rho(&self) -> f64 {
        self.rho
    }
}

impl Population for BivariateNormal {
    fn draw(&self, n: usize, rng: &mut StreamRng) -> Result<Dataset, BootstrapError> {
        let residual = (1.0 - self.rho * self.rho).sqrt();
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);

        for _ in 0..n {
            let z1: f64 = rng.sample(StandardNormal);
            let z2: f64 = rng.sample(StandardNormal);
            x.push(self.mean_x + self.sd_x * z1);
            y.push(self.mean_y + self.sd_y * (self.rho * z1 + residual * z2));
        }

        Ok(Dataset::paired(x, y)?)
    }

    fn describe(&self) -> String {
        format!(
            "bivariate normal (rho = {}, means = ({}, {}), sds = ({}, {}))",
            self.rho, self.mean_x, self.mean_y, self.sd_x, self.sd_y
        )
    }
}

/// Draw `trials` fresh samples of size `n` from `population` and evaluate
/// `statistic` on each.
///
/// Runs through the same execution strategy as the bootstrap, so the plan's
/// seed, mode, stream derivation and NaN policy apply unchanged.
pub fn simulate_sampling_distribution<P, S>(
    population: &P,
    n: usize,
    statistic: &S,
    trials: usize,
    plan: &TrialPlan,
) -> Result<ReplicateSet, BootstrapError>
where
    P: Population + ?Sized,
    S: Statistic + ?Sized,
{
    if n == 0 {
        return Err(BootstrapError::InvalidSize {
            what: "sample size",
            got: 0,
            min: 1,
        });
    }

    tracing::debug!(
        population = %population.describe(),
        n,
        trials,
        mode = %plan.mode,
        "starting repeated simulation"
    );

    let indices: Vec<usize> = (0..n).collect();
    let values = execute(
        trials,
        plan,
        || (),
        |trial, rng, _| {
            let sample = population.draw(n, rng)?;
            let reason = match statistic.evaluate(&sample.resample(&indices)) {
                Ok(value) if value.is_finite() => return Ok(value),
                Ok(value) => format!("statistic returned {value}"),
                Err(StatisticError::Degenerate(reason)) => reason,
                Err(other) => return Err(other.into()),
            };
            match plan.nan_policy {
                NanPolicy::Exclude => Ok(f64::NAN),
                NanPolicy::FailFast => Err(BootstrapError::DegenerateInput {
                    trial: Some(trial),
                    seed: plan.seed,
                    reason,
                    indices: None,
                }),
            }
        },
    )?;

    Ok(ReplicateSet::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resampler::trial_rng;
    use crate::statistic::{Correlation, Mean};

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(BivariateNormal::new(1.5).is_err());
        assert!(BivariateNormal::new(f64::NAN).is_err());
        assert!(BivariateNormal::with_params(0.5, 0.0, 0.0, 0.0, 1.0).is_err());
        assert!(BivariateNormal::new(-1.0).is_ok());
    }

    #[test]
    fn test_draw_shape_and_moments() {
        let pop = BivariateNormal::with_params(0.6, 10.0, -2.0, 2.0, 0.5).unwrap();
        let ds = pop.draw(20_000, &mut trial_rng(1, 0)).unwrap();
        assert_eq!(ds.n_rows(), 20_000);

        let x = ds.column("x").unwrap();
        let y = ds.column("y").unwrap();
        let mx = x.iter().sum::<f64>() / x.len() as f64;
        let my = y.iter().sum::<f64>() / y.len() as f64;
        assert!((mx - 10.0).abs() < 0.1);
        assert!((my + 2.0).abs() < 0.05);

        let all = ds.full_indices();
        let r = Correlation::new("x", "y")
            .evaluate(&ds.resample(&all))
            .unwrap();
        assert!((r - 0.6).abs() < 0.03, "r = {r}");
    }

    #[test]
    fn test_sampling_distribution_of_mean() {
        let pop = BivariateNormal::new(0.0).unwrap();
        let set = simulate_sampling_distribution(
            &pop,
            25,
            &Mean::new("x"),
            2000,
            &TrialPlan::sequential(5),
        )
        .unwrap();
        assert_eq!(set.len(), 2000);
        // True SE of the mean is 1 / sqrt(25)
        assert!((set.std_dev() - 0.2).abs() < 0.02);
        assert!(set.mean().abs() < 0.02);
    }

    #[test]
    fn test_simulation_identical_across_modes() {
        let pop = BivariateNormal::new(0.6).unwrap();
        let stat = Correlation::new("x", "y");
        let seq =
            simulate_sampling_distribution(&pop, 32, &stat, 200, &TrialPlan::sequential(8)).unwrap();
        let par =
            simulate_sampling_distribution(&pop, 32, &stat, 200, &TrialPlan::parallel(8, 3)).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_zero_sample_size() {
        let pop = BivariateNormal::new(0.0).unwrap();
        let err = simulate_sampling_distribution(
            &pop,
            0,
            &Mean::new("x"),
            10,
            &TrialPlan::sequential(0),
        )
        .unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidSize { what: "sample size", .. }));
    }
}
