//! Repeated simulation versus bootstrap (`bootci simulate`).
//!
//! First the idealized scenario: many fresh samples from a known bivariate
//! normal population give the true sampling distribution of the statistic.
//! Then the practical one: a single sample from the same population is
//! bootstrapped, and its standard error is set against the true one.

use super::emit;
use crate::SimulateArgs;
use crate::config::BootConfig;
use crate::formatting::format_human_output;
use crate::metadata::build_report_meta;
use crate::progress::with_progress;
use crate::settings::Settings;
use bootci_report::{EstimateReport, Report, SimulationReport};
use bootci_stats::{
    BivariateNormal, BootstrapConfig, Population, StreamRng, TrialPlan, compute_bootstrap,
    counter_rng_seed, simulate_sampling_distribution,
};
use rand::SeedableRng;
use std::time::Instant;

/// Stream counter reserved for the observed sample; simulation trials use 0..trials
const OBSERVED_SAMPLE_STREAM: u64 = u64::MAX;

/// Simulate the sampling distribution, bootstrap one observed sample, and emit both
pub fn run_simulation(args: &SimulateArgs, config: &BootConfig) -> anyhow::Result<()> {
    let settings = Settings::resolve(config, &args.boot, &args.out)?;
    let rho = args.rho.unwrap_or(config.simulation.rho);
    let n = args.sample_size.unwrap_or(config.simulation.sample_size);
    let trials = args.trials.unwrap_or(config.simulation.trials);

    let population = BivariateNormal::new(rho)?;
    let statistic = args.statistic.build("x", "y");
    let label = args.statistic.label("x", "y");

    tracing::info!(
        rho,
        n,
        trials,
        mode = %settings.mode,
        "simulating sampling distribution of {}",
        label
    );

    let start = Instant::now();
    let simulated = with_progress("simulate", trials, |progress| {
        let plan = TrialPlan {
            progress: Some(progress),
            ..settings.trial_plan()
        };
        simulate_sampling_distribution(&population, n, statistic.as_ref(), trials, &plan)
    })?;
    let simulation_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut rng = StreamRng::seed_from_u64(counter_rng_seed(settings.seed, OBSERVED_SAMPLE_STREAM));
    let observed = population.draw(n, &mut rng)?;

    let start = Instant::now();
    let result = with_progress("bootstrap", settings.iterations, |progress| {
        let boot_config = BootstrapConfig {
            progress: Some(progress),
            ..settings.bootstrap_config()
        };
        compute_bootstrap(&observed, statistic.as_ref(), &boot_config)
    })?;
    let bootstrap_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        true_se = simulated.std_dev(),
        bootstrap_se = result.standard_error,
        "simulation complete"
    );

    let simulation = SimulationReport::from_replicates(
        population.describe(),
        statistic.name(),
        n,
        &simulated,
        settings.histogram_bins,
        simulation_ms,
    );
    let estimate = EstimateReport::from_result(
        format!("{} [one sample]", label),
        &result,
        settings.histogram_bins,
        bootstrap_ms,
    );
    let meta = build_report_meta(&settings, Some(population.describe()));
    let report = Report::new(meta, vec![estimate], Some(simulation));

    emit(&report, &settings, format_human_output)
}
