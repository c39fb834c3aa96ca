//! Sequential versus parallel execution (`bootci modes`).

use super::emit;
use super::run::load_data;
use crate::RunArgs;
use crate::config::BootConfig;
use crate::formatting::format_modes_output;
use crate::metadata::build_report_meta;
use crate::progress::with_progress;
use crate::settings::Settings;
use anyhow::Context;
use bootci_report::{EstimateReport, Report};
use bootci_stats::{
    BootstrapConfig, BootstrapResult, Dataset, ExecutionMode, Statistic, StreamDerivation,
    available_workers, compute_bootstrap,
};
use std::time::Instant;

/// Outcome of running one bootstrap in both execution modes
#[derive(Debug, Clone)]
pub struct ModesComparison {
    /// Stream derivation used by both runs
    pub streams: StreamDerivation,
    /// Workers in the parallel run
    pub workers: usize,
    /// Wall time of the sequential run
    pub sequential_ms: f64,
    /// Wall time of the parallel run
    pub parallel_ms: f64,
    /// Whether every replicate matched bit for bit
    pub identical: bool,
    /// Largest absolute difference between paired replicates
    pub max_abs_difference: f64,
    /// Standard error from the sequential run
    pub sequential_se: f64,
    /// Standard error from the parallel run
    pub parallel_se: f64,
}

impl ModesComparison {
    /// Compare two runs of the same bootstrap
    pub fn new(
        streams: StreamDerivation,
        workers: usize,
        sequential: (&BootstrapResult, f64),
        parallel: (&BootstrapResult, f64),
    ) -> Self {
        let (seq, sequential_ms) = sequential;
        let (par, parallel_ms) = parallel;
        let a = seq.replicates.values();
        let b = par.replicates.values();

        let identical =
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits());
        let max_abs_difference = a
            .iter()
            .zip(b)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max);

        Self {
            streams,
            workers,
            sequential_ms,
            parallel_ms,
            identical,
            max_abs_difference,
            sequential_se: seq.standard_error,
            parallel_se: par.standard_error,
        }
    }

    /// Sequential time over parallel time
    pub fn speedup(&self) -> f64 {
        if self.parallel_ms > 0.0 {
            self.sequential_ms / self.parallel_ms
        } else {
            f64::NAN
        }
    }
}

/// Run the same bootstrap sequentially and in parallel, then report both
pub fn compare_modes(args: &RunArgs, config: &BootConfig) -> anyhow::Result<()> {
    let settings = Settings::resolve(config, &args.boot, &args.out)?;
    let (dataset, path) = load_data(args)?;
    let statistic = args.statistic.build(&args.x, &args.y);
    let label = args.statistic.label(&args.x, &args.y);

    // A sequential configuration still needs something to compare against
    let workers = match settings.mode {
        ExecutionMode::Sequential => available_workers().max(2),
        ExecutionMode::Parallel { workers } => workers,
    };
    let parallel = ExecutionMode::Parallel { workers };

    let (seq, seq_ms) = timed_run(&settings, &dataset, statistic.as_ref(), ExecutionMode::Sequential)
        .with_context(|| format!("sequential bootstrap of {} failed", label))?;
    let (par, par_ms) = timed_run(&settings, &dataset, statistic.as_ref(), parallel)
        .with_context(|| format!("parallel bootstrap of {} failed", label))?;

    let comparison = ModesComparison::new(settings.streams, workers, (&seq, seq_ms), (&par, par_ms));
    tracing::info!(
        workers,
        identical = comparison.identical,
        speedup = comparison.speedup(),
        "mode comparison complete"
    );
    if settings.streams == StreamDerivation::PerTrial && !comparison.identical {
        tracing::warn!("per-trial streams produced different replicates across modes");
    }

    let estimates = vec![
        EstimateReport::from_result(
            format!("{} [sequential]", label),
            &seq,
            settings.histogram_bins,
            seq_ms,
        ),
        EstimateReport::from_result(
            format!("{} [{}]", label, parallel),
            &par,
            settings.histogram_bins,
            par_ms,
        ),
    ];
    let meta = build_report_meta(&settings, Some(path.display().to_string()));
    let report = Report::new(meta, estimates, None);

    emit(&report, &settings, |r| format_modes_output(r, &comparison))
}

fn timed_run(
    settings: &Settings,
    dataset: &Dataset,
    statistic: &dyn Statistic,
    mode: ExecutionMode,
) -> anyhow::Result<(BootstrapResult, f64)> {
    let start = Instant::now();
    let result = with_progress(&mode.to_string(), settings.iterations, |progress| {
        let config = BootstrapConfig {
            mode,
            progress: Some(progress),
            ..settings.bootstrap_config()
        };
        compute_bootstrap(dataset, statistic, &config)
    })?;
    Ok((result, start.elapsed().as_secs_f64() * 1000.0))
}
