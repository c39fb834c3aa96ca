//! Output Formatting
//!
//! Human-readable output formatting for bootstrap reports.
//!
//! Generates terminal-friendly output with:
//! - Point estimate, standard error and bias per statistic
//! - Normal, percentile and BCa intervals
//! - A text histogram of the replicate distribution
//! - Repeated-simulation and execution-mode comparisons

use crate::commands::ModesComparison;
use bootci_report::{EstimateReport, HistogramBinReport, IntervalReport, Report, SimulationReport};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;
const HISTOGRAM_WIDTH: usize = 40;

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("bootci Results\n");
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push_str("\n\n");

    if let Some(source) = &report.meta.data_source {
        let _ = writeln!(output, "data: {}", source);
    }
    let cfg = &report.meta.config;
    let _ = writeln!(
        output,
        "seed: {}  mode: {}  streams: {}  nan policy: {}\n",
        cfg.seed, cfg.mode, cfg.streams, cfg.nan_policy
    );

    for estimate in &report.estimates {
        output.push_str(&format_estimate(estimate));
        output.push('\n');
    }

    if let Some(sim) = &report.simulation {
        output.push_str(&format_simulation(sim, report.estimates.first()));
        output.push('\n');
    }

    let summary = &report.summary;
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');
    let _ = writeln!(
        output,
        "{} estimate(s), {} replicates, {} excluded, {}",
        summary.estimates,
        summary.total_replicates,
        summary.excluded_replicates,
        format_duration(summary.total_duration_ms)
    );

    output
}

/// Format the sequential-vs-parallel comparison produced by `bootci modes`
pub fn format_modes_output(report: &Report, comparison: &ModesComparison) -> String {
    let mut output = format_human_output(report);

    output.push_str("\nExecution modes\n");
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');
    let _ = writeln!(
        output,
        "  sequential: {}   parallel ({} workers): {}   speedup: {:.2}x",
        format_duration(comparison.sequential_ms),
        comparison.workers,
        format_duration(comparison.parallel_ms),
        comparison.speedup()
    );
    let _ = writeln!(output, "  streams: {}", comparison.streams);
    if comparison.identical {
        output.push_str("  replicates: identical in both modes\n");
    } else {
        let _ = writeln!(
            output,
            "  replicates: differ (max |difference| {:.4e}); SE {:.4} vs {:.4}",
            comparison.max_abs_difference, comparison.sequential_se, comparison.parallel_se
        );
    }

    output
}

fn format_estimate(e: &EstimateReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", e.label);
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    let _ = writeln!(
        out,
        "  estimate: {:.4}  SE: {:.4}  bias: {:+.4}",
        e.point_estimate, e.standard_error, e.bias
    );
    let _ = writeln!(
        out,
        "  n = {}  B = {}  excluded: {}  time: {}",
        e.sample_size,
        e.iterations,
        e.excluded,
        format_duration(e.duration_ms)
    );
    out.push_str(&format_interval("normal", &e.normal_ci));
    out.push_str(&format_interval("percentile", &e.percentile_ci));
    if let Some(bca) = &e.bca_ci {
        out.push_str(&format_interval("BCa", bca));
    }
    if let Some(warning) = &e.warning {
        let _ = writeln!(out, "  warning: {}", warning);
    }
    if !e.histogram.is_empty() {
        out.push_str("  replicates:\n");
        out.push_str(&format_histogram(&e.histogram));
    }

    out
}

fn format_simulation(sim: &SimulationReport, bootstrap: Option<&EstimateReport>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Repeated simulation: {}", sim.population);
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    let _ = writeln!(
        out,
        "  {} samples of n = {}  time: {}",
        sim.trials,
        sim.sample_size,
        format_duration(sim.duration_ms)
    );
    let _ = writeln!(
        out,
        "  true SE: {:.4}  mean {}: {:.4}",
        sim.true_standard_error, sim.statistic, sim.mean_estimate
    );
    if let Some(e) = bootstrap {
        let _ = writeln!(
            out,
            "  bootstrap SE: {:.4}  (ratio to true SE: {:.3})",
            e.standard_error,
            e.standard_error / sim.true_standard_error
        );
    }
    if sim.excluded > 0 {
        let _ = writeln!(out, "  excluded: {} degenerate samples", sim.excluded);
    }
    if !sim.histogram.is_empty() {
        out.push_str("  sampling distribution:\n");
        out.push_str(&format_histogram(&sim.histogram));
    }

    out
}

fn format_interval(kind: &str, ci: &IntervalReport) -> String {
    format!(
        "  {} {:<11} [{:.4}, {:.4}]  width {:.4}\n",
        format_level(ci.level),
        kind,
        ci.lower,
        ci.upper,
        ci.width
    )
}

/// Render a confidence level as a percentage, e.g. `95%` or `97.5%`
fn format_level(level: f64) -> String {
    format!("{}%", (level * 1000.0).round() / 10.0)
}

fn format_histogram(bins: &[HistogramBinReport]) -> String {
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let mut out = String::new();
    for bin in bins {
        let bar = bin.count * HISTOGRAM_WIDTH / max;
        let _ = writeln!(
            out,
            "    [{:>9.4}, {:>9.4}) {:<width$} {}",
            bin.lower,
            bin.upper,
            "#".repeat(bar),
            bin.count,
            width = HISTOGRAM_WIDTH
        );
    }
    out
}

/// Format a duration in milliseconds with an appropriate unit
pub fn format_duration(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.0} us", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{:.1} ms", ms)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}
