//! Report Data Structures

use bootci_stats::{BootstrapResult, ConfidenceInterval, ReplicateSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current report schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Complete bootstrap report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub estimates: Vec<EstimateReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationReport>,
    pub summary: ReportSummary,
}

impl Report {
    /// Build a report and derive its summary from the estimates
    pub fn new(
        meta: ReportMeta,
        estimates: Vec<EstimateReport>,
        simulation: Option<SimulationReport>,
    ) -> Self {
        let summary = ReportSummary::from_estimates(&estimates);
        Self {
            meta,
            estimates,
            simulation,
            summary,
        }
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub data_source: Option<String>,
    pub system: SystemInfo,
    pub config: ReportConfig,
}

/// Run configuration captured in report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub iterations: usize,
    pub confidence_level: f64,
    pub seed: u64,
    pub mode: String,
    pub workers: usize,
    pub streams: String,
    pub nan_policy: String,
    pub bca: bool,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
}

/// Confidence interval bounds as reported
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalReport {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
    pub width: f64,
}

impl From<&ConfidenceInterval> for IntervalReport {
    fn from(ci: &ConfidenceInterval) -> Self {
        Self {
            lower: ci.lower,
            upper: ci.upper,
            level: ci.level,
            width: ci.width(),
        }
    }
}

/// One histogram bin of the replicate distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBinReport {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bootstrap estimate for one statistic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateReport {
    /// Display label, e.g. `correlation(x, y)`
    pub label: String,
    /// Statistic name
    pub statistic: String,
    pub sample_size: usize,
    pub iterations: usize,
    pub point_estimate: f64,
    pub standard_error: f64,
    pub bias: f64,
    pub replicate_mean: f64,
    pub normal_ci: IntervalReport,
    pub percentile_ci: IntervalReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bca_ci: Option<IntervalReport>,
    pub excluded: usize,
    /// Histogram of replicates (empty when disabled)
    #[serde(default)]
    pub histogram: Vec<HistogramBinReport>,
    pub duration_ms: f64,
    pub warning: Option<String>,
}

impl EstimateReport {
    /// Build from a bootstrap result, with a `bins`-bin histogram (0 = none)
    pub fn from_result(
        label: impl Into<String>,
        result: &BootstrapResult,
        bins: usize,
        duration_ms: f64,
    ) -> Self {
        Self {
            label: label.into(),
            statistic: result.statistic.clone(),
            sample_size: result.sample_size,
            iterations: result.iterations(),
            point_estimate: result.point_estimate,
            standard_error: result.standard_error,
            bias: result.bias,
            replicate_mean: result.replicate_mean,
            normal_ci: (&result.normal_ci).into(),
            percentile_ci: (&result.percentile_ci).into(),
            bca_ci: result.bca_ci.as_ref().map(IntervalReport::from),
            excluded: result.excluded,
            histogram: histogram_bins(&result.replicates, bins),
            duration_ms,
            warning: result.warning.clone(),
        }
    }
}

fn histogram_bins(replicates: &ReplicateSet, bins: usize) -> Vec<HistogramBinReport> {
    replicates
        .histogram(bins)
        .bins
        .iter()
        .map(|b| HistogramBinReport {
            lower: b.lower,
            upper: b.upper,
            count: b.count,
        })
        .collect()
}

/// Repeated simulation from a known population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub population: String,
    pub statistic: String,
    pub sample_size: usize,
    pub trials: usize,
    /// Standard deviation of the simulated estimates
    pub true_standard_error: f64,
    pub mean_estimate: f64,
    pub excluded: usize,
    #[serde(default)]
    pub histogram: Vec<HistogramBinReport>,
    pub duration_ms: f64,
}

impl SimulationReport {
    /// Build from the simulated sampling distribution
    pub fn from_replicates(
        population: impl Into<String>,
        statistic: impl Into<String>,
        sample_size: usize,
        replicates: &ReplicateSet,
        bins: usize,
        duration_ms: f64,
    ) -> Self {
        Self {
            population: population.into(),
            statistic: statistic.into(),
            sample_size,
            trials: replicates.len(),
            true_standard_error: replicates.std_dev(),
            mean_estimate: replicates.mean(),
            excluded: replicates.non_finite_count(),
            histogram: histogram_bins(replicates, bins),
            duration_ms,
        }
    }
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub estimates: usize,
    pub total_replicates: usize,
    pub excluded_replicates: usize,
    pub warnings: usize,
    pub total_duration_ms: f64,
}

impl ReportSummary {
    /// Totals over a set of estimates
    pub fn from_estimates(estimates: &[EstimateReport]) -> Self {
        estimates.iter().fold(Self::default(), |mut acc, e| {
            acc.estimates += 1;
            acc.total_replicates += e.iterations;
            acc.excluded_replicates += e.excluded;
            acc.warnings += usize::from(e.warning.is_some());
            acc.total_duration_ms += e.duration_ms;
            acc
        })
    }
}
