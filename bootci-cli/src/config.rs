//! Configuration loading from bootci.toml
//!
//! Run defaults can be specified in a `bootci.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up by [`BootConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "bootci.toml";

/// bootci configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Repeated-simulation configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Runner configuration for bootstrap execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of bootstrap replicates
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Confidence level (e.g., 0.95 for 95%)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Master seed
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Worker threads: 0 = all cores, 1 = sequential
    #[serde(default)]
    pub workers: usize,
    /// Stream derivation: "per-trial" or "per-worker"
    #[serde(default = "default_streams")]
    pub streams: String,
    /// NaN policy: "fail-fast" or "exclude"
    #[serde(default = "default_nan_policy")]
    pub nan_policy: String,
    /// Also compute BCa intervals
    #[serde(default)]
    pub bca: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            confidence_level: default_confidence_level(),
            seed: default_seed(),
            workers: 0,
            streams: default_streams(),
            nan_policy: default_nan_policy(),
            bca: false,
        }
    }
}

fn default_iterations() -> usize {
    bootci_stats::DEFAULT_ITERATIONS
}
fn default_confidence_level() -> f64 {
    bootci_stats::DEFAULT_CONFIDENCE_LEVEL
}
fn default_seed() -> u64 {
    bootci_stats::DEFAULT_SEED
}
fn default_streams() -> String {
    "per-trial".to_string()
}
fn default_nan_policy() -> String {
    "fail-fast".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Histogram bins for replicate diagnostics (0 = none)
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Directory for reports written with a relative `--output`
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            histogram_bins: default_histogram_bins(),
            directory: None,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_histogram_bins() -> usize {
    20
}

/// Repeated-simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Population correlation
    #[serde(default = "default_rho")]
    pub rho: f64,
    /// Rows per simulated sample
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Number of simulated samples
    #[serde(default = "default_trials")]
    pub trials: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rho: default_rho(),
            sample_size: default_sample_size(),
            trials: default_trials(),
        }
    }
}

fn default_rho() -> f64 {
    0.6
}
fn default_sample_size() -> usize {
    32
}
fn default_trials() -> usize {
    10_000
}

impl BootConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for `bootci.toml`
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => {
                        tracing::debug!(path = %config_path.display(), "loaded configuration");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring invalid configuration");
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# bootci Configuration

[runner]
# Bootstrap replicates (B)
iterations = 10000
# Confidence level (0.0 to 1.0, exclusive)
confidence_level = 0.95
# Master seed; identical seeds give identical replicates
seed = 24301
# Worker threads: 0 = all cores, 1 = sequential
workers = 0
# Random streams: "per-trial" (identical in every mode) or "per-worker"
streams = "per-trial"
# Degenerate replicates: "fail-fast" or "exclude"
nan_policy = "fail-fast"
# Also compute BCa intervals
bca = false

[output]
# Default output format: human, json, csv
format = "human"
# Histogram bins for replicate diagnostics (0 = none)
histogram_bins = 20
# Directory for reports written with a relative --output (uncomment to enable)
# directory = "target/bootci"

[simulation]
# Population correlation of the bivariate normal
rho = 0.6
# Rows per simulated sample
sample_size = 32
# Number of simulated samples
trials = 10000
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BootConfig::default();
        assert_eq!(config.runner.iterations, 10_000);
        assert_eq!(config.runner.workers, 0);
        assert_eq!(config.runner.streams, "per-trial");
        assert_eq!(config.output.format, "human");
        assert_eq!(config.simulation.sample_size, 32);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            iterations = 2000
            workers = 4

            [simulation]
            rho = 0.3
        "#;

        let config: BootConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.iterations, 2000);
        assert_eq!(config.runner.workers, 4);
        assert!((config.simulation.rho - 0.3).abs() < f64::EPSILON);
        // Defaults should still apply
        assert_eq!(config.runner.nan_policy, "fail-fast");
        assert_eq!(config.output.histogram_bins, 20);
        assert_eq!(config.simulation.trials, 10_000);
    }

    #[test]
    fn test_default_toml_parses() {
        let config: BootConfig = toml::from_str(&BootConfig::default_toml()).unwrap();
        assert_eq!(config.runner.seed, bootci_stats::DEFAULT_SEED);
        assert_eq!(config.runner.iterations, 10_000);
        assert!(!config.runner.bca);
        assert!(config.output.directory.is_none());
    }

    #[test]
    fn test_discover_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let mut file = std::fs::File::create(root.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[runner]\niterations = 123").unwrap();

        let config = BootConfig::discover_from(&nested).unwrap();
        assert_eq!(config.runner.iterations, 123);
    }

    #[test]
    fn test_invalid_file_is_ignored() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(CONFIG_FILE_NAME), "[runner\n").unwrap();
        assert!(BootConfig::discover_from(root.path()).is_none());
    }
}
