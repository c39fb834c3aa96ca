//! Effective run settings: bootci.toml values with CLI flags layered on top.

use crate::config::BootConfig;
use crate::{BootstrapOpts, OutputOpts};
use bootci_report::OutputFormat;
use bootci_stats::{
    BootstrapConfig, ExecutionMode, NanPolicy, StreamDerivation, TrialPlan,
    validate_confidence_level,
};
use std::path::PathBuf;

/// Fully resolved settings for one command
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bootstrap replicates B
    pub iterations: usize,
    /// Confidence level
    pub confidence_level: f64,
    /// Master seed
    pub seed: u64,
    /// Sequential or parallel
    pub mode: ExecutionMode,
    /// Random stream assignment
    pub streams: StreamDerivation,
    /// Degenerate replicate handling
    pub nan_policy: NanPolicy,
    /// Compute BCa intervals
    pub bca: bool,
    /// Histogram bins (0 = none)
    pub histogram_bins: usize,
    /// Output format
    pub format: OutputFormat,
    /// Output file (stdout if `None`)
    pub output: Option<PathBuf>,
}

impl Settings {
    /// Settings from the configuration file alone
    pub fn from_config(config: &BootConfig) -> anyhow::Result<Self> {
        Ok(Self {
            iterations: config.runner.iterations,
            confidence_level: config.runner.confidence_level,
            seed: config.runner.seed,
            mode: ExecutionMode::from_workers(config.runner.workers),
            streams: parse_option(&config.runner.streams, "runner.streams")?,
            nan_policy: parse_option(&config.runner.nan_policy, "runner.nan_policy")?,
            bca: config.runner.bca,
            histogram_bins: config.output.histogram_bins,
            format: parse_option(&config.output.format, "output.format")?,
            output: None,
        })
    }

    /// Layer: bootci.toml defaults, then CLI overrides
    pub fn resolve(
        config: &BootConfig,
        boot: &BootstrapOpts,
        out: &OutputOpts,
    ) -> anyhow::Result<Self> {
        let mut settings = Self::from_config(config)?;

        if let Some(iterations) = boot.iterations {
            settings.iterations = iterations;
        }
        if let Some(level) = boot.confidence {
            settings.confidence_level = level;
        }
        if let Some(seed) = boot.seed {
            settings.seed = seed;
        }
        if let Some(workers) = boot.workers {
            settings.mode = ExecutionMode::from_workers(workers);
        }
        if let Some(streams) = &boot.streams {
            settings.streams = parse_option(streams, "--streams")?;
        }
        if let Some(policy) = &boot.nan_policy {
            settings.nan_policy = parse_option(policy, "--nan-policy")?;
        }
        settings.bca |= boot.bca;
        if let Some(bins) = boot.bins {
            settings.histogram_bins = bins;
        }
        if let Some(format) = &out.format {
            settings.format = parse_option(format, "--format")?;
        }

        settings.output = out.output.as_ref().map(|path| {
            match &config.output.directory {
                Some(dir) if path.is_relative() => PathBuf::from(dir).join(path),
                _ => path.clone(),
            }
        });

        validate_confidence_level(settings.confidence_level)?;

        Ok(settings)
    }

    /// Library configuration for a bootstrap run
    pub fn bootstrap_config(&self) -> BootstrapConfig {
        BootstrapConfig {
            iterations: self.iterations,
            confidence_level: self.confidence_level,
            seed: self.seed,
            mode: self.mode,
            streams: self.streams,
            nan_policy: self.nan_policy,
            bca: self.bca,
            ..Default::default()
        }
    }

    /// Execution plan for a repeated simulation
    pub fn trial_plan(&self) -> TrialPlan {
        self.bootstrap_config().plan()
    }
}

fn parse_option<T>(value: &str, what: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{what}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let mut config = BootConfig::default();
        config.runner.iterations = 500;
        config.runner.workers = 1;

        let boot = BootstrapOpts {
            iterations: Some(2000),
            workers: Some(3),
            nan_policy: Some("exclude".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&config, &boot, &OutputOpts::default()).unwrap();
        assert_eq!(settings.iterations, 2000);
        assert_eq!(settings.mode, ExecutionMode::Parallel { workers: 3 });
        assert_eq!(settings.nan_policy, NanPolicy::Exclude);
        assert_eq!(settings.format, OutputFormat::Human);
    }

    #[test]
    fn test_config_used_when_flag_absent() {
        let mut config = BootConfig::default();
        config.runner.workers = 1;
        config.runner.streams = "per-worker".to_string();

        let settings =
            Settings::resolve(&config, &BootstrapOpts::default(), &OutputOpts::default()).unwrap();
        assert_eq!(settings.mode, ExecutionMode::Sequential);
        assert_eq!(settings.streams, StreamDerivation::PerWorker);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = BootConfig::default();
        let boot = BootstrapOpts {
            streams: Some("shared".to_string()),
            ..Default::default()
        };
        assert!(Settings::resolve(&config, &boot, &OutputOpts::default()).is_err());

        let boot = BootstrapOpts {
            confidence: Some(1.2),
            ..Default::default()
        };
        let err = Settings::resolve(&config, &boot, &OutputOpts::default()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<bootci_stats::BootstrapError>(),
            Some(&bootci_stats::BootstrapError::InvalidConfidenceLevel(1.2))
        );
    }

    #[test]
    fn test_output_directory() {
        let mut config = BootConfig::default();
        config.output.directory = Some("reports".to_string());
        let out = OutputOpts {
            format: Some("json".to_string()),
            output: Some(PathBuf::from("run.json")),
        };
        let settings = Settings::resolve(&config, &BootstrapOpts::default(), &out).unwrap();
        assert_eq!(settings.output, Some(PathBuf::from("reports/run.json")));
        assert_eq!(settings.format, OutputFormat::Json);
    }
}
