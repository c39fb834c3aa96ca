//! Single-dataset bootstrap (`bootci run`).

use super::emit;
use crate::RunArgs;
use crate::config::BootConfig;
use crate::data::load_csv_dataset;
use crate::formatting::format_human_output;
use crate::metadata::build_report_meta;
use crate::progress::with_progress;
use crate::settings::Settings;
use anyhow::Context;
use bootci_report::{EstimateReport, Report};
use bootci_stats::{BootstrapConfig, Dataset, compute_bootstrap};
use std::path::Path;
use std::time::Instant;

/// Load the dataset named by `--data`
pub(crate) fn load_data(args: &RunArgs) -> anyhow::Result<(Dataset, &Path)> {
    let path = args
        .data
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--data <FILE> is required"))?;
    let dataset =
        load_csv_dataset(path).with_context(|| format!("failed to load {}", path.display()))?;
    Ok((dataset, path))
}

/// Bootstrap the selected statistic over a CSV dataset and emit the report
pub fn run_bootstrap(args: &RunArgs, config: &BootConfig) -> anyhow::Result<()> {
    let settings = Settings::resolve(config, &args.boot, &args.out)?;
    let (dataset, path) = load_data(args)?;
    let statistic = args.statistic.build(&args.x, &args.y);
    let label = args.statistic.label(&args.x, &args.y);

    tracing::info!(
        rows = dataset.n_rows(),
        iterations = settings.iterations,
        mode = %settings.mode,
        "bootstrapping {}",
        label
    );

    let start = Instant::now();
    let result = with_progress(&label, settings.iterations, |progress| {
        let boot_config = BootstrapConfig {
            progress: Some(progress),
            ..settings.bootstrap_config()
        };
        compute_bootstrap(&dataset, statistic.as_ref(), &boot_config)
    })
    .with_context(|| format!("bootstrap of {} failed", label))?;
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    if let Some(warning) = &result.warning {
        tracing::warn!("{}", warning);
    }

    let estimate =
        EstimateReport::from_result(label, &result, settings.histogram_bins, duration_ms);
    let meta = build_report_meta(&settings, Some(path.display().to_string()));
    let report = Report::new(meta, vec![estimate], None);

    emit(&report, &settings, format_human_output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BootstrapOpts, OutputOpts, StatisticKind};
    use std::io::Write;

    fn write_dataset(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "a,b").unwrap();
        for i in 0..20 {
            writeln!(file, "{},{}", i, (i * 3) % 7).unwrap();
        }
        path
    }

    #[test]
    fn test_run_writes_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let data = write_dataset(dir.path());
        let out = dir.path().join("out").join("report.json");

        let args = RunArgs {
            data: Some(data),
            statistic: StatisticKind::Mean,
            x: "a".to_string(),
            y: "b".to_string(),
            boot: BootstrapOpts {
                iterations: Some(200),
                workers: Some(2),
                ..Default::default()
            },
            out: OutputOpts {
                format: Some("json".to_string()),
                output: Some(out.clone()),
            },
        };
        run_bootstrap(&args, &BootConfig::default()).unwrap();

        let report =
            bootci_report::parse_json_report(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(report.estimates.len(), 1);
        assert_eq!(report.estimates[0].label, "mean(a)");
        assert_eq!(report.estimates[0].iterations, 200);
        assert!((report.estimates[0].point_estimate - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_run_requires_data() {
        let err = run_bootstrap(&RunArgs::default(), &BootConfig::default()).unwrap_err();
        assert!(err.to_string().contains("--data"));
    }

    #[test]
    fn test_run_unknown_column() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            data: Some(write_dataset(dir.path())),
            x: "a".to_string(),
            y: "missing".to_string(),
            boot: BootstrapOpts {
                iterations: Some(50),
                workers: Some(1),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = run_bootstrap(&args, &BootConfig::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown column 'missing'"));
    }
}
