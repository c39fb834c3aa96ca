//! System Metadata Collection
//!
//! Collects system information for report metadata. The CPU model is read
//! from `/proc/cpuinfo` on Linux and reported as "Unknown" elsewhere.

use crate::settings::Settings;
use bootci_report::{ReportConfig, ReportMeta, SCHEMA_VERSION, SystemInfo};
use chrono::Utc;

/// Build report metadata for a run with the given settings
pub fn build_report_meta(settings: &Settings, data_source: Option<String>) -> ReportMeta {
    let system = SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu: get_cpu_model().unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores: num_cpus(),
    };

    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        data_source,
        system,
        config: ReportConfig {
            iterations: settings.iterations,
            confidence_level: settings.confidence_level,
            seed: settings.seed,
            mode: settings.mode.to_string(),
            workers: settings.mode.workers(),
            streams: settings.streams.to_string(),
            nan_policy: settings.nan_policy.to_string(),
            bca: settings.bca,
        },
    }
}

/// Get CPU model name from /proc/cpuinfo (Linux only)
fn get_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("model name"))
                    .and_then(|l| l.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

fn num_cpus() -> u32 {
    u32::try_from(bootci_stats::available_workers()).unwrap_or(u32::MAX)
}
