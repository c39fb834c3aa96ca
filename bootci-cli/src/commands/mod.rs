//! Command Implementations
//!
//! Each computing command follows the same pipeline:
//!
//! ```text
//! bootci.toml + CLI flags
//!       │
//!       ▼
//! ┌─────────────┐
//! │  settings   │  Layer config file and flags
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   compute   │  Bootstrap / simulation with a progress bar
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build Report, render human / JSON / CSV
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`run`] - Single-dataset bootstrap
//! - [`simulate`] - Repeated simulation versus bootstrap
//! - [`modes`] - Sequential versus parallel execution

mod modes;
mod run;
mod simulate;

pub use modes::{ModesComparison, compare_modes};
pub use run::run_bootstrap;
pub use simulate::run_simulation;

use crate::config::BootConfig;
use crate::settings::Settings;
use bootci_report::{OutputFormat, Report, generate_csv_report, generate_json_report};
use std::io::Write;
use std::path::Path;

/// Print the default configuration, or write it to `output`
pub fn init_config(output: Option<&Path>) -> anyhow::Result<()> {
    let toml = BootConfig::default_toml();
    match output {
        Some(path) => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            std::fs::write(path, toml)?;
            println!("Configuration written to: {}", path.display());
        }
        None => print!("{}", toml),
    }
    Ok(())
}

/// Render `report` in the configured format and write it out
fn emit(
    report: &Report,
    settings: &Settings,
    human: impl FnOnce(&Report) -> String,
) -> anyhow::Result<()> {
    let output = match settings.format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Csv => generate_csv_report(report),
        OutputFormat::Human => human(report),
    };

    if let Some(ref path) = settings.output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        tracing::info!(path = %path.display(), "report written");
    } else {
        print!("{}", output);
    }

    Ok(())
}
