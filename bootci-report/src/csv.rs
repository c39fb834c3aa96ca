//! CSV Output
//!
//! One row per estimate. Intervals are flattened into `*_lower` / `*_upper`
//! columns; an absent BCa interval leaves its cells empty.

use crate::report::Report;
use std::fmt::Write;

const HEADER: &str = "label,statistic,sample_size,iterations,point_estimate,standard_error,\
bias,normal_lower,normal_upper,percentile_lower,percentile_upper,bca_lower,bca_upper,\
confidence_level,excluded,duration_ms";

/// Generate a CSV report
pub fn generate_csv_report(report: &Report) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    for e in &report.estimates {
        let (bca_lower, bca_upper) = match &e.bca_ci {
            Some(ci) => (ci.lower.to_string(), ci.upper.to_string()),
            None => (String::new(), String::new()),
        };
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{:.3}",
            escape(&e.label),
            escape(&e.statistic),
            e.sample_size,
            e.iterations,
            e.point_estimate,
            e.standard_error,
            e.bias,
            e.normal_ci.lower,
            e.normal_ci.upper,
            e.percentile_ci.lower,
            e.percentile_ci.upper,
            bca_lower,
            bca_upper,
            e.percentile_ci.level,
            e.excluded,
            e.duration_ms,
        );
    }

    out
}

/// Quote a field containing separators, quotes or newlines
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
