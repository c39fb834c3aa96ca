//! CSV dataset loading.
//!
//! Expected layout: a header row naming the columns, then one comma-separated
//! row of numeric cells per observation. Blank lines and lines starting with
//! `#` are skipped.
//!
//! ```csv
//! # height, weight
//! x,y
//! 1.72,68.1
//! 1.65,59.4
//! ```

use bootci_stats::{Dataset, DatasetError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors from loading a dataset file
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error reading file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse error at a specific line.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Description of the parse error.
        message: String,
    },

    /// A cell that is not a number.
    #[error("invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        /// Line number where the invalid value was found (1-indexed).
        line: usize,
        /// Column header of the cell.
        column: String,
        /// The invalid value string.
        value: String,
    },

    /// The file has no header row.
    #[error("missing header row")]
    MissingHeader,

    /// The header row is unusable as a dataset.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Load a dataset from a CSV file
pub fn load_csv_dataset(path: &Path) -> Result<Dataset, DataError> {
    let file = File::open(path)?;
    let dataset = parse_csv_dataset(BufReader::new(file))?;
    tracing::debug!(
        path = %path.display(),
        rows = dataset.n_rows(),
        columns = dataset.column_names().len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Parse a dataset from any buffered reader
pub fn parse_csv_dataset(reader: impl BufRead) -> Result<Dataset, DataError> {
    let mut header: Option<Vec<String>> = None;
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();

        let names = match &header {
            Some(names) => names,
            None => {
                if let Some(pos) = parts.iter().position(|p| p.is_empty()) {
                    return Err(DataError::Parse {
                        line: line_num + 1,
                        message: format!("empty column name at position {}", pos + 1),
                    });
                }
                columns = vec![Vec::new(); parts.len()];
                header = Some(parts.iter().map(|p| p.to_string()).collect());
                continue;
            }
        };

        if parts.len() != names.len() {
            return Err(DataError::Parse {
                line: line_num + 1,
                message: format!("expected {} columns, got {}", names.len(), parts.len()),
            });
        }

        for ((cell, column), name) in parts.iter().zip(columns.iter_mut()).zip(names) {
            let value: f64 = cell.parse().map_err(|_| DataError::InvalidValue {
                line: line_num + 1,
                column: name.clone(),
                value: cell.to_string(),
            })?;
            column.push(value);
        }
    }

    let names = header.ok_or(DataError::MissingHeader)?;
    Ok(Dataset::from_columns(names.into_iter().zip(columns))?)
}
