//! Tabular Dataset and Resample Views
//!
//! A `Dataset` is a fixed set of named numeric columns of equal length. It is
//! never copied per trial: a `Resample` borrows the dataset together with an
//! index set, and statistics read values through the indices.

use crate::error::{DatasetError, StatisticError};

/// Immutable column-oriented table of `f64` values
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    rows: usize,
}

impl Dataset {
    /// Build a dataset from `(name, values)` pairs.
    ///
    /// All columns must have the same length and distinct names.
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut values: Vec<Vec<f64>> = Vec::new();

        for (name, column) in columns {
            let name = name.into();
            if names.contains(&name) {
                return Err(DatasetError::DuplicateColumn(name));
            }
            if let Some(first) = values.first() {
                if column.len() != first.len() {
                    return Err(DatasetError::LengthMismatch {
                        name,
                        got: column.len(),
                        expected: first.len(),
                    });
                }
            }
            names.push(name);
            values.push(column);
        }

        if values.is_empty() {
            return Err(DatasetError::NoColumns);
        }

        let rows = values[0].len();
        Ok(Self {
            names,
            columns: values,
            rows,
        })
    }

    /// Convenience constructor for the common paired `(x, y)` layout
    pub fn paired(x: Vec<f64>, y: Vec<f64>) -> Result<Self, DatasetError> {
        Self::from_columns([("x", x), ("y", y)])
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Whether the dataset has zero rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Raw values of a column, if present
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// View of the whole dataset with every row selected once
    pub fn full_indices(&self) -> Vec<usize> {
        (0..self.rows).collect()
    }

    /// Borrow the dataset through an index set
    pub fn resample<'a>(&'a self, indices: &'a [usize]) -> Resample<'a> {
        Resample {
            dataset: self,
            indices,
        }
    }
}

/// A dataset seen through a resample index set.
///
/// Row `i` appearing `k` times in the index set is visited `k` times.
#[derive(Debug, Clone, Copy)]
pub struct Resample<'a> {
    dataset: &'a Dataset,
    indices: &'a [usize],
}

impl<'a> Resample<'a> {
    /// Number of selected rows (equal to the dataset size for a bootstrap draw)
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no rows are selected
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The underlying index set
    pub fn indices(&self) -> &'a [usize] {
        self.indices
    }

    /// The dataset being resampled
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Resampled view of one column
    pub fn column(&self, name: &str) -> Result<ResampledColumn<'a>, StatisticError> {
        let values = self
            .dataset
            .column(name)
            .ok_or_else(|| StatisticError::UnknownColumn(name.to_string()))?;
        Ok(ResampledColumn {
            values,
            indices: self.indices,
        })
    }
}

/// One column read through an index set
#[derive(Debug, Clone, Copy)]
pub struct ResampledColumn<'a> {
    values: &'a [f64],
    indices: &'a [usize],
}

impl<'a> ResampledColumn<'a> {
    /// Number of selected values
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no values are selected
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Value at position `i` of the resample
    pub fn get(&self, i: usize) -> f64 {
        self.values[self.indices[i]]
    }

    /// Iterate selected values in resample order
    pub fn iter(&self) -> impl Iterator<Item = f64> + 'a {
        let values = self.values;
        self.indices.iter().map(move |&i| values[i])
    }

    /// Collect the selected values
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}
