//! Time-indexed tabular data.

use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use chrono::NaiveDateTime;

/// A table keyed by timestamp, with one `f64` column per feature.
///
/// Columns are stored column-major so a single feature can be handed to the
/// estimator as a contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFrame {
    index: Vec<NaiveDateTime>,
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl TimeFrame {
    /// Build a frame from an index and named columns.
    ///
    /// Every column must have one value per timestamp and names must be unique.
    pub fn new(index: Vec<NaiveDateTime>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());

        for (name, values) in columns {
            if values.len() != index.len() {
                return Err(ForecastError::Data(format!(
                    "Column '{}' has {} values but the index has {} timestamps",
                    name,
                    values.len(),
                    index.len()
                )));
            }
            if names.contains(&name) {
                return Err(ForecastError::Data(format!("Duplicate column '{}'", name)));
            }
            names.push(name);
            data.push(values);
        }

        Ok(Self {
            index,
            names,
            columns: data,
        })
    }

    /// A frame with an index but no columns (e.g. no exogenous regressors).
    pub fn empty(index: Vec<NaiveDateTime>) -> Self {
        Self {
            index,
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .map(|(n, c)| (n.as_str(), c.as_slice()))
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.index.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.index.last().copied()
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<TimeFrame> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name)
                    .map(|c| (name.to_string(), c.to_vec()))
                    .ok_or_else(|| ForecastError::Data(format!("Column '{}' not found", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        TimeFrame::new(self.index.clone(), columns)
    }

    /// Drop the named columns; names that are absent are ignored.
    pub fn without(&self, names: &[&str]) -> TimeFrame {
        let (names, columns) = self
            .names
            .iter()
            .zip(self.columns.iter())
            .filter(|(n, _)| !names.contains(&n.as_str()))
            .map(|(n, c)| (n.clone(), c.clone()))
            .unzip();
        TimeFrame {
            index: self.index.clone(),
            names,
            columns,
        }
    }

    /// First `n` rows (all rows if `n` exceeds the length).
    pub fn head(&self, n: usize) -> TimeFrame {
        let n = n.min(self.len());
        TimeFrame {
            index: self.index[..n].to_vec(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[..n].to_vec()).collect(),
        }
    }

    /// Fail unless the index is strictly increasing and gap-free at `freq`.
    pub fn check_regular(&self, freq: Frequency) -> Result<()> {
        match freq.first_irregularity(&self.index) {
            None => Ok(()),
            Some(pos) => Err(ForecastError::Configuration(format!(
                "Index is not a regular '{}' grid: {} follows {} (row {})",
                freq,
                self.index[pos],
                self.index[pos - 1],
                pos
            ))),
        }
    }

    /// Column-major copy of the data: `data[j][t]` is column `j` at time `t`.
    pub(crate) fn to_columns(&self) -> Vec<Vec<f64>> {
        self.columns.clone()
    }
}
