//! CSV table loading.

use crate::error::{ForecastError, Result};
use crate::series::TimeFrame;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// Default name of the timestamp column.
pub const DATE_COLUMN: &str = "date";

/// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (also with a `T` separator).
pub(crate) fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Load a CSV table keyed by the `date` column.
pub fn load_csv(path: impl AsRef<Path>) -> Result<TimeFrame> {
    load_csv_with_date_column(path, DATE_COLUMN)
}

/// Load a CSV table whose timestamps live in `date_column`.
///
/// Every other column is parsed as `f64`; empty or non-numeric cells are
/// rejected with `ForecastError::Data`.
pub fn load_csv_with_date_column(path: impl AsRef<Path>, date_column: &str) -> Result<TimeFrame> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let date_pos = headers
        .iter()
        .position(|h| h.trim() == date_column)
        .ok_or_else(|| {
            ForecastError::Data(format!(
                "{}: no '{}' column in header {:?}",
                path.display(),
                date_column,
                headers.iter().collect::<Vec<_>>()
            ))
        })?;

    let value_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_pos)
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();

    let mut index = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); value_cols.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line = row + 2;

        let raw_date = record.get(date_pos).unwrap_or_default();
        let ts = parse_timestamp(raw_date).ok_or_else(|| {
            ForecastError::Data(format!(
                "{}:{}: invalid timestamp '{}'",
                path.display(),
                line,
                raw_date
            ))
        })?;
        index.push(ts);

        for ((col, name), out) in value_cols.iter().zip(values.iter_mut()) {
            let cell = record.get(*col).unwrap_or_default().trim();
            let value: f64 = cell.parse().map_err(|_| {
                ForecastError::Data(format!(
                    "{}:{}: column '{}' has non-numeric value '{}'",
                    path.display(),
                    line,
                    name,
                    cell
                ))
            })?;
            out.push(value);
        }
    }

    let columns = value_cols
        .into_iter()
        .map(|(_, name)| name)
        .zip(values)
        .collect();
    TimeFrame::new(index, columns)
}
