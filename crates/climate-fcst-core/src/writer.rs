//! Forecast persistence as CSV.
//!
//! Point forecasts are written as `date,predicted_mean`; forecasts carrying
//! prediction bounds can also be written as `date,predicted_mean,lower,upper`.

use crate::error::{ForecastError, Result};
use crate::forecast::{Forecast, PredictionIntervals};
use crate::loader::parse_timestamp;
use chrono::{NaiveDateTime, NaiveTime};
use std::path::{Path, PathBuf};
use tracing::debug;

const DATE_HEADER: &str = "date";
const MEAN_HEADER: &str = "predicted_mean";

/// Dates at midnight are written without a time component.
fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.time() == NaiveTime::MIN {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn output_path(dir: &Path, name: &str) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(ForecastError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("output directory {} does not exist", dir.display()),
        )));
    }
    Ok(dir.join(format!("{}.csv", name)))
}

/// Write `forecast` to `<dir>/<name>.csv`, replacing any existing file.
pub fn write_forecast(dir: impl AsRef<Path>, name: &str, forecast: &Forecast) -> Result<PathBuf> {
    let path = output_path(dir.as_ref(), name)?;
    let mut writer = csv::Writer::from_path(&path)?;

    writer.write_record([DATE_HEADER, MEAN_HEADER])?;
    for (ts, value) in forecast.iter() {
        writer.write_record([format_timestamp(&ts), value.to_string()])?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = forecast.len(), "Forecast written");
    Ok(path)
}

/// Write point forecasts with their lower and upper bounds.
///
/// # Errors
/// `ForecastError::Data` if the forecast carries no intervals or the bounds
/// do not have one entry per point.
pub fn write_intervals(dir: impl AsRef<Path>, name: &str, forecast: &Forecast) -> Result<PathBuf> {
    let intervals = forecast.intervals.as_ref().ok_or_else(|| {
        ForecastError::Data(format!(
            "Forecast for '{}' has no prediction intervals",
            forecast.feature
        ))
    })?;
    if intervals.lower.len() != forecast.len() || intervals.upper.len() != forecast.len() {
        return Err(ForecastError::Data(format!(
            "Forecast for '{}' has {} points but {} lower and {} upper bounds",
            forecast.feature,
            forecast.len(),
            intervals.lower.len(),
            intervals.upper.len()
        )));
    }
    let path = output_path(dir.as_ref(), name)?;
    let mut writer = csv::Writer::from_path(&path)?;

    writer.write_record([DATE_HEADER, MEAN_HEADER, "lower", "upper"])?;
    let bounds = intervals.lower.iter().zip(intervals.upper.iter());
    for ((ts, value), (lower, upper)) in forecast.iter().zip(bounds) {
        writer.write_record([
            format_timestamp(&ts),
            value.to_string(),
            lower.to_string(),
            upper.to_string(),
        ])?;
    }
    writer.flush()?;

    debug!(path = %path.display(), level = intervals.level, "Prediction intervals written");
    Ok(path)
}

/// Read a file produced by [`write_forecast`] or [`write_intervals`].
///
/// The feature name is not stored in the file; it is taken from the file stem.
/// Interval files come back with a coverage level of `NaN`, since the level is
/// not recorded either.
pub fn read_forecast(path: impl AsRef<Path>) -> Result<Forecast> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let has_bounds = headers.len() >= 4 && &headers[2] == "lower" && &headers[3] == "upper";

    if headers.len() < 2 || &headers[0] != DATE_HEADER || &headers[1] != MEAN_HEADER {
        return Err(ForecastError::Data(format!(
            "{}: expected header '{},{}'",
            path.display(),
            DATE_HEADER,
            MEAN_HEADER
        )));
    }

    let mut index = Vec::new();
    let mut point = Vec::new();
    let mut lower = Vec::new();
    let mut upper = Vec::new();

    let number = |s: &str, line: usize| -> Result<f64> {
        s.trim().parse().map_err(|_| {
            ForecastError::Data(format!("{}:{}: invalid number '{}'", path.display(), line, s))
        })
    };

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line = row + 2;
        let raw = record.get(0).unwrap_or_default();
        index.push(parse_timestamp(raw).ok_or_else(|| {
            ForecastError::Data(format!("{}:{}: invalid timestamp '{}'", path.display(), line, raw))
        })?);
        point.push(number(record.get(1).unwrap_or_default(), line)?);
        if has_bounds {
            lower.push(number(record.get(2).unwrap_or_default(), line)?);
            upper.push(number(record.get(3).unwrap_or_default(), line)?);
        }
    }

    let feature = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Forecast {
        feature,
        index,
        point,
        intervals: has_bounds.then_some(PredictionIntervals {
            level: f64::NAN,
            lower,
            upper,
        }),
    })
}
