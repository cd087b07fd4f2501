//! Forecast output type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Prediction bounds at a given coverage level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionIntervals {
    /// Nominal coverage, in (0, 1)
    pub level: f64,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Timestamped point forecasts extending a training index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Feature the forecast was produced for
    pub feature: String,
    /// Forecast timestamps, one period apart, starting after the training index
    pub index: Vec<NaiveDateTime>,
    /// Point forecasts
    pub point: Vec<f64>,
    /// Optional prediction bounds
    pub intervals: Option<PredictionIntervals>,
}

impl Forecast {
    /// Number of forecast steps.
    pub fn len(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.index.iter().copied().zip(self.point.iter().copied())
    }
}
