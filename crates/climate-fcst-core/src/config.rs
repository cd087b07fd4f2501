//! Run configuration loaded from JSON.
//!
//! ```json
//! {
//!   "paths": {
//!     "train_data": "data/DailyDelhiClimateTrain.csv",
//!     "test_data": "data/DailyDelhiClimateTest.csv",
//!     "outputs": "outputs",
//!     "probabilities": "outputs/probabilities",
//!     "forecasts": "outputs/forecasts",
//!     "models": "outputs/models"
//!   },
//!   "params": {
//!     "clear": true,
//!     "n_steps": 7,
//!     "feature": "meantemp",
//!     "pdq": [1, 1, 1],
//!     "seasonality": 7
//!   }
//! }
//! ```

use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use crate::order::{Order, SeasonalOrder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filesystem locations used by a forecasting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paths {
    pub train_data: PathBuf,
    pub test_data: PathBuf,
    pub outputs: PathBuf,
    pub probabilities: PathBuf,
    pub forecasts: PathBuf,
    pub models: PathBuf,
}

/// Model hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Remove previous forecast files before writing new ones
    #[serde(default)]
    pub clear: bool,
    /// Forecast horizon, at least 1
    pub n_steps: i64,
    /// Target column
    pub feature: String,
    /// Non-seasonal `(p, d, q)`
    pub pdq: [i64; 3],
    /// Seasonal period `s`
    pub seasonality: i64,
    /// Seasonal `(P, D, Q)`; the non-seasonal triple is reused when absent
    #[serde(default)]
    pub seasonal_pdq: Option<[i64; 3]>,
    /// Step frequency label
    #[serde(default = "default_freq")]
    pub freq: String,
}

fn default_freq() -> String {
    Frequency::Daily.label().to_string()
}

impl ModelConfig {
    pub fn order(&self) -> Result<Order> {
        Order::try_from(self.pdq)
    }

    pub fn seasonal_order(&self) -> Result<SeasonalOrder> {
        let [p, d, q] = self.seasonal_pdq.unwrap_or(self.pdq);
        SeasonalOrder::new(p, d, q, self.seasonality)
    }

    pub fn frequency(&self) -> Result<Frequency> {
        self.freq.parse()
    }

    /// Forecast horizon as a step count.
    pub fn horizon(&self) -> Result<usize> {
        usize::try_from(self.n_steps)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ForecastError::Configuration(format!(
                    "n_steps must be at least 1, got {}",
                    self.n_steps
                ))
            })
    }

    /// Check every field that can be checked without data.
    pub fn validate(&self) -> Result<()> {
        self.horizon()?;
        if self.feature.trim().is_empty() {
            return Err(ForecastError::Configuration(
                "feature must not be empty".to_string(),
            ));
        }
        self.order()?;
        self.seasonal_order()?;
        self.frequency()?;
        Ok(())
    }
}

/// Complete configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub paths: Paths,
    pub params: ModelConfig,
}

impl Config {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(s)?;
        config.params.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }
}
