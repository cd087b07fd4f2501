//! Core library for SARIMAX climate forecasting.
//!
//! This crate binds a model configuration to a fitted seasonal ARIMA model
//! with exogenous regressors, produces multi-step forecasts and writes them
//! to CSV.

pub mod config;
pub mod error;
pub mod forecast;
pub mod frequency;
pub mod loader;
pub mod model;
pub mod order;
pub mod sarimax;
pub mod series;
pub mod writer;

// Re-exports for convenience
pub use config::{Config, ModelConfig, Paths};
pub use error::{ForecastError, Result};
pub use forecast::{Forecast, PredictionIntervals};
pub use frequency::Frequency;
pub use loader::{load_csv, load_csv_with_date_column, DATE_COLUMN};
pub use model::SarimaxModel;
pub use order::{Order, SeasonalOrder};
pub use sarimax::{FitOptions, SarimaxFit, SarimaxSpec};
pub use series::TimeFrame;
pub use writer::{read_forecast, write_forecast, write_intervals};
