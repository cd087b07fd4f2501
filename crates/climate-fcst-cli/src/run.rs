//! Forecasting run: load tables, train, forecast, persist.

use climate_fcst_core::{
    load_csv, write_forecast, write_intervals, Config, ForecastError, Result, SarimaxModel,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files written by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutputs {
    pub forecast: PathBuf,
    pub intervals: Option<PathBuf>,
    pub artifact: PathBuf,
}

/// Remove files with extension `ext` directly under `dir`.
fn remove_outputs(dir: &Path, ext: &str) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Delete forecasts, interval files and model summaries from earlier runs.
pub fn clear_outputs(config: &Config) -> Result<usize> {
    let paths = &config.paths;
    let removed = remove_outputs(&paths.forecasts, "csv")?
        + remove_outputs(&paths.probabilities, "csv")?
        + remove_outputs(&paths.models, "json")?;
    info!(removed, "Cleared previous outputs");
    Ok(removed)
}

/// Build a configured model from the training and test tables named in `config`.
pub fn build_model(config: &Config) -> Result<SarimaxModel> {
    let params = &config.params;
    let train = load_csv(&config.paths.train_data)?;
    let test = load_csv(&config.paths.test_data)?;
    debug!(
        train_rows = train.len(),
        test_rows = test.len(),
        "Loaded input tables"
    );

    let exog = train.without(&[params.feature.as_str()]);
    let future_exog = test.without(&[params.feature.as_str()]);
    SarimaxModel::from_config(params, &train, exog, future_exog)
}

fn write_artifact(dir: &Path, name: &str, model: &SarimaxModel) -> Result<PathBuf> {
    let fit = model.artifact().ok_or(ForecastError::InvalidState {
        operation: "write_artifact",
        required: "trained",
        actual: model.state_name(),
    })?;
    let coefficients: serde_json::Map<String, serde_json::Value> = model
        .coefficients()
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, serde_json::json!(v)))
        .collect();

    let summary = serde_json::json!({
        "feature": model.feature(),
        "order": fit.spec.order,
        "seasonal_order": fit.spec.seasonal_order,
        "frequency": model.frequency().label(),
        "coefficients": coefficients,
        "sigma2": fit.sigma2,
        "log_likelihood": fit.log_likelihood,
        "aic": fit.aic,
        "bic": fit.bic,
        "n_effective": fit.n_effective,
        "iterations": fit.iterations,
    });

    let path = dir.join(format!("{}.json", name));
    fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
    Ok(path)
}

/// Execute a full run and return the files written.
///
/// `interval` requests prediction bounds at that coverage level, written to
/// the probabilities directory.
pub fn run(config: &Config, output_name: &str, interval: Option<f64>) -> Result<RunOutputs> {
    let paths = &config.paths;
    if config.params.clear {
        clear_outputs(config)?;
    }
    for dir in [&paths.forecasts, &paths.probabilities, &paths.models] {
        fs::create_dir_all(dir)?;
    }

    let mut model = build_model(config)?;
    model.train()?;

    let n_steps = config.params.horizon()?;
    let forecast = match interval {
        Some(level) => model.forecast_with_intervals(n_steps, level)?,
        None => model.forecast(n_steps)?,
    };

    let forecast_path = write_forecast(&paths.forecasts, output_name, forecast)?;
    let intervals_path = match interval {
        Some(_) => Some(write_intervals(&paths.probabilities, output_name, forecast)?),
        None => None,
    };
    let artifact_path = write_artifact(&paths.models, output_name, &model)?;

    info!(
        path = %forecast_path.display(),
        n_steps,
        "Forecast run complete"
    );

    Ok(RunOutputs {
        forecast: forecast_path,
        intervals: intervals_path,
        artifact: artifact_path,
    })
}
