//! SARIMAX model wrapper: one model, one feature, three lifecycle states.

use crate::config::ModelConfig;
use crate::error::{ForecastError, Result};
use crate::forecast::Forecast;
use crate::frequency::Frequency;
use crate::order::{Order, SeasonalOrder};
use crate::sarimax::{self, FitOptions, SarimaxFit, SarimaxSpec};
use crate::series::TimeFrame;
use chrono::NaiveDateTime;
use tracing::{debug, info};

#[derive(Debug, Clone)]
enum ModelState {
    Configured,
    Trained { fit: SarimaxFit },
    Forecasted { fit: SarimaxFit, forecast: Forecast },
}

impl ModelState {
    fn name(&self) -> &'static str {
        match self {
            ModelState::Configured => "configured",
            ModelState::Trained { .. } => "trained",
            ModelState::Forecasted { .. } => "forecasted",
        }
    }

    fn fit(&self) -> Option<&SarimaxFit> {
        match self {
            ModelState::Configured => None,
            ModelState::Trained { fit } | ModelState::Forecasted { fit, .. } => Some(fit),
        }
    }
}

/// A SARIMAX model bound to one target feature and its exogenous data.
///
/// The instance starts *configured*, becomes *trained* after a successful
/// [`train`](Self::train) and *forecasted* after [`forecast`](Self::forecast).
/// Training again re-fits from scratch and discards any stored forecast.
#[derive(Debug, Clone)]
pub struct SarimaxModel {
    feature: String,
    index: Vec<NaiveDateTime>,
    endog: Vec<f64>,
    exog: TimeFrame,
    future_exog: TimeFrame,
    spec: SarimaxSpec,
    freq: Frequency,
    options: FitOptions,
    state: ModelState,
}

impl SarimaxModel {
    /// Configure a model for `feature`.
    ///
    /// # Arguments
    /// * `feature` - Column of `endog` to model
    /// * `endog` - Historical table containing the feature column
    /// * `exog` - Historical regressors on the same index as `endog` (may have no columns)
    /// * `future_exog` - Regressor values for the forecast horizon, same columns as `exog`
    /// * `order`, `seasonal_order` - Model orders
    /// * `freq` - Step frequency of every table
    ///
    /// # Errors
    /// `ForecastError::Configuration` if the feature is missing, a table is
    /// not a regular grid at `freq`, or the exogenous column sets differ.
    pub fn new(
        feature: impl Into<String>,
        endog: &TimeFrame,
        exog: TimeFrame,
        future_exog: TimeFrame,
        order: Order,
        seasonal_order: SeasonalOrder,
        freq: Frequency,
    ) -> Result<Self> {
        let feature = feature.into();
        let values = endog.column(&feature).ok_or_else(|| {
            ForecastError::Configuration(format!(
                "Feature '{}' not found; available columns: {:?}",
                feature,
                endog.column_names()
            ))
        })?;

        endog.check_regular(freq)?;
        exog.check_regular(freq)?;
        future_exog.check_regular(freq)?;

        // Future columns are reordered to match the historical ones
        let names: Vec<&str> = exog.column_names().iter().map(String::as_str).collect();
        let future_exog = if names.is_empty() {
            TimeFrame::empty(future_exog.index().to_vec())
        } else {
            if future_exog.n_columns() != names.len() {
                return Err(ForecastError::Configuration(format!(
                    "Historical exogenous columns {:?} do not match future columns {:?}",
                    exog.column_names(),
                    future_exog.column_names()
                )));
            }
            future_exog.select(&names).map_err(|_| {
                ForecastError::Configuration(format!(
                    "Historical exogenous columns {:?} do not match future columns {:?}",
                    exog.column_names(),
                    future_exog.column_names()
                ))
            })?
        };

        Ok(Self {
            index: endog.index().to_vec(),
            endog: values.to_vec(),
            feature,
            exog,
            future_exog,
            spec: SarimaxSpec::new(order, seasonal_order),
            freq,
            options: FitOptions::default(),
            state: ModelState::Configured,
        })
    }

    /// Configure a model from validated hyperparameters.
    pub fn from_config(
        config: &ModelConfig,
        endog: &TimeFrame,
        exog: TimeFrame,
        future_exog: TimeFrame,
    ) -> Result<Self> {
        config.validate()?;
        Self::new(
            config.feature.clone(),
            endog,
            exog,
            future_exog,
            config.order()?,
            config.seasonal_order()?,
            config.frequency()?,
        )
    }

    /// Override optimizer settings.
    pub fn with_fit_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn feature(&self) -> &str {
        &self.feature
    }

    pub fn frequency(&self) -> Frequency {
        self.freq
    }

    pub fn spec(&self) -> SarimaxSpec {
        self.spec
    }

    /// `"configured"`, `"trained"` or `"forecasted"`.
    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn is_trained(&self) -> bool {
        self.state.fit().is_some()
    }

    /// Fitted artifact, once trained.
    pub fn artifact(&self) -> Option<&SarimaxFit> {
        self.state.fit()
    }

    /// Most recent forecast, if any.
    pub fn last_forecast(&self) -> Option<&Forecast> {
        match &self.state {
            ModelState::Forecasted { forecast, .. } => Some(forecast),
            _ => None,
        }
    }

    /// Named estimates, with regressors labelled by their column names.
    pub fn coefficients(&self) -> Option<Vec<(String, f64)>> {
        let fit = self.state.fit()?;
        let mut exog_names = self.exog.column_names().iter();
        Some(
            fit.coefficients()
                .into_iter()
                .map(|(name, value)| {
                    if name.starts_with('x') {
                        let label = exog_names.next().cloned().unwrap_or(name);
                        (label, value)
                    } else {
                        (name, value)
                    }
                })
                .collect(),
        )
    }

    /// Fit the estimator on the feature column and the historical regressors.
    ///
    /// On failure the previous state is kept.
    pub fn train(&mut self) -> Result<()> {
        if self.exog.n_columns() > 0 && self.exog.index() != self.index.as_slice() {
            return Err(ForecastError::ModelFit(format!(
                "Exogenous index ({} rows) is not aligned with the '{}' index ({} rows)",
                self.exog.len(),
                self.feature,
                self.index.len()
            )));
        }

        info!(
            feature = %self.feature,
            order = %self.spec.order,
            seasonal_order = %self.spec.seasonal_order,
            n_obs = self.endog.len(),
            n_exog = self.exog.n_columns(),
            "Training SARIMAX model"
        );

        let fit = sarimax::fit(
            &self.endog,
            &self.exog.to_columns(),
            self.spec,
            &self.options,
        )?;

        debug!(aic = fit.aic, sigma2 = fit.sigma2, "Model trained");
        self.state = ModelState::Trained { fit };
        Ok(())
    }

    /// Forecast `n_steps` periods past the training index.
    pub fn forecast(&mut self, n_steps: usize) -> Result<&Forecast> {
        self.run_forecast(n_steps, None)
    }

    /// Forecast with Gaussian prediction bounds at coverage `level`.
    pub fn forecast_with_intervals(&mut self, n_steps: usize, level: f64) -> Result<&Forecast> {
        self.run_forecast(n_steps, Some(level))
    }

    fn run_forecast(&mut self, n_steps: usize, level: Option<f64>) -> Result<&Forecast> {
        if n_steps == 0 {
            return Err(ForecastError::Configuration(
                "n_steps must be at least 1".to_string(),
            ));
        }
        let fit = self.state.fit().ok_or(ForecastError::InvalidState {
            operation: "forecast",
            required: "trained",
            actual: self.state.name(),
        })?;

        // Steps are counted from the first timestamp so calendar
        // frequencies keep the day-of-month anchor of the training index
        let origin = self.index.first().copied().ok_or_else(|| {
            ForecastError::Configuration("Training index is empty".to_string())
        })?;
        let n_train = self.index.len();
        let index = (n_train..n_train + n_steps)
            .map(|k| self.freq.advance(origin, k))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                ForecastError::Configuration(format!(
                    "Cannot extend the index {} steps past row {}",
                    n_steps, n_train
                ))
            })?;

        let future = self.future_rows(index[0], n_steps)?;
        let (point, intervals) = match level {
            Some(level) => {
                let (point, intervals) = fit.predict_with_intervals(n_steps, &future, level)?;
                (point, Some(intervals))
            }
            None => (fit.predict(n_steps, &future)?, None),
        };

        let forecast = Forecast {
            feature: self.feature.clone(),
            index,
            point,
            intervals,
        };

        info!(feature = %self.feature, n_steps, "Forecast produced");

        let state = std::mem::replace(&mut self.state, ModelState::Configured);
        self.state = match state {
            ModelState::Trained { fit } | ModelState::Forecasted { fit, .. } => {
                ModelState::Forecasted { fit, forecast }
            }
            ModelState::Configured => ModelState::Configured,
        };

        self.last_forecast().ok_or(ForecastError::InvalidState {
            operation: "forecast",
            required: "trained",
            actual: "configured",
        })
    }

    /// Future regressors for the horizon, column-major, starting at `expected`.
    fn future_rows(&self, expected: NaiveDateTime, n_steps: usize) -> Result<Vec<Vec<f64>>> {
        if self.exog.n_columns() == 0 {
            return Ok(Vec::new());
        }

        if self.future_exog.first_timestamp() != Some(expected) {
            return Err(ForecastError::ExogenousMismatch(format!(
                "Future exogenous rows must start at {}, found {}",
                expected,
                self.future_exog
                    .first_timestamp()
                    .map_or_else(|| "no rows".to_string(), |t| t.to_string())
            )));
        }
        if self.future_exog.len() < n_steps {
            return Err(ForecastError::ExogenousMismatch(format!(
                "Forecasting {} steps needs {} future exogenous rows, got {}",
                n_steps,
                n_steps,
                self.future_exog.len()
            )));
        }

        Ok(self.future_exog.head(n_steps).to_columns())
    }
}
