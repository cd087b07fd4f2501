//! Seasonal ARIMA estimator with exogenous regressors (SARIMAX).
//!
//! The model is a regression with seasonal ARIMA errors:
//!
//! ```text
//! y_t = beta . x_t + u_t
//! phi(B) PHI(B^s) (1 - B)^d (1 - B^s)^D u_t = theta(B) THETA(B^s) e_t
//! ```
//!
//! Parameters are estimated by conditional sum of squares, minimized with the
//! Nelder-Mead simplex from `anofox-forecast`. Regression coefficients start
//! from an OLS fit on the differenced data (`anofox-regression`). A constant
//! is estimated only when the model has no differencing.

use crate::error::{ForecastError, Result};
use crate::forecast::PredictionIntervals;
use crate::order::{Order, SeasonalOrder};

use anofox_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
use anofox_regression::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

/// Coefficient bound keeping AR/MA terms inside the unit interval.
const COEF_BOUND: f64 = 0.99;

/// Model orders for a SARIMAX fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SarimaxSpec {
    pub order: Order,
    pub seasonal_order: SeasonalOrder,
}

impl SarimaxSpec {
    pub fn new(order: Order, seasonal_order: SeasonalOrder) -> Self {
        Self {
            order,
            seasonal_order,
        }
    }

    /// Number of observations consumed by differencing.
    fn n_diff(&self) -> usize {
        self.order.d + self.seasonal_order.d * self.seasonal_order.period()
    }

    /// Highest AR lag of the expanded AR polynomial.
    fn ar_lag(&self) -> usize {
        self.order.p + self.seasonal_order.p * self.seasonal_order.period()
    }

    fn has_mean(&self) -> bool {
        self.order.d == 0 && self.seasonal_order.d == 0
    }

    /// Number of ARMA coefficients (excluding mean and regression terms).
    fn n_arma(&self) -> usize {
        self.order.p + self.order.q + self.seasonal_order.p + self.seasonal_order.q
    }

    /// Minimum series length for an identified fit with `n_exog` regressors.
    pub fn min_observations(&self, n_exog: usize) -> usize {
        let n_params = self.n_arma() + n_exog + usize::from(self.has_mean());
        self.n_diff() + self.ar_lag() + n_params + 1
    }
}

/// Optimizer settings.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Maximum Nelder-Mead iterations before the fit is declared non-convergent
    pub max_iter: usize,
    /// Convergence tolerance on the normalised objective
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iter: 10_000,
            tolerance: 1e-8,
        }
    }
}

/// Fitted SARIMAX model: estimated parameters plus the state needed to forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SarimaxFit {
    pub spec: SarimaxSpec,
    /// Constant of the (undifferenced) error process, if estimated
    pub mean: Option<f64>,
    /// Regression coefficients, one per exogenous column
    pub beta: Vec<f64>,
    pub ar: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    /// Innovation variance
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Observations used in the conditional likelihood
    pub n_effective: usize,
    /// Optimizer iterations
    pub iterations: usize,
    /// Regression errors `u_t = y_t - beta . x_t` on the training index
    levels: Vec<f64>,
    /// Differenced, demeaned regression errors
    differenced: Vec<f64>,
    /// One-step innovations on the differenced scale
    residuals: Vec<f64>,
}

/// Parameter vector layout: `[mean?] [beta..] [ar..] [sar..] [ma..] [sma..]`.
struct Layout {
    has_mean: bool,
    n_exog: usize,
    p: usize,
    sp: usize,
    q: usize,
    sq: usize,
}

struct Params<'a> {
    mean: f64,
    beta: &'a [f64],
    ar: &'a [f64],
    sar: &'a [f64],
    ma: &'a [f64],
    sma: &'a [f64],
}

impl Layout {
    fn new(spec: &SarimaxSpec, n_exog: usize) -> Self {
        Self {
            has_mean: spec.has_mean(),
            n_exog,
            p: spec.order.p,
            sp: spec.seasonal_order.p,
            q: spec.order.q,
            sq: spec.seasonal_order.q,
        }
    }

    fn len(&self) -> usize {
        usize::from(self.has_mean) + self.n_exog + self.p + self.sp + self.q + self.sq
    }

    fn split<'a>(&self, v: &'a [f64]) -> Params<'a> {
        let (mean, rest) = if self.has_mean {
            (v[0], &v[1..])
        } else {
            (0.0, v)
        };
        let (beta, rest) = rest.split_at(self.n_exog);
        let (ar, rest) = rest.split_at(self.p);
        let (sar, rest) = rest.split_at(self.sp);
        let (ma, sma) = rest.split_at(self.q);
        Params {
            mean,
            beta,
            ar,
            sar,
            ma,
            sma,
        }
    }

    fn bounds(&self) -> Vec<(f64, f64)> {
        let free = usize::from(self.has_mean) + self.n_exog;
        let arma = self.p + self.sp + self.q + self.sq;
        std::iter::repeat((f64::NEG_INFINITY, f64::INFINITY))
            .take(free)
            .chain(std::iter::repeat((-COEF_BOUND, COEF_BOUND)).take(arma))
            .collect()
    }
}

/// Multiply two lag polynomials given as coefficient vectors (index = lag).
fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// `1 + sign * (c_1 B^step + c_2 B^(2 step) + ...)`.
fn lag_poly(coefs: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * step + 1];
    poly[0] = 1.0;
    for (i, &c) in coefs.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// Differencing operator `(1 - B)^d (1 - B^s)^D`.
fn diff_poly(spec: &SarimaxSpec) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..spec.order.d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    let s = spec.seasonal_order.period();
    for _ in 0..spec.seasonal_order.d {
        poly = poly_mul(&poly, &lag_poly(&[1.0], s, -1.0));
    }
    poly
}

/// Apply a lag polynomial to a series, dropping the first `len - 1` points.
fn apply_poly(poly: &[f64], series: &[f64]) -> Vec<f64> {
    let lag = poly.len() - 1;
    (lag..series.len())
        .map(|t| poly.iter().enumerate().map(|(i, c)| c * series[t - i]).sum::<f64>())
        .collect()
}

/// Right-hand side coefficients of `w_t = sum_i ar_i w_{t-i} + e_t + sum_j ma_j e_{t-j}`.
fn arma_lags(params: &Params<'_>, s: usize) -> (Vec<f64>, Vec<f64>) {
    let ar_poly = poly_mul(&lag_poly(params.ar, 1, -1.0), &lag_poly(params.sar, s.max(1), -1.0));
    let ma_poly = poly_mul(&lag_poly(params.ma, 1, 1.0), &lag_poly(params.sma, s.max(1), 1.0));
    let ar_lags = ar_poly.iter().map(|c| -c).collect();
    (ar_lags, ma_poly)
}

/// Regression errors `y_t - beta . x_t`.
fn regression_errors(y: &[f64], exog: &[Vec<f64>], beta: &[f64]) -> Vec<f64> {
    (0..y.len())
        .map(|t| {
            y[t] - exog
                .iter()
                .zip(beta.iter())
                .map(|(col, b)| b * col[t])
                .sum::<f64>()
        })
        .collect()
}

/// Conditional residuals of an ARMA recursion; the first `start` are zero.
fn arma_residuals(w: &[f64], ar_lags: &[f64], ma_lags: &[f64], start: usize) -> Vec<f64> {
    let mut residuals = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut pred = 0.0;
        for (i, a) in ar_lags.iter().enumerate().skip(1) {
            pred += a * w[t - i];
        }
        for (j, m) in ma_lags.iter().enumerate().skip(1) {
            if t >= j {
                pred += m * residuals[t - j];
            }
        }
        residuals[t] = w[t] - pred;
    }
    residuals
}

struct Evaluation {
    levels: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    css: f64,
}

fn evaluate(
    spec: &SarimaxSpec,
    layout: &Layout,
    delta: &[f64],
    y: &[f64],
    exog: &[Vec<f64>],
    v: &[f64],
) -> Evaluation {
    let params = layout.split(v);
    let levels = regression_errors(y, exog, params.beta);
    let differenced: Vec<f64> = apply_poly(delta, &levels)
        .into_iter()
        .map(|w| w - params.mean)
        .collect();
    let (ar_lags, ma_lags) = arma_lags(&params, spec.seasonal_order.period());
    let start = spec.ar_lag();
    let residuals = arma_residuals(&differenced, &ar_lags, &ma_lags, start);
    let css: f64 = residuals[start..].iter().map(|e| e * e).sum();
    Evaluation {
        levels,
        differenced,
        residuals,
        css,
    }
}

/// OLS coefficients of `y` on the columns of `x`, via anofox-regression.
///
/// Returns `(intercept, betas)`; falls back to zeros if the design is singular.
fn ols_coefficients(y: &[f64], x: &[Vec<f64>], with_intercept: bool) -> (f64, Vec<f64>) {
    let n = y.len();
    let k = x.len();

    if k == 0 || n == 0 {
        let mean = if n > 0 { y.iter().sum::<f64>() / n as f64 } else { 0.0 };
        return (if with_intercept { mean } else { 0.0 }, vec![]);
    }

    let x_mat = faer::Mat::from_fn(n, k, |i, j| x[j][i]);
    let y_col = faer::Col::from_fn(n, |i| y[i]);

    let fitted = match OlsRegressor::builder()
        .with_intercept(with_intercept)
        .build()
        .fit(&x_mat, &y_col)
    {
        Ok(f) => f,
        Err(_) => return (0.0, vec![0.0; k]),
    };

    let intercept = fitted.intercept().unwrap_or(0.0);
    let coeffs_col = fitted.coefficients();
    let betas = (0..coeffs_col.nrows()).map(|i| coeffs_col[i]).collect();
    (intercept, betas)
}

/// Fit a SARIMAX model.
///
/// # Arguments
/// * `y` - Endogenous series
/// * `exog` - Exogenous regressors, `exog[column][time]`, each aligned with `y`
/// * `spec` - Model orders
/// * `options` - Optimizer settings
///
/// # Errors
/// `ForecastError::ModelFit` when the inputs are misaligned or non-finite, the
/// series is too short for the requested orders, or the optimizer does not
/// converge.
pub fn fit(
    y: &[f64],
    exog: &[Vec<f64>],
    spec: SarimaxSpec,
    options: &FitOptions,
) -> Result<SarimaxFit> {
    for (j, col) in exog.iter().enumerate() {
        if col.len() != y.len() {
            return Err(ForecastError::ModelFit(format!(
                "Exogenous column {} has {} rows but the endogenous series has {}",
                j,
                col.len(),
                y.len()
            )));
        }
    }

    if y.iter().chain(exog.iter().flatten()).any(|v| !v.is_finite()) {
        return Err(ForecastError::ModelFit(
            "Training data contains non-finite values".to_string(),
        ));
    }

    let needed = spec.min_observations(exog.len());
    if y.len() < needed {
        return Err(ForecastError::ModelFit(format!(
            "Series too short for SARIMAX{}x{}: need at least {} observations, got {}",
            spec.order,
            spec.seasonal_order,
            needed,
            y.len()
        )));
    }

    let layout = Layout::new(&spec, exog.len());
    let delta = diff_poly(&spec);

    // Starting values: OLS on the differenced data, small positive ARMA terms
    let y_diff = apply_poly(&delta, y);
    let x_diff: Vec<Vec<f64>> = exog.iter().map(|c| apply_poly(&delta, c)).collect();
    let (intercept, beta0) = ols_coefficients(&y_diff, &x_diff, layout.has_mean);

    let mut initial = Vec::with_capacity(layout.len());
    if layout.has_mean {
        initial.push(intercept);
    }
    initial.extend(beta0);
    for count in [layout.p, layout.sp, layout.q, layout.sq] {
        initial.extend((0..count).map(|i| 0.1 / (i + 1) as f64));
    }

    let (point, iterations) = if initial.is_empty() {
        (initial, 0)
    } else {
        let scale = evaluate(&spec, &layout, &delta, y, exog, &initial)
            .css
            .max(f64::MIN_POSITIVE);
        let bounds = layout.bounds();
        let config = NelderMeadConfig {
            max_iter: options.max_iter,
            tolerance: options.tolerance,
            ..Default::default()
        };

        let result = nelder_mead(
            |v| {
                let css = evaluate(&spec, &layout, &delta, y, exog, v).css;
                if css.is_finite() {
                    css / scale
                } else {
                    f64::MAX
                }
            },
            &initial,
            Some(&bounds),
            config,
        );

        if !result.converged {
            warn!(
                iterations = result.iterations,
                objective = result.optimal_value,
                "SARIMAX optimizer did not converge"
            );
            return Err(ForecastError::ModelFit(format!(
                "Optimizer did not converge after {} iterations",
                result.iterations
            )));
        }
        (result.optimal_point, result.iterations)
    };

    let eval = evaluate(&spec, &layout, &delta, y, exog, &point);
    let n_effective = eval.differenced.len() - spec.ar_lag();
    let sigma2 = eval.css / n_effective as f64;
    if !sigma2.is_finite() {
        return Err(ForecastError::ModelFit(
            "Likelihood is not finite at the optimum".to_string(),
        ));
    }

    let n_eff = n_effective as f64;
    let log_likelihood =
        -0.5 * n_eff * ((2.0 * std::f64::consts::PI * sigma2.max(f64::MIN_POSITIVE)).ln() + 1.0);
    let k = (layout.len() + 1) as f64;
    let aic = -2.0 * log_likelihood + 2.0 * k;
    let bic = -2.0 * log_likelihood + k * n_eff.ln();

    let params = layout.split(&point);
    let fitted = SarimaxFit {
        spec,
        mean: layout.has_mean.then_some(params.mean),
        beta: params.beta.to_vec(),
        ar: params.ar.to_vec(),
        seasonal_ar: params.sar.to_vec(),
        ma: params.ma.to_vec(),
        seasonal_ma: params.sma.to_vec(),
        sigma2,
        log_likelihood,
        aic,
        bic,
        n_effective,
        iterations,
        levels: eval.levels,
        differenced: eval.differenced,
        residuals: eval.residuals,
    };

    debug!(
        order = %spec.order,
        seasonal_order = %spec.seasonal_order,
        iterations,
        sigma2,
        aic,
        "SARIMAX fit complete"
    );

    Ok(fitted)
}

impl SarimaxFit {
    fn params(&self) -> Params<'_> {
        Params {
            mean: self.mean.unwrap_or(0.0),
            beta: &self.beta,
            ar: &self.ar,
            sar: &self.seasonal_ar,
            ma: &self.ma,
            sma: &self.seasonal_ma,
        }
    }

    /// Number of exogenous regressors the model was fitted with.
    pub fn n_exog(&self) -> usize {
        self.beta.len()
    }

    /// Named parameter estimates, e.g. `ar.L1`, `ma.S.L7`, `x1`, `sigma2`.
    pub fn coefficients(&self) -> Vec<(String, f64)> {
        let s = self.spec.seasonal_order.s;
        let mut out = Vec::new();
        if let Some(mean) = self.mean {
            out.push(("intercept".to_string(), mean));
        }
        out.extend(
            self.beta
                .iter()
                .enumerate()
                .map(|(j, b)| (format!("x{}", j + 1), *b)),
        );
        out.extend(self.ar.iter().enumerate().map(|(i, c)| (format!("ar.L{}", i + 1), *c)));
        out.extend(
            self.seasonal_ar
                .iter()
                .enumerate()
                .map(|(i, c)| (format!("ar.S.L{}", (i + 1) * s), *c)),
        );
        out.extend(self.ma.iter().enumerate().map(|(i, c)| (format!("ma.L{}", i + 1), *c)));
        out.extend(
            self.seasonal_ma
                .iter()
                .enumerate()
                .map(|(i, c)| (format!("ma.S.L{}", (i + 1) * s), *c)),
        );
        out.push(("sigma2".to_string(), self.sigma2));
        out
    }

    /// In-sample one-step innovations (zero for the conditioning prefix).
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn check_future(&self, horizon: usize, future_exog: &[Vec<f64>]) -> Result<()> {
        if future_exog.len() != self.n_exog() {
            return Err(ForecastError::ExogenousMismatch(format!(
                "Model was fitted with {} exogenous columns but {} were supplied",
                self.n_exog(),
                future_exog.len()
            )));
        }
        for (j, col) in future_exog.iter().enumerate() {
            if col.len() < horizon {
                return Err(ForecastError::ExogenousMismatch(format!(
                    "Future exogenous column {} has {} rows, need at least {}",
                    j,
                    col.len(),
                    horizon
                )));
            }
            if col[..horizon].iter().any(|v| !v.is_finite()) {
                return Err(ForecastError::ExogenousMismatch(format!(
                    "Future exogenous column {} contains non-finite values",
                    j
                )));
            }
        }
        Ok(())
    }

    /// Point forecasts for the next `horizon` periods.
    ///
    /// `future_exog[column][step]` must hold at least `horizon` rows per column.
    pub fn predict(&self, horizon: usize, future_exog: &[Vec<f64>]) -> Result<Vec<f64>> {
        self.check_future(horizon, future_exog)?;

        let params = self.params();
        let (ar_lags, ma_lags) = arma_lags(&params, self.spec.seasonal_order.period());
        let delta = diff_poly(&self.spec);

        let mut w = self.differenced.clone();
        let mut e = self.residuals.clone();
        let mut z = self.levels.clone();
        let mut out = Vec::with_capacity(horizon);

        for h in 0..horizon {
            let t = w.len();
            let mut pred = 0.0;
            for (i, a) in ar_lags.iter().enumerate().skip(1) {
                if t >= i {
                    pred += a * w[t - i];
                }
            }
            for (j, m) in ma_lags.iter().enumerate().skip(1) {
                if t >= j {
                    pred += m * e[t - j];
                }
            }
            w.push(pred);
            e.push(0.0);

            // Undo differencing: delta(B) z_t = w_t + mean
            let n = z.len();
            let lagged: f64 = delta
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * z[n - i])
                .sum();
            let level = pred + params.mean - lagged;
            z.push(level);

            let regression: f64 = future_exog
                .iter()
                .zip(self.beta.iter())
                .map(|(col, b)| b * col[h])
                .sum();
            out.push(level + regression);
        }

        Ok(out)
    }

    /// Point forecasts with Gaussian prediction bounds at coverage `level`.
    pub fn predict_with_intervals(
        &self,
        horizon: usize,
        future_exog: &[Vec<f64>],
        level: f64,
    ) -> Result<(Vec<f64>, PredictionIntervals)> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::Configuration(format!(
                "Interval level must be in (0, 1), got {}",
                level
            )));
        }
        let point = self.predict(horizon, future_exog)?;

        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::Configuration(format!("Normal distribution: {}", e)))?;
        let z = normal.inverse_cdf((1.0 + level) / 2.0);

        let psi = self.psi_weights(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut cumulative = 0.0;
        for (h, p) in point.iter().enumerate() {
            cumulative += psi[h] * psi[h];
            let se = (self.sigma2 * cumulative).sqrt();
            lower.push(p - z * se);
            upper.push(p + z * se);
        }

        Ok((point, PredictionIntervals { level, lower, upper }))
    }

    /// MA(infinity) weights of the integrated model, `psi[0] = 1`.
    fn psi_weights(&self, n: usize) -> Vec<f64> {
        let params = self.params();
        let (ar_lags, ma_lags) = arma_lags(&params, self.spec.seasonal_order.period());
        let ar_poly: Vec<f64> = ar_lags
            .iter()
            .enumerate()
            .map(|(i, a)| if i == 0 { 1.0 } else { -a })
            .collect();
        let phi: Vec<f64> = poly_mul(&ar_poly, &diff_poly(&self.spec))
            .iter()
            .map(|c| -c)
            .collect();

        let mut psi = vec![0.0; n.max(1)];
        psi[0] = 1.0;
        for j in 1..psi.len() {
            let mut value = ma_lags.get(j).copied().unwrap_or(0.0);
            for i in 1..=j.min(phi.len() - 1) {
                value += phi[i] * psi[j - i];
            }
            psi[j] = value;
        }
        psi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spec(p: i64, d: i64, q: i64, sp: i64, sd: i64, sq: i64, s: i64) -> SarimaxSpec {
        SarimaxSpec::new(
            Order::new(p, d, q).unwrap(),
            SeasonalOrder::new(sp, sd, sq, s).unwrap(),
        )
    }

    /// Deterministic pseudo-random noise in [-0.5, 0.5).
    fn noise(i: usize) -> f64 {
        let x = ((i as f64 + 1.0) * 12.9898).sin() * 43758.5453;
        x - x.floor() - 0.5
    }

    #[test]
    fn test_poly_helpers() {
        assert_eq!(poly_mul(&[1.0, -1.0], &[1.0, -1.0]), vec![1.0, -2.0, 1.0]);
        assert_eq!(lag_poly(&[0.5], 3, -1.0), vec![1.0, 0.0, 0.0, -0.5]);
        assert_eq!(apply_poly(&[1.0, -1.0], &[1.0, 3.0, 6.0]), vec![2.0, 3.0]);

        let delta = diff_poly(&spec(0, 1, 0, 0, 1, 0, 4));
        assert_eq!(delta, vec![1.0, -1.0, 0.0, 0.0, -1.0, 1.0]);
    }

    #[test]
    fn test_min_observations() {
        let s = spec(1, 1, 1, 1, 1, 1, 7);
        // 1 + 7 differenced, 1 + 7 AR lags, 4 ARMA + 1 exog params, plus one
        assert_eq!(s.min_observations(1), 8 + 8 + 5 + 1);
        assert_eq!(spec(0, 0, 0, 0, 0, 0, 0).min_observations(0), 2);
    }

    #[test]
    fn test_fit_ar1_recovers_coefficient() {
        let mut y = vec![0.0];
        for i in 1..300 {
            y.push(0.6 * y[i - 1] + noise(i));
        }
        let fitted = fit(&y, &[], spec(1, 0, 0, 0, 0, 0, 0), &FitOptions::default()).unwrap();
        assert!((fitted.ar[0] - 0.6).abs() < 0.2, "ar = {}", fitted.ar[0]);
        assert!(fitted.mean.is_some());
        assert!(fitted.sigma2 > 0.0);
        assert!(fitted.aic.is_finite());
        assert!(fitted.bic > fitted.aic);
    }

    #[test]
    fn test_fit_recovers_regression_coefficient() {
        let x: Vec<f64> = (0..120).map(|i| (i as f64 * 0.37).sin() * 4.0).collect();
        let y: Vec<f64> = (0..120)
            .map(|i| 2.5 * x[i] + 0.05 * i as f64 + noise(i) * 0.2)
            .collect();
        let fitted = fit(
            &y,
            &[x.clone()],
            spec(0, 1, 1, 0, 0, 0, 0),
            &FitOptions::default(),
        )
        .unwrap();
        assert_relative_eq!(fitted.beta[0], 2.5, epsilon = 0.1);
        assert!(fitted.mean.is_none());
    }

    #[test]
    fn test_random_walk_forecast_is_flat() {
        let y: Vec<f64> = (0..50).map(|i| 10.0 + noise(i)).collect();
        let fitted = fit(&y, &[], spec(0, 1, 0, 0, 0, 0, 0), &FitOptions::default()).unwrap();
        let preds = fitted.predict(4, &[]).unwrap();
        for p in preds {
            assert_relative_eq!(p, *y.last().unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_seasonal_differencing_repeats_pattern() {
        // (0,0,0)x(0,1,0,4): forecast repeats the last season
        let pattern = [1.0, 5.0, 3.0, -2.0];
        let y: Vec<f64> = (0..24).map(|i| pattern[i % 4]).collect();
        let fitted = fit(&y, &[], spec(0, 0, 0, 0, 1, 0, 4), &FitOptions::default()).unwrap();
        let preds = fitted.predict(6, &[]).unwrap();
        for (h, p) in preds.iter().enumerate() {
            assert_relative_eq!(*p, pattern[(24 + h) % 4], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_too_short_series() {
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let err = fit(&y, &[], spec(1, 1, 1, 1, 1, 1, 7), &FitOptions::default());
        assert!(matches!(err, Err(ForecastError::ModelFit(_))));
    }

    #[test]
    fn test_misaligned_exog() {
        let y: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let x = vec![vec![1.0; 39]];
        let err = fit(&y, &x, spec(1, 0, 0, 0, 0, 0, 0), &FitOptions::default());
        assert!(matches!(err, Err(ForecastError::ModelFit(_))));
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let y: Vec<f64> = (0..80).map(|i| (i as f64 * 0.5).sin() + noise(i)).collect();
        let options = FitOptions {
            max_iter: 2,
            tolerance: 1e-14,
        };
        let err = fit(&y, &[], spec(2, 0, 2, 0, 0, 0, 0), &options);
        assert!(matches!(err, Err(ForecastError::ModelFit(_))));
    }

    #[test]
    fn test_predict_checks_future_exog() {
        let x: Vec<f64> = (0..60).map(|i| (i % 5) as f64).collect();
        let y: Vec<f64> = (0..60).map(|i| x[i] + noise(i)).collect();
        let fitted = fit(&y, &[x], spec(1, 0, 0, 0, 0, 0, 0), &FitOptions::default()).unwrap();

        assert!(matches!(
            fitted.predict(3, &[]),
            Err(ForecastError::ExogenousMismatch(_))
        ));
        assert!(matches!(
            fitted.predict(3, &[vec![1.0, 2.0]]),
            Err(ForecastError::ExogenousMismatch(_))
        ));
        assert_eq!(fitted.predict(3, &[vec![1.0, 2.0, 3.0, 4.0]]).unwrap().len(), 3);
    }

    #[test]
    fn test_intervals_widen_with_horizon() {
        let y: Vec<f64> = (0..80).map(|i| 0.1 * i as f64 + noise(i)).collect();
        let fitted = fit(&y, &[], spec(1, 1, 0, 0, 0, 0, 0), &FitOptions::default()).unwrap();
        let (point, intervals) = fitted.predict_with_intervals(5, &[], 0.95).unwrap();

        assert_eq!(point, fitted.predict(5, &[]).unwrap());
        for h in 0..5 {
            assert!(intervals.lower[h] < point[h] && point[h] < intervals.upper[h]);
        }
        let width = |h: usize| intervals.upper[h] - intervals.lower[h];
        assert!(width(4) > width(0));

        assert!(matches!(
            fitted.predict_with_intervals(5, &[], 1.5),
            Err(ForecastError::Configuration(_))
        ));
    }

    #[test]
    fn test_coefficient_names() {
        let y: Vec<f64> = (0..120)
            .map(|i| (i as f64 * std::f64::consts::TAU / 7.0).sin() + noise(i))
            .collect();
        let fitted = fit(&y, &[], spec(1, 0, 1, 1, 0, 1, 7), &FitOptions::default()).unwrap();
        let names: Vec<String> = fitted.coefficients().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["intercept", "ar.L1", "ar.S.L7", "ma.L1", "ma.S.L7", "sigma2"]
        );
    }
}
