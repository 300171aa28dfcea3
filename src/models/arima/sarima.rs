//! Multiplicative seasonal ARIMA model.
//!
//! SARIMA(p, d, q)(P, D, Q)\[s\] without a constant:
//!
//! ```text
//! φ(B) Φ(B^s) (1 - B)^d (1 - B^s)^D y_t = θ(B) Θ(B^s) ε_t
//! ```
//!
//! Coefficients are estimated by conditional-sum-of-squares maximum
//! likelihood on the differenced series, with pre-sample values and
//! innovations set to zero.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::features::autocorrelation::z_score;
use crate::models::arima::diff::{
    differencing_polynomial, full_difference, integrate, lag_polynomial, poly_mul,
};
use crate::models::Forecaster;
use crate::utils::optimization::{
    invert_matrix, nelder_mead, numerical_hessian, NelderMeadConfig,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bound applied to every AR/MA coefficient during estimation.
const COEFFICIENT_BOUND: f64 = 0.99;

/// SARIMA order specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub cap_p: usize,
    /// Seasonal differencing order (D)
    pub cap_d: usize,
    /// Seasonal MA order (Q)
    pub cap_q: usize,
    /// Seasonal period (s)
    pub s: usize,
}

impl SARIMASpec {
    pub fn new(p: usize, d: usize, q: usize, cap_p: usize, cap_d: usize, cap_q: usize, s: usize) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// Whether any seasonal term is present.
    pub fn is_seasonal(&self) -> bool {
        self.cap_p + self.cap_d + self.cap_q > 0
    }

    /// Number of AR/MA coefficients (excluding the innovation variance).
    pub fn num_coefficients(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q
    }

    /// Number of estimated parameters including sigma².
    pub fn num_params(&self) -> usize {
        self.num_coefficients() + 1
    }

    /// Observations consumed by differencing.
    pub fn differencing_order(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Shortest series the model can be fitted to: one value must survive
    /// differencing.
    pub fn min_observations(&self) -> usize {
        self.differencing_order() + 1
    }

    /// Reject specifications that cannot describe a seasonal model.
    pub fn validate(&self) -> Result<()> {
        if self.is_seasonal() && self.s < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2 when seasonal terms are used, got {}",
                self.s
            )));
        }
        Ok(())
    }

    /// Parameter labels in estimation order, e.g. `ar.L1`, `ma.S.L12`, `sigma2`.
    pub fn param_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.num_params());
        names.extend((1..=self.p).map(|i| format!("ar.L{}", i)));
        names.extend((1..=self.q).map(|i| format!("ma.L{}", i)));
        names.extend((1..=self.cap_p).map(|i| format!("ar.S.L{}", i * self.s)));
        names.extend((1..=self.cap_q).map(|i| format!("ma.S.L{}", i * self.s)));
        names.push("sigma2".to_string());
        names
    }
}

impl Default for SARIMASpec {
    fn default() -> Self {
        Self::new(1, 1, 1, 1, 1, 1, 12)
    }
}

impl fmt::Display for SARIMASpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SARIMAX({}, {}, {})", self.p, self.d, self.q)?;
        if self.is_seasonal() {
            write!(
                f,
                "x({}, {}, {}, {})",
                self.cap_p, self.cap_d, self.cap_q, self.s
            )?;
        }
        Ok(())
    }
}

/// Fit statistics recorded by [`SARIMA::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub hqic: f64,
    /// Observations left after differencing.
    pub n_effective: usize,
    pub converged: bool,
    pub iterations: usize,
    /// Standard errors in [`SARIMASpec::param_names`] order; `NaN` when the
    /// Hessian could not be inverted.
    pub std_errors: Vec<f64>,
}

/// Seasonal ARIMA forecasting model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SARIMA {
    spec: SARIMASpec,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    sigma2: f64,
    /// Training data.
    series: Option<TimeSeries>,
    /// Differenced training values.
    differenced: Vec<f64>,
    /// Innovations on the differenced scale, one per differenced value.
    residuals: Option<Vec<f64>>,
    /// One-step in-sample predictions on the original scale.
    fitted: Option<Vec<f64>>,
    diagnostics: Option<FitDiagnostics>,
}

impl SARIMA {
    /// Create an unfitted model.
    pub fn new(spec: SARIMASpec) -> Self {
        Self {
            spec,
            ar: vec![],
            ma: vec![],
            seasonal_ar: vec![],
            seasonal_ma: vec![],
            sigma2: f64::NAN,
            series: None,
            differenced: vec![],
            residuals: None,
            fitted: None,
            diagnostics: None,
        }
    }

    /// Non-seasonal ARIMA(p, d, q).
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        Self::new(SARIMASpec::new(p, d, q, 0, 0, 0, 0))
    }

    pub fn spec(&self) -> SARIMASpec {
        self.spec
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Innovation variance.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn diagnostics(&self) -> Option<&FitDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// The series the model was fitted to.
    pub fn training_series(&self) -> Option<&TimeSeries> {
        self.series.as_ref()
    }

    /// All estimated parameters in [`SARIMASpec::param_names`] order.
    pub fn params(&self) -> Vec<f64> {
        let mut params = Vec::with_capacity(self.spec.num_params());
        params.extend_from_slice(&self.ar);
        params.extend_from_slice(&self.ma);
        params.extend_from_slice(&self.seasonal_ar);
        params.extend_from_slice(&self.seasonal_ma);
        params.push(self.sigma2);
        params
    }

    /// Split a flat coefficient vector into (ar, ma, seasonal ar, seasonal ma).
    fn split(spec: &SARIMASpec, coefficients: &[f64]) -> [Vec<f64>; 4] {
        let mut offset = 0;
        let mut take = |len: usize| {
            let part = coefficients[offset..offset + len].to_vec();
            offset += len;
            part
        };
        [
            take(spec.p),
            take(spec.q),
            take(spec.cap_p),
            take(spec.cap_q),
        ]
    }

    /// Expanded AR and MA lag polynomials for a coefficient vector.
    fn polynomials(spec: &SARIMASpec, coefficients: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let [ar, ma, sar, sma] = Self::split(spec, coefficients);
        let phi = poly_mul(
            &lag_polynomial(&ar, 1, -1.0),
            &lag_polynomial(&sar, spec.s.max(1), -1.0),
        );
        let theta = poly_mul(
            &lag_polynomial(&ma, 1, 1.0),
            &lag_polynomial(&sma, spec.s.max(1), 1.0),
        );
        (phi, theta)
    }

    /// Conditional innovations of `w` under the given polynomials.
    fn innovations(w: &[f64], phi: &[f64], theta: &[f64]) -> Vec<f64> {
        let mut e = vec![0.0; w.len()];
        for t in 0..w.len() {
            let mut pred = 0.0;
            for k in 1..phi.len().min(t + 1) {
                pred -= phi[k] * w[t - k];
            }
            for k in 1..theta.len().min(t + 1) {
                pred += theta[k] * e[t - k];
            }
            e[t] = w[t] - pred;
        }
        e
    }

    fn css(spec: &SARIMASpec, w: &[f64], coefficients: &[f64]) -> f64 {
        let (phi, theta) = Self::polynomials(spec, coefficients);
        let css: f64 = Self::innovations(w, &phi, &theta).iter().map(|e| e * e).sum();
        if css.is_finite() {
            css
        } else {
            f64::MAX
        }
    }

    /// Negative Gaussian log-likelihood with sigma² as the last parameter.
    fn negative_log_likelihood(spec: &SARIMASpec, w: &[f64], params: &[f64]) -> f64 {
        let n = w.len() as f64;
        let sigma2 = params[params.len() - 1];
        if sigma2 <= 0.0 {
            return f64::MAX;
        }
        let css = Self::css(spec, w, &params[..params.len() - 1]);
        0.5 * n * (2.0 * std::f64::consts::PI * sigma2).ln() + css / (2.0 * sigma2)
    }

    fn estimate(&mut self, w: &[f64]) -> Result<()> {
        let spec = self.spec;
        let k = spec.num_coefficients();

        let initial: Vec<f64> = [spec.p, spec.q, spec.cap_p, spec.cap_q]
            .iter()
            .flat_map(|&len| (0..len).map(|i| 0.1 / (i + 1) as f64))
            .collect();

        if Self::css(&spec, w, &initial) == f64::MAX {
            return Err(ForecastError::ComputationError(
                "sum of squares is not finite at the starting point".to_string(),
            ));
        }

        let bounds = vec![(-COEFFICIENT_BOUND, COEFFICIENT_BOUND); k];
        let config = NelderMeadConfig {
            max_iter: 500 * k.max(1),
            tolerance: 1e-10,
            ..Default::default()
        };
        let result = nelder_mead(
            |c| Self::css(&spec, w, c),
            &initial,
            Some(bounds.as_slice()),
            config,
        );

        if !result.converged {
            log::warn!(
                "maximum likelihood optimization failed to converge after {} iterations; using the last estimate",
                result.iterations
            );
        }

        let coefficients = result.optimal_point;
        let n = w.len() as f64;
        let sigma2 = (result.optimal_value / n).max(f64::MIN_POSITIVE);

        let [ar, ma, sar, sma] = Self::split(&spec, &coefficients);
        self.ar = ar;
        self.ma = ma;
        self.seasonal_ar = sar;
        self.seasonal_ma = sma;
        self.sigma2 = sigma2;

        let log_likelihood = -0.5 * n * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        let n_params = spec.num_params() as f64;

        let params = self.params();
        let hessian = numerical_hessian(|x| Self::negative_log_likelihood(&spec, w, x), &params);
        let std_errors = match invert_matrix(&hessian) {
            Some(cov) => (0..params.len())
                .map(|i| {
                    let v = cov[i][i];
                    if v.is_finite() && v > 0.0 {
                        v.sqrt()
                    } else {
                        f64::NAN
                    }
                })
                .collect(),
            None => {
                log::warn!("covariance matrix is singular; standard errors are unavailable");
                vec![f64::NAN; params.len()]
            }
        };

        self.diagnostics = Some(FitDiagnostics {
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * n_params,
            bic: -2.0 * log_likelihood + n_params * n.ln(),
            hqic: -2.0 * log_likelihood + 2.0 * n_params * n.ln().ln(),
            n_effective: w.len(),
            converged: result.converged,
            iterations: result.iterations,
            std_errors,
        });

        Ok(())
    }

    fn current_polynomials(&self) -> (Vec<f64>, Vec<f64>) {
        let params = self.params();
        Self::polynomials(&self.spec, &params[..params.len() - 1])
    }

    /// ψ-weights of the integrated model, used for forecast variance.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let (phi, theta) = self.current_polynomials();
        let delta = differencing_polynomial(self.spec.d, self.spec.cap_d, self.spec.s);
        let denominator = poly_mul(&phi, &delta);

        let mut psi = vec![0.0; horizon];
        for j in 0..horizon {
            let mut value = if j == 0 {
                1.0
            } else {
                theta.get(j).copied().unwrap_or(0.0)
            };
            for k in 1..denominator.len().min(j + 1) {
                value -= denominator[k] * psi[j - k];
            }
            psi[j] = value;
        }
        psi
    }

    /// Point predictions for the next `horizon` steps.
    fn forecast_values(&self, horizon: usize) -> Result<Vec<f64>> {
        let series = self.series.as_ref().ok_or(ForecastError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;
        let (phi, theta) = self.current_polynomials();

        let mut w = self.differenced.clone();
        let mut e = residuals.clone();
        for _ in 0..horizon {
            let t = w.len();
            let mut pred = 0.0;
            for k in 1..phi.len().min(t + 1) {
                pred -= phi[k] * w[t - k];
            }
            for k in 1..theta.len().min(t + 1) {
                pred += theta[k] * e[t - k];
            }
            w.push(pred);
            e.push(0.0);
        }

        let future_w = &w[self.differenced.len()..];
        Ok(integrate(
            future_w,
            series.values(),
            self.spec.d,
            self.spec.cap_d,
            self.spec.s,
        ))
    }
}

impl Default for SARIMA {
    fn default() -> Self {
        Self::new(SARIMASpec::default())
    }
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.spec.validate()?;
        if series.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        let needed = self.spec.min_observations();
        if series.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: series.len(),
            });
        }
        series.require_complete()?;

        let values = series.values();
        let w = full_difference(values, self.spec.d, self.spec.cap_d, self.spec.s);
        log::debug!(
            "fitting {} on {} observations ({} after differencing)",
            self.spec,
            values.len(),
            w.len()
        );

        self.estimate(&w)?;

        let (phi, theta) = self.current_polynomials();
        let residuals = Self::innovations(&w, &phi, &theta);
        let offset = self.spec.differencing_order();
        let mut fitted = vec![f64::NAN; values.len()];
        for (i, e) in residuals.iter().enumerate() {
            fitted[offset + i] = values[offset + i] - e;
        }

        self.differenced = w;
        self.residuals = Some(residuals);
        self.fitted = Some(fitted);
        self.series = Some(series.clone());
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let series = self.series.as_ref().ok_or(ForecastError::FitRequired)?;
        let values = self.forecast_values(horizon)?;
        Forecast::from_values(series.future_dates(horizon)?, values)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {}",
                level
            )));
        }
        let forecast = self.predict(horizon)?;
        let z = z_score(level);
        let psi = self.psi_weights(horizon);

        let mut cumulative = 0.0;
        let (lower, upper): (Vec<f64>, Vec<f64>) = forecast
            .values()
            .iter()
            .zip(psi.iter())
            .map(|(mean, weight)| {
                cumulative += weight * weight;
                let se = (self.sigma2 * cumulative).sqrt();
                (mean - z * se, mean + z * se)
            })
            .unzip();

        forecast.with_intervals(lower, upper, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SARIMA"
    }
}
