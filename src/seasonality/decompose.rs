//! Classical additive decomposition.
//!
//! Splits a series into:
//! - Trend: centred moving average over one seasonal cycle
//! - Seasonal: per-phase mean of the detrended series, centred on zero
//! - Residual: what is left after removing trend and seasonal

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::features::basic::{mean, variance};
use chrono::NaiveDate;

/// Result of an additive decomposition, aligned to the series dates.
///
/// `trend` and `residual` are `NaN` for the half-cycle at each end where the
/// centred moving average is undefined.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub dates: Vec<NaiveDate>,
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    pub period: usize,
}

impl Decomposition {
    /// The repeating seasonal pattern, one value per phase.
    pub fn seasonal_pattern(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }

    /// trend + seasonal + residual at every point where all three exist.
    pub fn reconstructed(&self) -> Vec<f64> {
        self.trend
            .iter()
            .zip(self.seasonal.iter())
            .zip(self.residual.iter())
            .map(|((t, s), r)| t + s + r)
            .collect()
    }

    /// Strength of seasonality in [0, 1]: 1 - Var(R) / Var(S + R).
    pub fn seasonal_strength(&self) -> f64 {
        let (remainder, seasonal_plus_remainder): (Vec<f64>, Vec<f64>) = self
            .defined_points()
            .map(|(_, s, r)| (r, s + r))
            .unzip();
        strength(&remainder, &seasonal_plus_remainder)
    }

    /// Strength of trend in [0, 1]: 1 - Var(R) / Var(T + R).
    pub fn trend_strength(&self) -> f64 {
        let (remainder, trend_plus_remainder): (Vec<f64>, Vec<f64>) = self
            .defined_points()
            .map(|(t, _, r)| (r, t + r))
            .unzip();
        strength(&remainder, &trend_plus_remainder)
    }

    fn defined_points(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.trend
            .iter()
            .zip(self.seasonal.iter())
            .zip(self.residual.iter())
            .filter(|((t, _), r)| t.is_finite() && r.is_finite())
            .map(|((t, s), r)| (*t, *s, *r))
    }
}

fn strength(remainder: &[f64], combined: &[f64]) -> f64 {
    let var_combined = variance(combined);
    if !var_combined.is_finite() || var_combined < 1e-10 {
        return 0.0;
    }
    (1.0 - variance(remainder) / var_combined).max(0.0)
}

/// Additive decomposition configuration.
#[derive(Debug, Clone, Default)]
pub struct AdditiveDecomposer {
    period: Option<usize>,
}

impl AdditiveDecomposer {
    /// Decomposer that infers the period from the series frequency.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decomposer with an explicit seasonal period.
    pub fn with_period(period: usize) -> Self {
        Self {
            period: Some(period),
        }
    }

    /// Period that will be used for `series`.
    pub fn resolve_period(&self, series: &TimeSeries) -> Result<usize> {
        let period = match self.period {
            Some(p) => p,
            None => series
                .infer_frequency(0.5)?
                .seasonal_period()
                .ok_or_else(|| {
                    ForecastError::FrequencyInference(
                        "spacing has no natural seasonal period; set one explicitly".to_string(),
                    )
                })?,
        };
        if period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        Ok(period)
    }

    /// Decompose the series.
    pub fn decompose(&self, series: &TimeSeries) -> Result<Decomposition> {
        if series.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if series.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: series.len(),
            });
        }
        series.require_complete()?;

        let period = self.resolve_period(series)?;
        let values = series.values();
        let n = values.len();
        if n < 2 * period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * period,
                got: n,
            });
        }

        let trend = centred_moving_average(values, period);
        let detrended: Vec<f64> = values.iter().zip(&trend).map(|(y, t)| y - t).collect();

        let mut phase_means: Vec<f64> = (0..period)
            .map(|phase| {
                let defined: Vec<f64> = detrended
                    .iter()
                    .skip(phase)
                    .step_by(period)
                    .copied()
                    .filter(|v| v.is_finite())
                    .collect();
                mean(&defined)
            })
            .collect();
        let centre = mean(&phase_means);
        for m in &mut phase_means {
            *m -= centre;
        }

        let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % period]).collect();
        let residual: Vec<f64> = values
            .iter()
            .zip(&trend)
            .zip(&seasonal)
            .map(|((y, t), s)| y - t - s)
            .collect();

        Ok(Decomposition {
            dates: series.dates().to_vec(),
            observed: values.to_vec(),
            trend,
            seasonal,
            residual,
            period,
        })
    }
}

/// Two-sided moving average spanning one period.
///
/// Even periods use the 2×m filter (half weights at both ends) so the window
/// stays centred.
fn centred_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let weights: Vec<f64> = if period % 2 == 0 {
        let mut w = vec![1.0 / period as f64; period + 1];
        w[0] /= 2.0;
        w[period] /= 2.0;
        w
    } else {
        vec![1.0 / period as f64; period]
    };

    let half = weights.len() / 2;
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if n < weights.len() {
        return out;
    }
    for i in half..n - half {
        out[i] = weights
            .iter()
            .enumerate()
            .map(|(k, w)| w * values[i + k - half])
            .sum();
    }
    out
}
