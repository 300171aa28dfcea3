//! Autocorrelation and partial autocorrelation with confidence bands.
//!
//! These feed the correlogram figures used to pick SARIMA orders by eye.

use super::basic::mean;
use statrs::distribution::{ContinuousCDF, Normal};

/// Correlation values for lags `0..=max_lag` plus the half-width of the
/// confidence band around zero at each lag.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlogram {
    pub values: Vec<f64>,
    pub band: Vec<f64>,
    /// Coverage of the band, e.g. 0.95.
    pub level: f64,
}

impl Correlogram {
    /// Largest lag reported.
    pub fn max_lag(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Lags (excluding 0) whose correlation falls outside the band.
    pub fn significant_lags(&self) -> Vec<usize> {
        self.values
            .iter()
            .zip(self.band.iter())
            .enumerate()
            .skip(1)
            .filter(|(_, (v, b))| v.abs() > **b)
            .map(|(lag, _)| lag)
            .collect()
    }
}

/// Default number of lags for a series of length `n`:
/// `min(ceil(10 * log10(n)), n / 2)`.
pub fn default_lags(n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let by_log = (10.0 * (n as f64).log10()).ceil() as usize;
    by_log.min(n / 2)
}

/// Returns the autocorrelation at a specific lag.
///
/// # Arguments
/// * `series` - Input time series
/// * `lag` - Lag value
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    if series.len() <= lag {
        return f64::NAN;
    }

    let m = mean(series);
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &x) in series.iter().enumerate() {
        denominator += (x - m).powi(2);
        if i >= lag {
            numerator += (x - m) * (series[i - lag] - m);
        }
    }

    if denominator < 1e-10 {
        return 0.0;
    }

    numerator / denominator
}

/// Autocorrelations for lags `0..=max_lag`.
pub fn acf(series: &[f64], max_lag: usize) -> Vec<f64> {
    (0..=max_lag).map(|k| autocorrelation(series, k)).collect()
}

/// Partial autocorrelations for lags `0..=max_lag` using Durbin-Levinson
/// recursion on the sample autocorrelations.
///
/// Lags the recursion cannot reach (too-short series or a singular step)
/// are `NaN`.
pub fn pacf(series: &[f64], max_lag: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; max_lag + 1];
    out[0] = 1.0;
    if max_lag == 0 || series.len() <= max_lag {
        return out;
    }

    let r = acf(series, max_lag);
    let mut phi_prev: Vec<f64> = Vec::with_capacity(max_lag);

    for k in 1..=max_lag {
        let (num, denom) = phi_prev.iter().enumerate().fold(
            (r[k], 1.0),
            |(num, denom), (j, &phi)| (num - phi * r[k - 1 - j], denom - phi * r[j + 1]),
        );
        if denom.abs() < 1e-10 {
            break;
        }
        let phi_kk = num / denom;

        let mut phi_next: Vec<f64> = (0..phi_prev.len())
            .map(|j| phi_prev[j] - phi_kk * phi_prev[phi_prev.len() - 1 - j])
            .collect();
        phi_next.push(phi_kk);

        out[k] = phi_kk;
        phi_prev = phi_next;
    }

    out
}

/// Returns the partial autocorrelation at a specific lag.
pub fn partial_autocorrelation(series: &[f64], lag: usize) -> f64 {
    pacf(series, lag)[lag]
}

/// ACF correlogram with Bartlett's-formula confidence band.
pub fn acf_correlogram(series: &[f64], max_lag: usize, level: f64) -> Correlogram {
    let values = acf(series, max_lag);
    let n = series.len() as f64;
    let z = z_score(level);

    let mut band = Vec::with_capacity(values.len());
    let mut cumulative = 0.0;
    for (lag, r) in values.iter().enumerate() {
        if lag == 0 {
            band.push(0.0);
            continue;
        }
        band.push(z * ((1.0 + 2.0 * cumulative) / n).sqrt());
        if r.is_finite() {
            cumulative += r * r;
        }
    }

    Correlogram {
        values,
        band,
        level,
    }
}

/// PACF correlogram with the white-noise band `z / sqrt(n)`.
pub fn pacf_correlogram(series: &[f64], max_lag: usize, level: f64) -> Correlogram {
    let values = pacf(series, max_lag);
    let half = z_score(level) / (series.len() as f64).sqrt();
    let band = (0..values.len())
        .map(|lag| if lag == 0 { 0.0 } else { half })
        .collect();
    Correlogram {
        values,
        band,
        level,
    }
}

/// Two-sided standard-normal critical value for a coverage level.
pub(crate) fn z_score(level: f64) -> f64 {
    Normal::new(0.0, 1.0)
        .map(|n| n.inverse_cdf(0.5 + level / 2.0))
        .unwrap_or(1.959963984540054)
}
