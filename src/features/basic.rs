//! Basic descriptive statistics.
//!
//! Every function returns `NaN` when the input is too short for the
//! statistic to be defined, mirroring how the tables print missing cells.

use std::cmp::Ordering;

/// Returns the arithmetic mean.
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// Returns the sample variance (n - 1 denominator).
pub fn variance(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return f64::NAN;
    }
    let m = mean(series);
    series.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (series.len() - 1) as f64
}

/// Returns the sample standard deviation.
pub fn standard_deviation(series: &[f64]) -> f64 {
    variance(series).sqrt()
}

/// Returns the median value.
pub fn median(series: &[f64]) -> f64 {
    quantile(series, 0.5)
}

/// Returns the minimum value.
pub fn minimum(series: &[f64]) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    series.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Returns the maximum value.
pub fn maximum(series: &[f64]) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    series.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Returns the value at quantile `q` using linear interpolation between
/// the closest ranks.
pub fn quantile(series: &[f64], q: f64) -> f64 {
    if series.is_empty() {
        return f64::NAN;
    }
    let sorted = sorted(series);
    quantile_sorted(&sorted, q)
}

/// Like [`quantile`], for input that is already sorted ascending.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Biased (moment) skewness: m3 / m2^1.5.
pub fn moment_skewness(series: &[f64]) -> f64 {
    if series.len() < 3 {
        return f64::NAN;
    }
    let (m2, m3, _) = central_moments(series);
    if m2 < 1e-300 {
        return 0.0;
    }
    m3 / m2.powf(1.5)
}

/// Biased (moment) kurtosis: m4 / m2^2. A normal sample is near 3.
pub fn moment_kurtosis(series: &[f64]) -> f64 {
    if series.len() < 4 {
        return f64::NAN;
    }
    let (m2, _, m4) = central_moments(series);
    if m2 < 1e-300 {
        return f64::NAN;
    }
    m4 / (m2 * m2)
}

/// Values that are neither NaN nor infinite.
pub fn finite_values(series: &[f64]) -> Vec<f64> {
    series.iter().copied().filter(|v| v.is_finite()).collect()
}

fn central_moments(series: &[f64]) -> (f64, f64, f64) {
    let n = series.len() as f64;
    let m = mean(series);
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for x in series {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

fn sorted(series: &[f64]) -> Vec<f64> {
    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}
