//! Differencing and lag-polynomial utilities for seasonal ARIMA models.
//!
//! Lag polynomials are stored as coefficient vectors where index `k` holds
//! the coefficient of `B^k`; index 0 is always 1.

use crate::features::basic::variance;

/// Apply differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    seasonal_difference(series, d, 1)
}

/// Apply seasonal differencing `(1 - B^period)^d`.
///
/// Each pass shortens the series by `period`; a series too short for another
/// pass comes back empty.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Apply `(1 - B)^d (1 - B^period)^seasonal_d`.
pub fn full_difference(series: &[f64], d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let seasonal = if seasonal_d > 0 {
        seasonal_difference(series, seasonal_d, period)
    } else {
        series.to_vec()
    };
    difference(&seasonal, d)
}

/// Multiply two lag polynomials.
pub fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Lag polynomial `1 + sign * (c_1 B^step + c_2 B^(2 step) + ...)`.
///
/// AR factors use `sign = -1`, MA factors `sign = +1`.
pub fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// The polynomial `(1 - B)^d (1 - B^period)^seasonal_d`.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    for _ in 0..seasonal_d {
        poly = poly_mul(&poly, &lag_polynomial(&[1.0], period, -1.0));
    }
    poly
}

/// Undo differencing for values that continue `history`.
///
/// `forecast_diff` are values on the differenced scale for the steps
/// immediately after `history`. Each level is rebuilt with
/// `y_t = w_t - sum_{k>=1} delta_k y_{t-k}` where `delta` is the differencing
/// polynomial, so `history` must hold at least `delta.len() - 1` values.
pub fn integrate(
    forecast_diff: &[f64],
    history: &[f64],
    d: usize,
    seasonal_d: usize,
    period: usize,
) -> Vec<f64> {
    let delta = differencing_polynomial(d, seasonal_d, period);
    let order = delta.len() - 1;
    if order == 0 {
        return forecast_diff.to_vec();
    }

    let mut extended = history.to_vec();
    for &w in forecast_diff {
        let t = extended.len();
        let mut y = w;
        for k in 1..=order.min(t) {
            y -= delta[k] * extended[t - k];
        }
        extended.push(y);
    }
    extended.split_off(history.len())
}

/// Suggest a non-seasonal differencing order (0, 1 or 2) from how much each
/// difference shrinks the variance.
pub fn suggest_differencing(series: &[f64]) -> usize {
    if series.len() < 3 {
        return 0;
    }

    let var_0 = variance(series);
    let diff_1 = difference(series, 1);
    let var_1 = variance(&diff_1);

    if var_0 > 0.0 && var_1 / var_0 < 0.9 {
        let diff_2 = difference(&diff_1, 1);
        if diff_2.len() >= 2 {
            let var_2 = variance(&diff_2);
            if var_2 / var_1 < 0.9 && var_2 < var_0 {
                return 2;
            }
        }
        return 1;
    }

    0
}

/// Suggest a seasonal differencing order (0 or 1): 1 when differencing at
/// the seasonal lag removes at least 30% of the variance.
pub fn suggest_seasonal_differencing(series: &[f64], period: usize) -> usize {
    if period < 2 || series.len() < 2 * period {
        return 0;
    }
    let diffs = seasonal_difference(series, 1, period);
    let orig_var = variance(series);
    let diff_var = variance(&diffs);

    if orig_var.is_finite() && diff_var < orig_var * 0.7 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_orders() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 0), series);
        assert_eq!(difference(&series, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
        assert!(difference(&[], 1).is_empty());
    }

    #[test]
    fn seasonal_difference_basic() {
        let series = vec![
            100.0, 120.0, 80.0, 90.0, // Year 1
            110.0, 130.0, 90.0, 100.0, // Year 2
        ];
        assert_eq!(
            seasonal_difference(&series, 1, 4),
            vec![10.0, 10.0, 10.0, 10.0]
        );
        assert!(seasonal_difference(&series, 2, 4).is_empty());
    }

    #[test]
    fn full_difference_applies_both_operators() {
        let series: Vec<f64> = (0..12).map(|i| (i * i) as f64).collect();
        let w = full_difference(&series, 1, 1, 3);
        // (1 - B^3) i^2 = 6i - 9, then (1 - B) gives 6
        assert_eq!(w.len(), 12 - 3 - 1);
        assert!(w.iter().all(|v| (*v - 6.0).abs() < 1e-12));
    }

    #[test]
    fn poly_mul_expands_products() {
        // (1 - B)(1 + B) = 1 - B^2
        assert_eq!(poly_mul(&[1.0, -1.0], &[1.0, 1.0]), vec![1.0, 0.0, -1.0]);
    }

    #[test]
    fn lag_polynomial_places_coefficients_at_seasonal_lags() {
        assert_eq!(
            lag_polynomial(&[0.5, 0.25], 2, -1.0),
            vec![1.0, 0.0, -0.5, 0.0, -0.25]
        );
    }

    #[test]
    fn differencing_polynomial_for_sarima_111_111_12() {
        let delta = differencing_polynomial(1, 1, 12);
        assert_eq!(delta.len(), 14);
        assert_eq!(delta[0], 1.0);
        assert_eq!(delta[1], -1.0);
        assert_eq!(delta[12], -1.0);
        assert_eq!(delta[13], 1.0);
        assert!(delta[2..12].iter().all(|c| *c == 0.0));
    }

    #[test]
    fn integrate_reverses_first_difference() {
        let original = vec![10.0, 12.0, 15.0, 19.0, 24.0];
        let integrated = integrate(&[6.0, 7.0], &original, 1, 0, 0);
        assert_relative_eq!(integrated[0], 30.0, epsilon = 1e-10);
        assert_relative_eq!(integrated[1], 37.0, epsilon = 1e-10);
    }

    #[test]
    fn integrate_reverses_combined_differencing() {
        let series: Vec<f64> = (0..30)
            .map(|i| 50.0 + 0.7 * i as f64 + [3.0, -1.0, 0.5, -2.5][i % 4])
            .collect();
        let (history, future) = series.split_at(20);

        let w = full_difference(&series, 1, 1, 4);
        let future_w = &w[w.len() - future.len()..];
        let rebuilt = integrate(future_w, history, 1, 1, 4);

        for (a, b) in rebuilt.iter().zip(future) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn integrate_order_zero_is_identity() {
        assert_eq!(integrate(&[1.0, 2.0], &[5.0], 0, 0, 12), vec![1.0, 2.0]);
    }

    #[test]
    fn suggest_differencing_levels() {
        let stationary = vec![1.0, 0.5, 1.2, 0.8, 1.1, 0.9, 1.0, 1.1];
        assert_eq!(suggest_differencing(&stationary), 0);

        let trend: Vec<f64> = (0..20).map(|i| 10.0 + 2.0 * i as f64).collect();
        assert!(suggest_differencing(&trend) >= 1);
    }

    #[test]
    fn suggest_seasonal_differencing_detects_cycle() {
        let seasonal: Vec<f64> = (0..42).map(|i| [10.0, -5.0, 3.0, 0.0, -8.0, 6.0, -6.0][i % 7]).collect();
        assert_eq!(suggest_seasonal_differencing(&seasonal, 7), 1);
        assert_eq!(suggest_seasonal_differencing(&seasonal[..10], 7), 0);
    }
}
