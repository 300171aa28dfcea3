//! Property-based tests for the analysis stages and the SARIMA model.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated daily series.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use reach_forecast::analysis::weekday_stats;
use reach_forecast::core::TimeSeries;
use reach_forecast::models::{load_model, save_model, Forecaster, SARIMASpec, SARIMA};
use reach_forecast::seasonality::AdditiveDecomposer;

/// Create a daily TimeSeries starting at `start`.
fn make_ts(start: NaiveDate, values: &[f64]) -> TimeSeries {
    let dates = (0..values.len())
        .map(|i| start + Duration::days(i as i64))
        .collect();
    TimeSeries::new(dates, values.to_vec()).unwrap()
}

fn start_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| NaiveDate::from_ymd_opt(2015, 1, 1).unwrap() + Duration::days(offset))
}

/// Strategy for generating reach-like values.
/// Adds a small ramp to avoid all-constant series.
fn valid_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        prop::collection::vec(1.0..1000.0_f64, len).prop_map(|mut v| {
            for (i, val) in v.iter_mut().enumerate() {
                *val += (i as f64) * 0.001;
            }
            v
        })
    })
}

/// Strategy for series with a weekly cycle and a trend.
fn weekly_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (
            100.0..5000.0_f64,
            -5.0..5.0_f64,
            prop::collection::vec(-200.0..200.0_f64, 7),
        )
            .prop_map(move |(base, slope, pattern)| {
                (0..len)
                    .map(|i| base + slope * i as f64 + pattern[i % 7])
                    .collect()
            })
    })
}

// =============================================================================
// Property: Forecast covers the requested days right after the history
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn sarima_forecast_dates_follow_history(
        period in prop::sample::select(vec![7usize, 12]),
        extra in 0usize..40,
        start in start_date_strategy(),
        seed_values in valid_values_strategy(64, 65),
        horizon in 1usize..40
    ) {
        let values = &seed_values[..2 * period + extra.min(64 - 2 * period)];
        let ts = make_ts(start, values);
        let mut model = SARIMA::new(SARIMASpec::new(1, 1, 1, 1, 1, 1, period));
        model.fit(&ts).unwrap();
        let forecast = model.predict(horizon).unwrap();

        prop_assert_eq!(forecast.horizon(), horizon);
        prop_assert_eq!(forecast.dates()[0], ts.last_date().unwrap() + Duration::days(1));
        for pair in forecast.dates().windows(2) {
            prop_assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
        for val in forecast.values() {
            prop_assert!(val.is_finite(), "Forecast contains non-finite value: {}", val);
        }
    }

    #[test]
    fn sarima_intervals_contain_point_forecast(
        values in valid_values_strategy(30, 80),
        horizon in 1usize..30
    ) {
        let ts = make_ts(NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(), &values);
        let mut model = SARIMA::new(SARIMASpec::new(1, 1, 1, 1, 1, 1, 7));
        model.fit(&ts).unwrap();
        let forecast = model.predict_with_intervals(horizon, 0.95).unwrap();

        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        for (i, point) in forecast.values().iter().enumerate() {
            prop_assert!(lower[i] <= *point && *point <= upper[i]);
        }
    }
}

// =============================================================================
// Property: Saving and loading a model does not change its forecasts
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn saved_model_forecasts_identically(
        values in weekly_values_strategy(24, 90),
        horizon in 1usize..45
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sarima_model.bin");
        let ts = make_ts(NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(), &values);

        let mut model = SARIMA::default();
        model.fit(&ts).unwrap();
        save_model(&model, &path).unwrap();
        let loaded = load_model(&path).unwrap();

        prop_assert_eq!(loaded.predict(horizon).unwrap(), model.predict(horizon).unwrap());
    }
}

// =============================================================================
// Property: Weekday table always has seven rows in Monday-first order
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn weekday_stats_has_seven_ordered_rows(
        values in prop::collection::vec(0.0..10000.0_f64, 0..30),
        start in start_date_strategy()
    ) {
        let ts = make_ts(start, &values);
        let stats = weekday_stats(&ts);

        prop_assert_eq!(stats.len(), 7);
        prop_assert_eq!(stats[0].weekday, Weekday::Mon);
        prop_assert_eq!(stats[6].weekday, Weekday::Sun);
        prop_assert_eq!(stats.iter().map(|s| s.count).sum::<usize>(), values.len());

        for row in &stats {
            let expected = ts.dates().iter().filter(|d| d.weekday() == row.weekday).count();
            prop_assert_eq!(row.count, expected);
            if expected == 0 {
                prop_assert!(row.mean.is_nan());
            }
        }
    }
}

// =============================================================================
// Property: Decomposition components add back up to the observations
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn decomposition_reconstructs_observed(
        values in weekly_values_strategy(14, 120)
    ) {
        let ts = make_ts(NaiveDate::from_ymd_opt(2022, 4, 1).unwrap(), &values);
        let decomposition = AdditiveDecomposer::new().decompose(&ts).unwrap();

        prop_assert_eq!(decomposition.period, 7);
        for i in 0..values.len() {
            let (t, s, r) = (
                decomposition.trend[i],
                decomposition.seasonal[i],
                decomposition.residual[i],
            );
            if t.is_finite() {
                let rebuilt = t + s + r;
                prop_assert!((rebuilt - values[i]).abs() <= 1e-9 * values[i].abs().max(1.0));
            } else {
                prop_assert!(r.is_nan());
            }
        }

        let pattern_sum: f64 = decomposition.seasonal[..7].iter().sum();
        prop_assert!(pattern_sum.abs() < 1e-6);
    }
}
