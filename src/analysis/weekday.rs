//! Day-of-week aggregation.

use crate::core::TimeSeries;
use crate::features::basic::{finite_values, mean, median, standard_deviation};
use chrono::{Datelike, Weekday};

/// Monday-first order used for every weekday table and figure.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Reach statistics restricted to one weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayStats {
    pub weekday: Weekday,
    /// Number of non-missing observations that fell on this weekday.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `NaN` with fewer than two observations.
    pub std: f64,
}

impl WeekdayStats {
    pub fn name(&self) -> &'static str {
        weekday_name(self.weekday)
    }
}

/// Aggregate a series by weekday.
///
/// Always returns seven rows, Monday to Sunday. A weekday with no
/// observations keeps its row with `NaN` statistics.
pub fn weekday_stats(series: &TimeSeries) -> Vec<WeekdayStats> {
    let mut buckets: [Vec<f64>; 7] = Default::default();
    for (date, value) in series.observations() {
        buckets[date.weekday().num_days_from_monday() as usize].push(value);
    }

    WEEKDAYS
        .iter()
        .zip(buckets.iter())
        .map(|(&weekday, values)| {
            let values = finite_values(values);
            WeekdayStats {
                weekday,
                count: values.len(),
                mean: mean(&values),
                median: median(&values),
                std: standard_deviation(&values),
            }
        })
        .collect()
}
