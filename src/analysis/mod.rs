//! Exploratory aggregations over a loaded series.

pub mod weekday;

pub use weekday::{weekday_name, weekday_stats, WeekdayStats, WEEKDAYS};
