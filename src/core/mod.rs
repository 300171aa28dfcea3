//! Core data structures for dated series and forecasts.

mod forecast;
mod time_series;

pub use forecast::Forecast;
pub use time_series::{Frequency, TimeSeries};
