//! # reach-forecast
//!
//! Daily reach analysis and forecasting.
//!
//! Loads a (date, reach) CSV file, draws exploratory charts, splits the
//! series into trend, seasonal and residual parts, fits a seasonal ARIMA
//! model, saves it and forecasts the following days.

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod analysis;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod seasonality;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::{PipelineConfig, SarimaConfig};
    pub use crate::core::{Forecast, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{Forecaster, SARIMASpec, SARIMA};
    pub use crate::render::{Figure, Renderer};
}
