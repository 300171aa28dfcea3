//! Forecasting models and model files.

mod traits;

pub mod arima;
pub mod persist;

pub use arima::{ModelSummary, SARIMASpec, SARIMA};
pub use persist::{load_model, save_model, ModelFile};
pub use traits::Forecaster;
