//! Pipeline settings, loadable from YAML.
//!
//! ```yaml
//! input: Instagram-Reach.csv
//! forecast_horizon: 30
//! model:
//!   p: 1
//!   d: 1
//!   q: 1
//!   seasonal_p: 1
//!   seasonal_d: 1
//!   seasonal_q: 1
//!   seasonal_period: 12
//! ```
//!
//! Every key is optional.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::arima::SARIMASpec;
use crate::render::ImageFormat;

/// SARIMA orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarimaConfig {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub seasonal_period: usize,
}

impl Default for SarimaConfig {
    fn default() -> Self {
        Self {
            p: 1,
            d: 1,
            q: 1,
            seasonal_p: 1,
            seasonal_d: 1,
            seasonal_q: 1,
            seasonal_period: 12,
        }
    }
}

impl SarimaConfig {
    pub fn to_spec(&self) -> SARIMASpec {
        SARIMASpec::new(
            self.p,
            self.d,
            self.q,
            self.seasonal_p,
            self.seasonal_d,
            self.seasonal_q,
            self.seasonal_period,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub date_column: String,
    pub value_column: String,
    /// Name used in chart titles and axis labels.
    pub series_label: String,
    pub model_path: PathBuf,
    pub output_dir: PathBuf,
    pub image_format: ImageFormat,
    /// Decomposition period; inferred from the data when absent.
    pub decomposition_period: Option<usize>,
    /// Correlogram lag count; `min(ceil(10 log10 n), n / 2)` when absent.
    pub acf_lags: Option<usize>,
    pub forecast_horizon: usize,
    /// Coverage of the forecast intervals.
    pub interval_level: f64,
    pub model: SarimaConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("Instagram-Reach.csv"),
            date_column: "Date".to_string(),
            value_column: "Instagram reach".to_string(),
            series_label: "Instagram Reach".to_string(),
            model_path: PathBuf::from("sarima_model.bin"),
            output_dir: PathBuf::from("plots"),
            image_format: ImageFormat::Png,
            decomposition_period: None,
            acf_lags: None,
            forecast_horizon: 30,
            interval_level: 0.95,
            model: SarimaConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForecastError;

    #[test]
    fn defaults_reproduce_reach_model() {
        let config = PipelineConfig::default();
        assert_eq!(config.forecast_horizon, 30);
        assert_eq!(config.model_path, PathBuf::from("sarima_model.bin"));
        assert_eq!(config.model.to_spec(), SARIMASpec::default());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = PipelineConfig::from_yaml(
            "forecast_horizon: 14\nimage_format: svg\nmodel:\n  seasonal_period: 7\n",
        )
        .unwrap();
        assert_eq!(config.forecast_horizon, 14);
        assert_eq!(config.image_format, ImageFormat::Svg);
        assert_eq!(config.model.seasonal_period, 7);
        assert_eq!(config.model.p, 1);
        assert_eq!(config.value_column, "Instagram reach");
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(PipelineConfig::from_yaml("{}").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        assert!(matches!(
            PipelineConfig::from_yaml("forecast_horizon: soon"),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            PipelineConfig::load("/no/such/config.yaml"),
            Err(ForecastError::Io(_))
        ));
    }
}
