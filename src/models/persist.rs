//! Binary model files.
//!
//! A fitted [`SARIMA`] is written inside a small versioned envelope with
//! `bincode`. Loading restores a model that forecasts exactly like the one
//! that was saved.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};
use crate::models::arima::SARIMA;
use crate::models::Forecaster;

/// Envelope version written by [`save_model`].
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Serialized model wrapper.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelFile {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub model: SARIMA,
}

impl ModelFile {
    pub fn new(model: SARIMA) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            saved_at: Utc::now(),
            model,
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let envelope: ModelFile = bincode::deserialize_from(&mut reader)?;
        if envelope.format_version != MODEL_FORMAT_VERSION {
            return Err(ForecastError::Serialization(format!(
                "unsupported model format version {} in {} (expected {})",
                envelope.format_version,
                path.display(),
                MODEL_FORMAT_VERSION
            )));
        }
        Ok(envelope)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)?;
        Ok(())
    }
}

/// Write a fitted model to `path`, replacing any existing file.
pub fn save_model(model: &SARIMA, path: &Path) -> Result<()> {
    if !model.is_fitted() {
        return Err(ForecastError::FitRequired);
    }
    ModelFile::new(model.clone()).save_to_path(path)?;
    log::info!("saved {} to {}", model.spec(), path.display());
    Ok(())
}

/// Read a model previously written by [`save_model`].
pub fn load_model(path: &Path) -> Result<SARIMA> {
    let envelope = ModelFile::load_from_path(path)?;
    log::info!(
        "loaded {} from {} (saved {})",
        envelope.model.spec(),
        path.display(),
        envelope.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(envelope.model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TimeSeries;
    use crate::models::arima::SARIMASpec;
    use chrono::{Duration, NaiveDate};
    use tempfile::tempdir;

    fn fitted() -> SARIMA {
        let base = NaiveDate::from_ymd_opt(2022, 4, 1).unwrap();
        let values: Vec<f64> = (0..40)
            .map(|i| 200.0 + 2.0 * i as f64 + [15.0, -5.0, 0.0, 8.0, -12.0, 4.0, -10.0][i % 7])
            .collect();
        let dates = (0..40).map(|i| base + Duration::days(i as i64)).collect();
        let mut model = SARIMA::new(SARIMASpec::new(1, 1, 1, 1, 1, 1, 7));
        model.fit(&TimeSeries::new(dates, values).unwrap()).unwrap();
        model
    }

    #[test]
    fn round_trip_preserves_forecast() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sarima_model.bin");
        let model = fitted();

        save_model(&model, &path).unwrap();
        let loaded = load_model(&path).unwrap();

        assert_eq!(loaded.spec(), model.spec());
        assert_eq!(loaded.params(), model.params());
        assert_eq!(loaded.predict(30).unwrap(), model.predict(30).unwrap());
    }

    #[test]
    fn saving_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"stale").unwrap();
        save_model(&fitted(), &path).unwrap();
        assert!(load_model(&path).is_ok());
    }

    #[test]
    fn unfitted_model_is_not_saved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.bin");
        assert!(matches!(
            save_model(&SARIMA::default(), &path),
            Err(ForecastError::FitRequired)
        ));
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_model(&dir.path().join("absent.bin")),
            Err(ForecastError::Io(_))
        ));
    }

    #[test]
    fn corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corrupt.bin");
        std::fs::write(&path, [0xFFu8; 7]).unwrap();
        assert!(matches!(
            load_model(&path),
            Err(ForecastError::Serialization(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.bin");
        let mut envelope = ModelFile::new(fitted());
        envelope.format_version = MODEL_FORMAT_VERSION + 1;
        envelope.save_to_path(&path).unwrap();
        assert!(matches!(
            load_model(&path),
            Err(ForecastError::Serialization(_))
        ));
    }
}
