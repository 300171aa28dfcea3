//! Forecast result structure for holding dated predictions.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A forecast: one point prediction per future date, with optional
/// prediction-interval bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    dates: Vec<NaiveDate>,
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
    /// Coverage of the interval bounds, e.g. 0.95.
    level: Option<f64>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from dates and point predictions.
    pub fn from_values(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }
        Ok(Self {
            dates,
            point: values,
            lower: None,
            upper: None,
            level: None,
        })
    }

    /// Attach lower/upper bounds at the given coverage level.
    pub fn with_intervals(mut self, lower: Vec<f64>, upper: Vec<f64>, level: f64) -> Result<Self> {
        for bound in [&lower, &upper] {
            if bound.len() != self.point.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: self.point.len(),
                    got: bound.len(),
                });
            }
        }
        self.lower = Some(lower);
        self.upper = Some(upper);
        self.level = Some(level);
        Ok(self)
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Point predictions (predicted mean).
    pub fn values(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    /// Iterate over (date, predicted mean) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.point.iter().copied())
    }

    /// Largest absolute difference between two forecasts' point predictions.
    ///
    /// Forecasts over different dates are not comparable and yield an error.
    pub fn max_abs_diff(&self, other: &Forecast) -> Result<f64> {
        if self.dates != other.dates {
            return Err(ForecastError::InvalidParameter(
                "forecasts cover different dates".to_string(),
            ));
        }
        Ok(self
            .point
            .iter()
            .zip(other.point.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }
}
