//! TimeSeries data structure for daily-dated observations.

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sampling frequency of a dated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Regular spacing that does not match a calendar unit, in days.
    Days(i64),
}

impl Frequency {
    /// Classify a modal spacing expressed in days.
    pub fn from_spacing_days(days: i64) -> Self {
        match days {
            1 => Frequency::Daily,
            7 => Frequency::Weekly,
            28..=31 => Frequency::Monthly,
            89..=92 => Frequency::Quarterly,
            365 | 366 => Frequency::Yearly,
            other => Frequency::Days(other),
        }
    }

    /// The natural seasonal cycle length for this frequency.
    ///
    /// Daily data cycles weekly, weekly data yearly, and so on. A spacing with
    /// no calendar meaning has no natural cycle.
    pub fn seasonal_period(&self) -> Option<usize> {
        match self {
            Frequency::Daily => Some(7),
            Frequency::Weekly => Some(52),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::Yearly => Some(1),
            Frequency::Days(_) => None,
        }
    }
}

/// A univariate series of values indexed by calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a series, validating that dates are strictly increasing and
    /// that every date has a value.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }

        for w in dates.windows(2) {
            if w[1] <= w[0] {
                return Err(ForecastError::TimestampError(format!(
                    "dates must be strictly increasing ({} follows {})",
                    w[1], w[0]
                )));
            }
        }

        Ok(Self {
            dates,
            values,
            label: None,
        })
    }

    /// Attach a human-readable name used in tables and figures.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Iterate over (date, value) observations.
    pub fn observations(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Return an error if the series contains NaN or infinite values.
    pub fn require_complete(&self) -> Result<()> {
        if self.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }
        Ok(())
    }

    /// Infer the sampling frequency from the modal spacing between dates.
    ///
    /// `tolerance` is the minimum share of gaps that must equal the modal gap.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Frequency> {
        if self.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in self.dates.windows(2) {
            *counts.entry((w[1] - w[0]).num_days()).or_insert(0) += 1;
        }

        // Ties resolve to the shortest spacing so the result is deterministic.
        let (modal_days, modal_count) = counts
            .iter()
            .max_by(|(da, ca), (db, cb)| ca.cmp(cb).then(db.cmp(da)))
            .map(|(&d, &c)| (d, c))
            .ok_or(ForecastError::FrequencyInference(
                "empty spacing data".to_string(),
            ))?;

        let total = self.len() - 1;
        if (modal_count as f64 / total as f64) < tolerance {
            return Err(ForecastError::FrequencyInference(
                "no unique modal spacing found".to_string(),
            ));
        }

        Ok(Frequency::from_spacing_days(modal_days))
    }

    /// Dates for the `horizon` days following the last observation.
    ///
    /// Always daily, whatever the spacing of the history.
    pub fn future_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let last = self.last_date().ok_or(ForecastError::EmptyData)?;
        Ok((1..=horizon as i64)
            .map(|step| last + Duration::days(step))
            .collect())
    }
}
