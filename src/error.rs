//! Error types for the reach-forecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while loading, analysing or forecasting a series.
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error (unparseable, null or duplicated dates).
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// A cell could not be read as a number.
    #[error("invalid value in column '{column}' at row {row}: '{value}'")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    /// A required column is absent from the input header.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Model file could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),

    /// A figure could not be drawn.
    #[error("render error: {0}")]
    Render(String),
}

impl From<bincode::Error> for ForecastError {
    fn from(err: bincode::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ForecastError {
    fn from(err: serde_yaml::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}
