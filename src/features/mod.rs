//! Statistical features of a series.
//!
//! # Example
//!
//! ```
//! use reach_forecast::features::{basic, autocorrelation};
//!
//! let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//!
//! let m = basic::mean(&series);
//! assert_eq!(m, 3.0);
//!
//! let r = autocorrelation::acf(&series, 2);
//! assert_eq!(r.len(), 3);
//! ```

pub mod autocorrelation;
pub mod basic;

pub use autocorrelation::{
    acf, acf_correlogram, autocorrelation, default_lags, pacf, pacf_correlogram,
    partial_autocorrelation, Correlogram,
};
pub use basic::{
    finite_values, maximum, mean, median, minimum, moment_kurtosis, moment_skewness, quantile,
    standard_deviation, variance,
};
