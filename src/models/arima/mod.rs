//! Seasonal ARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - SARIMA models with non-seasonal (p, d, q) and seasonal (P, D, Q)\[s\] terms
//! - Differencing and lag-polynomial helpers
//! - A printable fit summary with residual diagnostics

mod diff;
mod sarima;
mod summary;

pub use diff::{
    difference, differencing_polynomial, full_difference, integrate, seasonal_difference,
    suggest_differencing, suggest_seasonal_differencing,
};
pub use sarima::{FitDiagnostics, SARIMASpec, SARIMA};
pub use summary::{
    heteroskedasticity, jarque_bera, ljung_box, CoefficientRow, ModelSummary, TestResult,
};
