//! Seasonal decomposition.
//!
//! Classical additive decomposition into trend, seasonal and residual
//! components.

mod decompose;

pub use decompose::{AdditiveDecomposer, Decomposition};
