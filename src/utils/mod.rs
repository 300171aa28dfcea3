//! Numerical utilities shared by the models.

pub mod optimization;

pub use optimization::{
    invert_matrix, nelder_mead, numerical_hessian, NelderMeadConfig, NelderMeadResult,
};
