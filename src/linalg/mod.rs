//! Linear algebra support for the estimators.

pub mod symmetric;

pub use symmetric::{check_covariance, check_non_negative_definite, check_symmetric, matrix_sqrt};
