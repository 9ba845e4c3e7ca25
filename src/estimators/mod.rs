//! State estimators.
//!
//! The [`unscented`] estimator with its [`sigma`] point generation and manifold [`mean`] solver.

pub mod mean;
pub mod sigma;
pub mod unscented;

pub use unscented::UnscentedKalmanFilter;
