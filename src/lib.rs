//! Pose estimation for simultaneous localization and mapping.
//!
//! A SLAM trajectory builder tracks the pose of a robot as a probabilistic belief, updated by
//! prediction with a motion model and by observation of sensor readings. The motion and sensor
//! models are non-linear and the pose contains orientations which do not compose additively.
//!
//! This library implements an Unscented Kalman filter for such systems. It is numerically and
//! dimensionally generic using nalgebra: the scalar is any `RealField` and the state dimension is
//! either fixed at compile time or `Dynamic`.
//!
//! The belief is a [`GaussianDistribution`]. The state manifold is defined by a [`DeltaModel`],
//! which composes a state with a delta and computes the delta between two states.
//! Covariances are checked to be symmetric and positive semi-definite on every update; violations
//! are reported as a [`FilterError`] and the belief is left unchanged.
//!
//! ```
//! use nalgebra::{Matrix1, Vector1};
//! use pose_estimate::{GaussianDistribution, UnscentedKalmanFilter};
//!
//! let belief = GaussianDistribution::new(Vector1::new(0f64), Matrix1::new(1.));
//! let mut filter = UnscentedKalmanFilter::new(belief).unwrap();
//!
//! let noise = GaussianDistribution::new(Vector1::new(0f64), Matrix1::new(1.));
//! filter.predict(|x| *x, &noise).unwrap();
//! filter.observe(|x| *x, &noise).unwrap();
//! assert!((filter.belief().covariance()[(0, 0)] - 2. / 3.).abs() < 1e-6);
//! ```
//!
//! [`GaussianDistribution`]: gaussian/struct.GaussianDistribution.html
//! [`DeltaModel`]: delta/trait.DeltaModel.html
//! [`FilterError`]: error/enum.FilterError.html

pub mod config;
pub mod delta;
pub mod error;
pub mod estimators;
pub mod gaussian;
pub mod linalg;
pub mod models;
pub mod transform;

pub use config::{FilterConfig, MeanSolverSettings, Tolerances, UnscentedParameters};
pub use delta::{DeltaFn, DeltaModel, Euclidean, HeadingDelta, RotationVectorDelta};
pub use error::{FilterError, FilterResult, MeanSolverFailure};
pub use estimators::UnscentedKalmanFilter;
pub use gaussian::GaussianDistribution;
