//! Bayesian estimation models.
//!
//! State representations are modeled as structs.
//! Common Bayesian discrete system estimation operations are defined as traits so that trajectory
//! builders can drive an estimator without depending on its numerical implementation.

use na::{allocator::Allocator, DefaultAllocator, Dim, RealField, VectorN};
use nalgebra as na;

use crate::error::FilterResult;
use crate::gaussian::GaussianDistribution;

/// A state estimator.
pub trait Estimator<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// The estimator's estimate of the system's state.
    fn state(&self) -> FilterResult<VectorN<N, D>>;

    /// The estimator's estimate of the system's state as a Gaussian distribution.
    fn gaussian_state(&self) -> FilterResult<GaussianDistribution<N, D>>;
}

/// A functional predictor.
///
/// Uses a function model with additive noise.
pub trait FunctionPredictor<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// State prediction with a functional transition model and additive noise.
    fn predict(
        &mut self,
        g: &dyn Fn(&VectorN<N, D>) -> VectorN<N, D>,
        noise: &GaussianDistribution<N, D>,
    ) -> FilterResult<()>;
}

/// A functional observer.
///
/// Uses a function model, zero for a perfect reading, with zero mean additive noise.
pub trait FunctionObserver<N: RealField, D: Dim, ZD: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, ZD, ZD> + Allocator<N, ZD>,
{
    /// Observation with a functional residual model and additive noise.
    fn observe(
        &mut self,
        h: &dyn Fn(&VectorN<N, D>) -> VectorN<N, ZD>,
        noise: &GaussianDistribution<N, ZD>,
    ) -> FilterResult<()>;
}
