#![allow(non_snake_case)]

//! Gaussian belief representation.
//!
//! A multivariate normal distribution as a mean vector and covariance (symmetric positive
//! semi-definite) matrix. Addition of two distributions is the convolution of independent
//! Gaussians: the means add and the covariances add.

use std::ops::Add;

use nalgebra as na;
use na::{allocator::Allocator, storage::Storage, DefaultAllocator, Dim, DimDiff, DimSub, MatrixN, RealField, VectorN, U1};
use rand_core::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::config::Tolerances;
use crate::error::FilterResult;
use crate::linalg::matrix_sqrt;

/// Gaussian distribution.
///
/// Linear representation as a mean vector and a covariance matrix, the dimensions of both are the
/// dimensions of the system.
#[derive(PartialEq, Clone)]
pub struct GaussianDistribution<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    mean: VectorN<N, D>,
    covariance: MatrixN<N, D>,
}

impl<N: RealField, D: Dim> GaussianDistribution<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    /// Creates a distribution from its mean and covariance.
    ///
    /// # Panics
    /// If the covariance is not square with the dimension of the mean.
    pub fn new(mean: VectorN<N, D>, covariance: MatrixN<N, D>) -> Self {
        assert!(
            covariance.nrows() == mean.nrows() && covariance.ncols() == mean.nrows(),
            "Covariance shape does not match the mean dimension."
        );
        GaussianDistribution { mean, covariance }
    }

    /// Zero mean and zero covariance.
    pub fn new_zero(d: D) -> Self {
        GaussianDistribution {
            mean: VectorN::zeros_generic(d, U1),
            covariance: MatrixN::zeros_generic(d, d),
        }
    }

    /// Uncorrelated distribution, the covariance is diagonal with the given variances.
    pub fn from_variances(mean: VectorN<N, D>, variances: &VectorN<N, D>) -> Self {
        let covariance = MatrixN::from_diagonal(variances);
        GaussianDistribution::new(mean, covariance)
    }

    /// Zero mean uncorrelated noise with the given variances.
    pub fn zero_mean(variances: &VectorN<N, D>) -> Self {
        let d = variances.data.shape().0;
        GaussianDistribution::from_variances(VectorN::zeros_generic(d, U1), variances)
    }

    pub fn mean(&self) -> &VectorN<N, D> {
        &self.mean
    }

    pub fn covariance(&self) -> &MatrixN<N, D> {
        &self.covariance
    }

    pub fn dim(&self) -> D {
        self.mean.data.shape().0
    }

    pub fn into_parts(self) -> (VectorN<N, D>, MatrixN<N, D>) {
        (self.mean, self.covariance)
    }
}

impl<N: RealField, D> GaussianDistribution<N, D>
where
    D: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, DimDiff<D, U1>>,
{
    /// Draw a sample, mean + sqrt(covariance).z with z standard normal.
    ///
    /// The covariance must pass the symmetry and positive semi-definite checks.
    pub fn sample<R: RngCore + ?Sized>(&self, rng: &mut R, tolerances: &Tolerances) -> FilterResult<VectorN<N, D>> {
        let sqrt_X = matrix_sqrt(&self.covariance, tolerances)?;
        let d = self.dim();
        let z = VectorN::<N, D>::from_fn_generic(d, U1, |_, _| {
            let s: f64 = StandardNormal.sample(&mut *rng);
            na::convert(s)
        });
        Ok(&self.mean + sqrt_X * z)
    }
}

/// Convolution of independent Gaussians.
impl<N: RealField, D: Dim> Add for GaussianDistribution<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    type Output = GaussianDistribution<N, D>;

    fn add(self, rhs: GaussianDistribution<N, D>) -> Self::Output {
        self + &rhs
    }
}

impl<'a, N: RealField, D: Dim> Add<&'a GaussianDistribution<N, D>> for GaussianDistribution<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    type Output = GaussianDistribution<N, D>;

    fn add(mut self, rhs: &'a GaussianDistribution<N, D>) -> Self::Output {
        assert_eq!(self.mean.nrows(), rhs.mean.nrows(), "Adding Gaussians of different dimension.");
        self.mean += &rhs.mean;
        self.covariance += &rhs.covariance;
        self
    }
}
