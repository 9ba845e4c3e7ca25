#![allow(non_snake_case)]

//! Sigma points and weights of the scaled unscented transform.
//!
//! For a state of dimension n the 2n+1 sigma points are the mean and the symmetric pairs
//! mean + (±sqrt(n+lambda) * S_i) where S_i is column i of the covariance square root.

use nalgebra as na;
use na::{allocator::Allocator, storage::Storage, DefaultAllocator, Dim, MatrixN, RealField, VectorN, U1};

use crate::config::UnscentedParameters;
use crate::delta::DeltaModel;

/// Weights of the sigma points.
///
/// The central point has its own mean and covariance weight, the 2n symmetric points share one
/// weight for both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SigmaWeights<N: RealField> {
    /// lambda = alpha^2 (n + kappa) - n
    pub lambda: N,
    /// lambda / (n + lambda)
    pub mean_0: N,
    /// lambda / (n + lambda) + (1 - alpha^2 + beta)
    pub covariance_0: N,
    /// 1 / (2 (n + lambda))
    pub weight_i: N,
    /// sqrt(n + lambda), scale of the covariance square root columns
    pub spread: N,
    dim: usize,
}

impl<N: RealField> SigmaWeights<N> {
    pub fn new(dim: usize, parameters: &UnscentedParameters) -> Self {
        let n: N = na::convert(dim as f64);
        let alpha: N = na::convert(parameters.alpha);
        let beta: N = na::convert(parameters.beta);
        let kappa: N = na::convert(parameters.kappa);
        let two: N = na::convert(2.);

        let alpha_sq = num_traits::pow(alpha, 2);
        let lambda = alpha_sq * (n + kappa) - n;
        let n_lambda = n + lambda;

        SigmaWeights {
            lambda,
            mean_0: lambda / n_lambda,
            covariance_0: lambda / n_lambda + (N::one() - alpha_sq + beta),
            weight_i: N::one() / (two * n_lambda),
            spread: n_lambda.sqrt(),
            dim,
        }
    }

    /// Mean weight of sigma point 'i'.
    pub fn mean_weight(&self, i: usize) -> N {
        if i == 0 {
            self.mean_0
        } else {
            self.weight_i
        }
    }

    /// Covariance weight of sigma point 'i'.
    pub fn covariance_weight(&self, i: usize) -> N {
        if i == 0 {
            self.covariance_0
        } else {
            self.weight_i
        }
    }

    /// Number of sigma points, 2n+1.
    pub fn count(&self) -> usize {
        2 * self.dim + 1
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

/// Zero mean sigma offsets from a covariance square root.
///
/// The first offset is zero, followed by +spread*S_i, -spread*S_i for each column S_i.
/// Order does not matter as all but the first have the same weights.
pub fn sigma_offsets<N: RealField, D: Dim>(sqrt_covariance: &MatrixN<N, D>, spread: N) -> Vec<VectorN<N, D>>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    let n = sqrt_covariance.ncols();
    let mut W: Vec<VectorN<N, D>> = Vec::with_capacity(2 * n + 1);
    W.push(VectorN::zeros_generic(sqrt_covariance.data.shape().0, U1));
    for i in 0..n {
        let column: VectorN<N, D> = sqrt_covariance.column(i) * spread;
        let opposite = -&column;
        W.push(column);
        W.push(opposite);
    }
    W
}

/// Sigma points in state space, the mean composed with each offset.
///
/// The first point is the mean itself.
pub fn sigma_points<N: RealField, D: Dim, M: DeltaModel<N, D>>(
    mean: &VectorN<N, D>,
    offsets: &[VectorN<N, D>],
    delta: &M,
) -> Vec<VectorN<N, D>>
where
    DefaultAllocator: Allocator<N, D>,
{
    let mut X: Vec<VectorN<N, D>> = Vec::with_capacity(offsets.len());
    X.push(mean.clone());
    for w in offsets.iter().skip(1) {
        X.push(delta.add_delta(mean, w));
    }
    X
}
