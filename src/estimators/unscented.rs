#![allow(non_snake_case)]

//! Julier-Uhlmann 'Unscented' state estimation on state manifolds.
//!
//! A discrete Bayesian estimator that uses a [`GaussianDistribution`] belief of the system.
//! The scaled 'Unscented' transform is used for non-linear state predictions and observations.
//!
//! States may be non-additive, for example when they contain orientations. A [`DeltaModel`]
//! supplies the composition of a state with a delta and the delta between states; the predicted
//! mean is then the weighted mean under that delta metric rather than a weighted sum.
//! Observations are functions that are zero for a perfect noiseless reading, so the innovation is
//! always 0 - predicted observation.
//!
//! We follow the nomenclature from Thrun, S. et al., Probabilistic Robotics, 2006, extended to
//! non-additive states as in Kraft, E., A Quaternion-based Unscented Kalman Filter for Orientation
//! Tracking.
//!
//! [`GaussianDistribution`]: ../../gaussian/struct.GaussianDistribution.html
//! [`DeltaModel`]: ../../delta/trait.DeltaModel.html

use nalgebra as na;
use na::{allocator::Allocator, DefaultAllocator, Dim, DimDiff, DimSub, MatrixMN, MatrixN, RealField, VectorN, U1};
use tracing::{debug, warn};

use super::mean::weighted_mean;
use super::sigma::{sigma_offsets, sigma_points, SigmaWeights};
use crate::config::FilterConfig;
use crate::delta::{DeltaModel, Euclidean};
use crate::error::{FilterError, FilterResult};
use crate::gaussian::GaussianDistribution;
use crate::linalg::symmetric::to_f64;
use crate::linalg::{check_covariance, check_non_negative_definite, check_symmetric, matrix_sqrt};
use crate::models::{Estimator, FunctionObserver, FunctionPredictor};

/// Unscented Kalman filter.
///
/// Owns the belief and the delta model of the state. Every successful [`predict`] or [`observe`]
/// replaces the belief, a failed one leaves it unchanged.
///
/// [`predict`]: #method.predict
/// [`observe`]: #method.observe
pub struct UnscentedKalmanFilter<N: RealField, D: Dim, M = Euclidean>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    belief: GaussianDistribution<N, D>,
    delta_model: M,
    weights: SigmaWeights<N>,
    config: FilterConfig,
}

impl<N: RealField, D> UnscentedKalmanFilter<N, D, Euclidean>
where
    D: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, DimDiff<D, U1>>,
{
    /// Filter of a Euclidean state.
    pub fn new(initial_belief: GaussianDistribution<N, D>) -> FilterResult<Self> {
        UnscentedKalmanFilter::with_delta(initial_belief, Euclidean)
    }
}

impl<N: RealField, D, M: DeltaModel<N, D>> UnscentedKalmanFilter<N, D, M>
where
    D: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, DimDiff<D, U1>>,
{
    /// Filter of a state composed by 'delta_model'.
    pub fn with_delta(initial_belief: GaussianDistribution<N, D>, delta_model: M) -> FilterResult<Self> {
        UnscentedKalmanFilter::with_config(initial_belief, delta_model, FilterConfig::default())
    }

    /// Filter with explicit unscented parameters and tolerances.
    ///
    /// The configuration and the delta model are validated for the state dimension, and the
    /// initial covariance must be symmetric and positive semi-definite.
    pub fn with_config(
        initial_belief: GaussianDistribution<N, D>,
        delta_model: M,
        config: FilterConfig,
    ) -> FilterResult<Self> {
        let n = initial_belief.mean().nrows();
        config.validate(n)?;
        delta_model.validate(n)?;
        check_covariance(initial_belief.covariance(), &config.tolerances)?;

        let weights = SigmaWeights::new(n, &config.parameters);
        debug!(dimension = n, lambda = ?weights.lambda, "unscented filter initialised");

        Ok(UnscentedKalmanFilter {
            belief: initial_belief,
            delta_model,
            weights,
            config,
        })
    }

    /// The current belief.
    pub fn belief(&self) -> &GaussianDistribution<N, D> {
        &self.belief
    }

    pub fn weights(&self) -> &SigmaWeights<N> {
        &self.weights
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn delta_model(&self) -> &M {
        &self.delta_model
    }

    /// Prediction (control) step.
    ///
    /// 'g' is the possibly non-linear state transition, any control input must be included in it.
    /// 'epsilon' is the additive combination of control and model noise.
    pub fn predict<G>(&mut self, g: G, epsilon: &GaussianDistribution<N, D>) -> FilterResult<()>
    where
        G: Fn(&VectorN<N, D>) -> VectorN<N, D>,
    {
        let tolerances = &self.config.tolerances;
        check_symmetric(epsilon.covariance(), tolerances.symmetry)?;
        check_non_negative_definite(epsilon.covariance(), tolerances.negative_eigenvalue)?;

        // State mean and matrix root of its covariance
        let mu = self.belief.mean();
        let sqrt_sigma = matrix_sqrt(self.belief.covariance(), tolerances)?;

        // Predict the sigma points with the transition
        let W = sigma_offsets(&sqrt_sigma, self.weights.spread);
        let Y: Vec<VectorN<N, D>> = sigma_points(mu, &W, &self.delta_model).iter().map(|x| g(x)).collect();

        let new_mu = weighted_mean(&Y, &self.weights, &self.delta_model, &self.config.mean_solver)?;

        let d = self.belief.dim();
        let mut new_sigma = MatrixN::<N, D>::zeros_generic(d, d);
        for (i, y) in Y.iter().enumerate() {
            let dy = self.delta_model.compute_delta(&new_mu, y);
            new_sigma.ger(self.weights.covariance_weight(i), &dy, &dy, N::one());
        }
        check_symmetric(&new_sigma, tolerances.symmetry)?;

        self.belief = GaussianDistribution::new(new_mu, new_sigma) + epsilon;
        debug!(covariance_trace = ?self.belief.covariance().trace(), "predict");

        Ok(())
    }

    /// Observation step.
    ///
    /// 'h' maps the state into an observation residual that is zero for a perfect noiseless
    /// reading, the sensor reading must be included in it. 'delta' is the measurement noise and
    /// must have zero mean.
    pub fn observe<ZD, H>(&mut self, h: H, delta: &GaussianDistribution<N, ZD>) -> FilterResult<()>
    where
        ZD: Dim + DimSub<U1>,
        H: Fn(&VectorN<N, D>) -> VectorN<N, ZD>,
        DefaultAllocator: Allocator<N, ZD, ZD> + Allocator<N, ZD> + Allocator<N, D, ZD> + Allocator<N, DimDiff<ZD, U1>>,
    {
        let tolerances = &self.config.tolerances;
        check_symmetric(delta.covariance(), tolerances.symmetry)?;
        check_non_negative_definite(delta.covariance(), tolerances.negative_eigenvalue)?;
        let noise_mean_norm = delta.mean().norm();
        if !(noise_mean_norm <= na::convert(tolerances.noise_mean)) {
            warn!(norm = ?noise_mean_norm, "measurement noise mean is not zero");
            return Err(FilterError::NonZeroMeanNoise {
                norm: to_f64(noise_mean_norm),
            });
        }

        // State mean and matrix root of its covariance
        let mu = self.belief.mean();
        let sqrt_sigma = matrix_sqrt(self.belief.covariance(), tolerances)?;

        // Zero mean sigma points W are all that is needed for the correlation
        let W = sigma_offsets(&sqrt_sigma, self.weights.spread);
        let Z: Vec<VectorN<N, ZD>> = sigma_points(mu, &W, &self.delta_model).iter().map(|x| h(x)).collect();

        // Mean of predicted observation, observations are additive
        let d = self.belief.dim();
        let zd = delta.dim();
        let mut z_hat = VectorN::<N, ZD>::zeros_generic(zd, U1);
        for (i, z) in Z.iter().enumerate() {
            z_hat.axpy(self.weights.mean_weight(i), z, N::one());
        }

        // Innovation covariance S and correlation of state with observation
        let mut S = MatrixN::<N, ZD>::zeros_generic(zd, zd);
        let mut sigma_xz = MatrixMN::<N, D, ZD>::zeros_generic(d, zd);
        for (i, (w, z)) in W.iter().zip(Z.iter()).enumerate() {
            let dz = z - &z_hat;
            let weight = self.weights.covariance_weight(i);
            S.ger(weight, &dz, &dz, N::one());
            sigma_xz.ger(weight, w, &dz, N::one());
        }
        check_symmetric(&S, tolerances.symmetry)?;
        S += delta.covariance();

        let SI = match S.clone().try_inverse() {
            Some(SI) if SI.iter().all(|e| is_finite(*e)) => SI,
            _ => {
                warn!("innovation covariance is singular");
                return Err(FilterError::SingularInnovation {
                    matrix: format!("{:?}", S),
                });
            }
        };

        // Kalman gain, Sxz*SI
        let kalman_gain = &sigma_xz * SI;

        // X -= K.S.K'
        let mut new_sigma = self.belief.covariance().clone();
        new_sigma.quadform_tr(-N::one(), &kalman_gain, &S, N::one());
        check_symmetric(&new_sigma, tolerances.symmetry)?;

        // Innovation is 0 - z_hat
        let new_mu = self.delta_model.add_delta(mu, &-(&kalman_gain * &z_hat));

        self.belief = GaussianDistribution::new(new_mu, new_sigma);
        debug!(covariance_trace = ?self.belief.covariance().trace(), "observe");

        Ok(())
    }
}

/// inf - inf and NaN - NaN are NaN
fn is_finite<N: RealField>(x: N) -> bool {
    x - x == N::zero()
}

impl<N: RealField, D, M: DeltaModel<N, D>> Estimator<N, D> for UnscentedKalmanFilter<N, D, M>
where
    D: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, DimDiff<D, U1>>,
{
    fn state(&self) -> FilterResult<VectorN<N, D>> {
        Ok(self.belief.mean().clone())
    }

    fn gaussian_state(&self) -> FilterResult<GaussianDistribution<N, D>> {
        Ok(self.belief.clone())
    }
}

impl<N: RealField, D, M: DeltaModel<N, D>> FunctionPredictor<N, D> for UnscentedKalmanFilter<N, D, M>
where
    D: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, DimDiff<D, U1>>,
{
    fn predict(
        &mut self,
        g: &dyn Fn(&VectorN<N, D>) -> VectorN<N, D>,
        noise: &GaussianDistribution<N, D>,
    ) -> FilterResult<()> {
        UnscentedKalmanFilter::predict(self, g, noise)
    }
}

impl<N: RealField, D, ZD, M: DeltaModel<N, D>> FunctionObserver<N, D, ZD> for UnscentedKalmanFilter<N, D, M>
where
    D: Dim + DimSub<U1>,
    ZD: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D>
        + Allocator<N, D>
        + Allocator<N, DimDiff<D, U1>>
        + Allocator<N, ZD, ZD>
        + Allocator<N, ZD>
        + Allocator<N, D, ZD>
        + Allocator<N, DimDiff<ZD, U1>>,
{
    fn observe(
        &mut self,
        h: &dyn Fn(&VectorN<N, D>) -> VectorN<N, ZD>,
        noise: &GaussianDistribution<N, ZD>,
    ) -> FilterResult<()> {
        UnscentedKalmanFilter::observe(self, h, noise)
    }
}
