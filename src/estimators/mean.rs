//! Weighted mean of sigma points on a state manifold.
//!
//! When states do not compose additively the weighted mean is defined implicitly as the state x
//! minimising the weighted sum of squared deltas compute_delta(x, state_i).
//! It is found by a damped iteration: the weighted error is applied to the estimate with a step size
//! halved until the error norm decreases.
//!
//! Reference: Kraft, E., A Quaternion-based Unscented Kalman Filter for Orientation Tracking, Section 3.4.

use nalgebra as na;
use na::{allocator::Allocator, DefaultAllocator, Dim, RealField, VectorN};
use tracing::{trace, warn};

use super::sigma::SigmaWeights;
use crate::config::MeanSolverSettings;
use crate::delta::DeltaModel;
use crate::error::{FilterResult, MeanSolverFailure};

/// Weighted sum of the deltas from 'estimate' to each state.
pub fn weighted_error<N: RealField, D: Dim, M: DeltaModel<N, D>>(
    estimate: &VectorN<N, D>,
    states: &[VectorN<N, D>],
    weights: &SigmaWeights<N>,
    delta: &M,
) -> VectorN<N, D>
where
    DefaultAllocator: Allocator<N, D>,
{
    let mut error = delta.compute_delta(estimate, &states[0]) * weights.mean_weight(0);
    for (i, state) in states.iter().enumerate().skip(1) {
        error.axpy(weights.mean_weight(i), &delta.compute_delta(estimate, state), N::one());
    }
    error
}

/// Weighted mean of the 2n+1 sigma point 'states'.
///
/// Input: states, the first is the central sigma point and is used as the initial estimate.
///
/// Return: the mean, or an error if the line search step size underflows or the iteration limit
/// is reached before the error norm falls to the convergence bound.
///
/// # Panics
/// If the number of states does not match the weights.
pub fn weighted_mean<N: RealField, D: Dim, M: DeltaModel<N, D>>(
    states: &[VectorN<N, D>],
    weights: &SigmaWeights<N>,
    delta: &M,
    settings: &MeanSolverSettings,
) -> FilterResult<VectorN<N, D>>
where
    DefaultAllocator: Allocator<N, D>,
{
    assert_eq!(states.len(), weights.count(), "Weighted mean requires 2n+1 states.");

    let convergence: N = na::convert(settings.convergence);
    let min_step_size: N = na::convert(settings.min_step_size);
    let half: N = na::convert(0.5);

    let mut current_estimate = states[0].clone();
    let mut error = weighted_error(&current_estimate, states, weights, delta);
    let mut weighted_error_norm = error.norm();
    let mut iterations = 0;

    while weighted_error_norm > convergence {
        if iterations >= settings.max_iterations {
            warn!(iterations, error_norm = ?weighted_error_norm, "weighted mean did not converge");
            return Err(MeanSolverFailure::IterationLimit { iterations }.into());
        }

        let mut step_size = N::one();
        loop {
            let next_estimate = delta.add_delta(&current_estimate, &(&error * step_size));
            let next_error = weighted_error(&next_estimate, states, weights, delta);
            let next_error_norm = next_error.norm();
            if next_error_norm < weighted_error_norm {
                current_estimate = next_estimate;
                error = next_error;
                weighted_error_norm = next_error_norm;
                break;
            }
            step_size *= half;
            if !(step_size > min_step_size) {
                warn!(iterations, error_norm = ?weighted_error_norm, "line search failed");
                return Err(MeanSolverFailure::StepSizeUnderflow { iterations }.into());
            }
        }

        iterations += 1;
        trace!(iterations, error_norm = ?weighted_error_norm, step_size = ?step_size, "weighted mean step");
    }

    Ok(current_estimate)
}
