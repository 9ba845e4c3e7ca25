//! Filter configuration.
//!
//! The unscented transform parameters, invariant check tolerances and mean solver limits.
//! Defaults are the usual scaled unscented transform values (alpha = 1e-3, beta = 2, kappa = 0)
//! and the tolerances used throughout the estimator.

use crate::error::{FilterError, FilterResult};

/// Scaled unscented transform parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnscentedParameters {
    /// Spread of the sigma points around the mean.
    pub alpha: f64,
    /// Prior knowledge of the distribution, 2 is optimal for Gaussians.
    pub beta: f64,
    /// Secondary scaling parameter.
    pub kappa: f64,
}

impl Default for UnscentedParameters {
    fn default() -> Self {
        UnscentedParameters {
            alpha: 1e-3,
            beta: 2.,
            kappa: 0.,
        }
    }
}

impl UnscentedParameters {
    /// lambda = alpha^2 (n + kappa) - n
    pub fn lambda(&self, n: usize) -> f64 {
        let n = n as f64;
        num_traits::pow(self.alpha, 2) * (n + self.kappa) - n
    }
}

/// Tolerances of the covariance and noise invariant checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Largest accepted Frobenius norm of `A - A'`.
    pub symmetry: f64,
    /// Most negative accepted eigenvalue is `-negative_eigenvalue`.
    pub negative_eigenvalue: f64,
    /// Largest accepted norm of the measurement noise mean.
    pub noise_mean: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            symmetry: 1e-5,
            negative_eigenvalue: 1e-5,
            noise_mean: 1e-9,
        }
    }
}

/// Limits of the iterative weighted mean solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanSolverSettings {
    /// The solver stops once the weighted error norm is at most this.
    pub convergence: f64,
    /// Line search fails once the step size is halved to this or below.
    pub min_step_size: f64,
    /// Outer iterations allowed before giving up.
    pub max_iterations: usize,
}

impl Default for MeanSolverSettings {
    fn default() -> Self {
        MeanSolverSettings {
            convergence: 1e-9,
            min_step_size: 1e-3,
            max_iterations: 20,
        }
    }
}

/// Complete configuration of an unscented filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterConfig {
    pub parameters: UnscentedParameters,
    pub tolerances: Tolerances,
    pub mean_solver: MeanSolverSettings,
}

impl FilterConfig {
    pub fn with_parameters(mut self, parameters: UnscentedParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn with_mean_solver(mut self, mean_solver: MeanSolverSettings) -> Self {
        self.mean_solver = mean_solver;
        self
    }

    /// Check the configuration can be used for a state of dimension `n`.
    pub fn validate(&self, n: usize) -> FilterResult<()> {
        let p = &self.parameters;
        if !(p.alpha > 0.) {
            return Err(FilterError::InvalidConfiguration("alpha must be positive"));
        }
        if !p.beta.is_finite() || !p.kappa.is_finite() {
            return Err(FilterError::InvalidConfiguration("beta and kappa must be finite"));
        }
        if n == 0 {
            return Err(FilterError::InvalidConfiguration("state dimension must not be zero"));
        }
        if !(n as f64 + p.lambda(n) > 0.) {
            return Err(FilterError::InvalidConfiguration("n + lambda must be positive"));
        }

        let t = &self.tolerances;
        if !(t.symmetry > 0. && t.negative_eigenvalue >= 0. && t.noise_mean >= 0.) {
            return Err(FilterError::InvalidConfiguration("tolerances must be non negative"));
        }

        let m = &self.mean_solver;
        if !(m.convergence > 0.) || !(m.min_step_size > 0. && m.min_step_size < 1.) {
            return Err(FilterError::InvalidConfiguration("mean solver bounds out of range"));
        }
        if m.max_iterations == 0 {
            return Err(FilterError::InvalidConfiguration("mean solver needs at least one iteration"));
        }

        Ok(())
    }
}
