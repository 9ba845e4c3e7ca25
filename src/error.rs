//! Errors raised when a covariance or noise model violates the filter's numerical invariants.
//!
//! All of these indicate a caller supplied model that is mathematically malformed: a bad noise
//! covariance, a degenerate observation function or a delta metric without a minimum.
//! They are returned rather than asserted so the caller decides whether to abort.

use thiserror::Error;

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Invariant violations detected by the estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Frobenius norm of `A - A'` is NaN or exceeds the symmetry tolerance.
    #[error("symmetry check failed with norm '{norm}' from matrix:{matrix}")]
    SymmetryViolation { norm: f64, matrix: String },

    /// An eigenvalue lies below the negative definiteness tolerance.
    #[error("matrix has negative eigenvalue {min_eigenvalue}, eigenvalues:{eigenvalues}")]
    NegativeDefiniteness { min_eigenvalue: f64, eigenvalues: String },

    /// Measurement noise supplied to an observation does not have zero mean.
    #[error("measurement noise must have zero mean, mean has norm {norm}")]
    NonZeroMeanNoise { norm: f64 },

    /// The weighted mean of the transformed sigma points could not be found.
    #[error("weighted mean failed to converge: {0}")]
    MeanSolverDivergence(MeanSolverFailure),

    /// Innovation covariance cannot be inverted.
    #[error("innovation covariance is singular:{matrix}")]
    SingularInnovation { matrix: String },

    /// Unscented parameters or tolerances cannot produce a usable filter.
    #[error("invalid filter configuration: {0}")]
    InvalidConfiguration(&'static str),
}

/// Why the weighted mean solver gave up.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeanSolverFailure {
    /// Line search halved the step below its floor without reducing the error.
    #[error("step size too small, line search failed after {iterations} iterations")]
    StepSizeUnderflow { iterations: usize },

    /// Outer iteration cap reached before the error norm fell below the convergence bound.
    #[error("too many iterations ({iterations})")]
    IterationLimit { iterations: usize },
}

impl From<MeanSolverFailure> for FilterError {
    fn from(failure: MeanSolverFailure) -> Self {
        FilterError::MeanSolverDivergence(failure)
    }
}
