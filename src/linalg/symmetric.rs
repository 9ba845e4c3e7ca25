#![allow(non_snake_case)]

//! Symmetric positive semi-definite matrix checks and square root.
//!
//! Covariance matrices handled by the estimators must be symmetric and positive semi-definite.
//! Both properties are checked with a tolerance so that round off from repeated updates is accepted
//! while genuine asymmetry or indefiniteness is rejected.

use nalgebra as na;
use na::{allocator::Allocator, DefaultAllocator, Dim, DimDiff, DimSub, MatrixN, RealField, SymmetricEigen, VectorN, U1};
use tracing::warn;

use crate::config::Tolerances;
use crate::error::{FilterError, FilterResult};

/// Checks 'A' is a symmetric matrix.
///
/// The Frobenius norm of A - A' must be less than 'tolerance'.
/// A NaN norm, from any NaN or infinite element, always fails.
pub fn check_symmetric<N: RealField, D: Dim>(A: &MatrixN<N, D>, tolerance: f64) -> FilterResult<()>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    let norm = (A - A.transpose()).norm();
    // IEC 559 NaN comparisons are never true
    if norm < na::convert(tolerance) {
        Ok(())
    } else {
        warn!(?norm, "symmetry check failed");
        Err(FilterError::SymmetryViolation {
            norm: to_f64(norm),
            matrix: format!("{:?}", A),
        })
    }
}

/// Checks the minimum eigenvalue of symmetric 'A' is greater than -'tolerance'.
///
/// Only the symmetric part (A + A') / 2 is decomposed.
pub fn check_non_negative_definite<N: RealField, D>(A: &MatrixN<N, D>, tolerance: f64) -> FilterResult<()>
where
    D: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, DimDiff<D, U1>>,
{
    let eigen = SymmetricEigen::new(symmetric_part(A));
    check_eigenvalues(&eigen.eigenvalues, tolerance)
}

/// Checks 'A' is symmetric and numerically positive semi-definite.
pub fn check_covariance<N: RealField, D>(A: &MatrixN<N, D>, tolerances: &Tolerances) -> FilterResult<()>
where
    D: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, DimDiff<D, U1>>,
{
    check_symmetric(A, tolerances.symmetry)?;
    check_non_negative_definite(A, tolerances.negative_eigenvalue)
}

/// Matrix square root of a symmetric positive semi-definite matrix 'A'.
///
/// Input: A, checked for symmetry and a minimum eigenvalue above -tolerance.
///
/// Output: B = V.sqrt(max(0,d)).V' where V.d.V' is the eigendecomposition of (A + A') / 2,
/// so that B.B' = B.B = A.
/// Small negative eigenvalues, from round off, are clamped to zero.
pub fn matrix_sqrt<N: RealField, D>(A: &MatrixN<N, D>, tolerances: &Tolerances) -> FilterResult<MatrixN<N, D>>
where
    D: Dim + DimSub<U1>,
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D> + Allocator<N, DimDiff<D, U1>>,
{
    check_symmetric(A, tolerances.symmetry)?;

    let eigen = SymmetricEigen::new(symmetric_part(A));
    check_eigenvalues(&eigen.eigenvalues, tolerances.negative_eigenvalue)?;

    let roots = eigen.eigenvalues.map(|d| d.max(N::zero()).sqrt());
    let V = &eigen.eigenvectors;
    Ok(V * MatrixN::from_diagonal(&roots) * V.transpose())
}

/// (A + A') / 2
fn symmetric_part<N: RealField, D: Dim>(A: &MatrixN<N, D>) -> MatrixN<N, D>
where
    DefaultAllocator: Allocator<N, D, D>,
{
    (A + A.transpose()) * na::convert::<f64, N>(0.5)
}

fn check_eigenvalues<N: RealField, D: Dim>(eigenvalues: &VectorN<N, D>, tolerance: f64) -> FilterResult<()>
where
    DefaultAllocator: Allocator<N, D>,
{
    // Special case an empty matrix
    if eigenvalues.nrows() == 0 {
        return Ok(());
    }

    let mut mind = eigenvalues[0];
    for i in 0..eigenvalues.nrows() {
        let d = eigenvalues[i];
        if d != d {
            // NaN
            mind = d;
            break;
        }
        if d < mind {
            mind = d;
        }
    }

    if mind > -na::convert::<f64, N>(tolerance) {
        Ok(())
    } else {
        warn!(min_eigenvalue = ?mind, "negative definite matrix");
        Err(FilterError::NegativeDefiniteness {
            min_eigenvalue: to_f64(mind),
            eigenvalues: format!("{:?}", eigenvalues),
        })
    }
}

/// Scalar for diagnostics, NaN when not representable.
pub(crate) fn to_f64<N: RealField>(value: N) -> f64 {
    na::try_convert::<N, f64>(value).unwrap_or(std::f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::{DMatrix, Matrix2, Matrix3};

    #[test]
    fn sqrt_reconstructs() {
        let A = Matrix3::new(4., 1., 0.5, 1., 3., 0.2, 0.5, 0.2, 2.);
        let B = matrix_sqrt(&A, &Tolerances::default()).unwrap();
        approx::assert_relative_eq!(B * B.transpose(), A, epsilon = 1e-12);
        approx::assert_relative_eq!(B, B.transpose(), epsilon = 1e-12);
    }

    #[test]
    fn sqrt_of_semi_definite() {
        // rank one
        let A = Matrix2::new(1., 1., 1., 1.);
        let B = matrix_sqrt(&A, &Tolerances::default()).unwrap();
        approx::assert_relative_eq!(B * B, A, epsilon = 1e-12);
    }

    #[test]
    fn sqrt_dynamic() {
        let A = DMatrix::from_row_slice(2, 2, &[2., 0.5, 0.5, 1.]);
        let B = matrix_sqrt(&A, &Tolerances::default()).unwrap();
        approx::assert_relative_eq!(&B * &B, A, epsilon = 1e-12);
    }

    #[test]
    fn asymmetric_rejected() {
        let A = Matrix2::new(1., 0.1, 0., 1.);
        match check_symmetric(&A, 1e-5) {
            Err(FilterError::SymmetryViolation { norm, .. }) => {
                approx::assert_relative_eq!(norm, 0.02f64.sqrt(), max_relative = 1e-12)
            }
            other => panic!("expected symmetry violation, got {:?}", other),
        }
        assert!(matrix_sqrt(&A, &Tolerances::default()).is_err());
    }

    #[test]
    fn nan_rejected() {
        let A = Matrix2::new(std::f64::NAN, 0., 0., 1.);
        assert!(matches!(
            check_symmetric(&A, 1e-5),
            Err(FilterError::SymmetryViolation { .. })
        ));
    }

    #[test]
    fn indefinite_rejected() {
        let A = Matrix2::new(1., 0., 0., -1.);
        match matrix_sqrt(&A, &Tolerances::default()) {
            Err(FilterError::NegativeDefiniteness { min_eigenvalue, .. }) => {
                approx::assert_relative_eq!(min_eigenvalue, -1.)
            }
            other => panic!("expected negative definiteness, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn round_off_accepted() {
        let A = Matrix2::new(1., 0., 0., -1e-7);
        assert!(check_non_negative_definite(&A, 1e-5).is_ok());
        let B = matrix_sqrt(&A, &Tolerances::default()).unwrap();
        approx::assert_abs_diff_eq!(B[(1, 1)], 0., epsilon = 1e-12);
    }
}
