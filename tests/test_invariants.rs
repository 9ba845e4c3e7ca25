//! Test that malformed models are reported and leave the filter belief unchanged.

use na::{Matrix1, Matrix2, Matrix3, Vector1, Vector2, Vector3, U2};
use nalgebra as na;

use pose_estimate::{
    DeltaFn, FilterConfig, FilterError, GaussianDistribution, HeadingDelta, MeanSolverFailure, MeanSolverSettings,
    RotationVectorDelta, UnscentedKalmanFilter, UnscentedParameters,
};

fn belief() -> GaussianDistribution<f64, U2> {
    GaussianDistribution::new(Vector2::new(1., 2.), Matrix2::new(1., 0.2, 0.2, 0.5))
}

fn filter() -> UnscentedKalmanFilter<f64, U2> {
    UnscentedKalmanFilter::new(belief()).unwrap()
}

#[test]
fn test_construction_checks_belief() {
    let asymmetric = GaussianDistribution::new(Vector2::new(0., 0.), Matrix2::new(1., 0.5, 0., 1.));
    match UnscentedKalmanFilter::new(asymmetric) {
        Err(FilterError::SymmetryViolation { norm, matrix }) => {
            approx::assert_relative_eq!(norm, 0.5f64.sqrt(), epsilon = 1e-12);
            assert!(matrix.contains("0.5"));
        }
        _ => panic!("asymmetric belief accepted"),
    }

    let indefinite = GaussianDistribution::new(Vector2::new(0., 0.), Matrix2::new(1., 0., 0., -1.));
    match UnscentedKalmanFilter::new(indefinite) {
        Err(FilterError::NegativeDefiniteness { min_eigenvalue, eigenvalues }) => {
            approx::assert_relative_eq!(min_eigenvalue, -1., epsilon = 1e-12);
            assert!(eigenvalues.contains("-1"));
        }
        _ => panic!("indefinite belief accepted"),
    }
}

#[test]
fn test_construction_checks_config() {
    let config = FilterConfig::default().with_parameters(UnscentedParameters {
        alpha: 0.,
        ..UnscentedParameters::default()
    });
    assert!(matches!(
        UnscentedKalmanFilter::with_config(belief(), pose_estimate::Euclidean, config),
        Err(FilterError::InvalidConfiguration(_))
    ));

    let config = FilterConfig::default().with_mean_solver(MeanSolverSettings {
        max_iterations: 0,
        ..MeanSolverSettings::default()
    });
    assert!(matches!(
        UnscentedKalmanFilter::with_config(belief(), pose_estimate::Euclidean, config),
        Err(FilterError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_construction_checks_delta_model() {
    let planar = GaussianDistribution::new(Vector3::new(0., 0., 0.), Matrix3::identity());
    assert!(matches!(
        UnscentedKalmanFilter::with_delta(planar.clone(), HeadingDelta { index: 5 }),
        Err(FilterError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        UnscentedKalmanFilter::with_delta(planar.clone(), RotationVectorDelta { offset: 1 }),
        Err(FilterError::InvalidConfiguration(_))
    ));

    let mut filter = UnscentedKalmanFilter::with_delta(planar, HeadingDelta { index: 2 }).unwrap();
    assert!(filter.predict(|x| *x, &GaussianDistribution::new_zero(na::U3)).is_ok());
}

#[test]
fn test_predict_rejects_asymmetric_noise() {
    let mut filter = filter();
    let epsilon = GaussianDistribution::new(Vector2::new(0., 0.), Matrix2::new(1., 1e-3, 0., 1.));

    let result = filter.predict(|x| *x, &epsilon);
    assert!(matches!(result, Err(FilterError::SymmetryViolation { .. })));
    assert!(*filter.belief() == belief());
}

#[test]
fn test_predict_rejects_indefinite_noise() {
    let mut filter = filter();
    let epsilon = GaussianDistribution::new(Vector2::new(0., 0.), Matrix2::new(1., 0., 0., -0.1));

    let result = filter.predict(|x| *x, &epsilon);
    assert!(matches!(result, Err(FilterError::NegativeDefiniteness { .. })));
    assert!(*filter.belief() == belief());
}

#[test]
fn test_predict_rejects_nan_transition() {
    let mut filter = filter();
    let epsilon = GaussianDistribution::new_zero(U2);

    let result = filter.predict(|x| x * f64::NAN, &epsilon);
    assert!(matches!(result, Err(FilterError::SymmetryViolation { .. })));
    assert!(*filter.belief() == belief());
}

#[test]
fn test_predict_reports_mean_divergence() {
    // A delta metric with no minimum
    let model = DeltaFn::new(
        |x: &Vector2<f64>, d: &Vector2<f64>| x + d,
        |_: &Vector2<f64>, _: &Vector2<f64>| Vector2::new(1., 1.),
    );
    let mut filter = UnscentedKalmanFilter::with_delta(belief(), model).unwrap();

    let result = filter.predict(|x| *x, &GaussianDistribution::new_zero(U2));
    assert_eq!(
        result,
        Err(FilterError::MeanSolverDivergence(MeanSolverFailure::StepSizeUnderflow { iterations: 0 }))
    );
    assert!(*filter.belief() == belief());
}

#[test]
fn test_observe_rejects_asymmetric_noise() {
    let mut filter = filter();
    let delta = GaussianDistribution::new(Vector2::new(0., 0.), Matrix2::new(1., 0., 1e-3, 1.));

    let result = filter.observe(|x| x - Vector2::new(1., 2.), &delta);
    assert!(matches!(result, Err(FilterError::SymmetryViolation { .. })));
    assert!(*filter.belief() == belief());
}

#[test]
fn test_observe_rejects_indefinite_noise() {
    let mut filter = filter();
    let delta = GaussianDistribution::new(Vector1::new(0.), Matrix1::new(-1.));

    let result = filter.observe(|x| Vector1::new(x[0] - 1.), &delta);
    assert!(matches!(result, Err(FilterError::NegativeDefiniteness { .. })));
    assert!(*filter.belief() == belief());
}

#[test]
fn test_observe_requires_zero_mean_noise() {
    let mut filter = filter();
    let delta = GaussianDistribution::new(Vector1::new(0.1), Matrix1::new(1.));

    match filter.observe(|x| Vector1::new(x[0] - 1.), &delta) {
        Err(FilterError::NonZeroMeanNoise { norm }) => approx::assert_relative_eq!(norm, 0.1),
        _ => panic!("noise with non zero mean accepted"),
    }
    assert!(*filter.belief() == belief());
}

#[test]
fn test_observe_rejects_singular_innovation() {
    let mut filter = filter();

    // A constant observation carries no information and has zero innovation covariance
    let result = filter.observe(|_| Vector1::new(0.), &GaussianDistribution::new_zero(na::U1));
    match result {
        Err(FilterError::SingularInnovation { matrix }) => assert!(matrix.contains('0')),
        _ => panic!("singular innovation accepted"),
    }
    assert!(*filter.belief() == belief());
}

#[test]
fn test_error_messages() {
    let error = FilterError::from(MeanSolverFailure::IterationLimit { iterations: 20 });
    assert_eq!(format!("{}", error), "weighted mean failed to converge: too many iterations (20)");

    let error = FilterError::NonZeroMeanNoise { norm: 0.5 };
    assert_eq!(format!("{}", error), "measurement noise must have zero mean, mean has norm 0.5");
}
