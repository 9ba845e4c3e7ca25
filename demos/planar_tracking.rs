//! Planar pose tracking with odometry and range-bearing landmark readings.
//!
//! The pose is [x, y, heading]. Odometry drives the prediction, readings of known landmarks drive
//! the observation. The robot drives a circle so the heading wraps at +-pi on every lap.

use std::f64::consts::PI;

use na::{Vector2, Vector3, U2, U3};
use nalgebra as na;
use rand::SeedableRng;

use pose_estimate::models::{Estimator, FunctionObserver, FunctionPredictor};
use pose_estimate::transform::normalize_angle;
use pose_estimate::{FilterResult, GaussianDistribution, HeadingDelta, Tolerances, UnscentedKalmanFilter};

const STEPS: usize = 200;
// Odometry per step, forward distance and turn
const FORWARD: f64 = 0.1;
const TURN: f64 = 2. * PI / 100.;

const LANDMARKS: [(f64, f64); 3] = [(0., 3.), (2., -1.), (-2., -1.)];

/// Pose after driving 'forward' then turning.
fn drive(pose: &Vector3<f64>, forward: f64, turn: f64) -> Vector3<f64> {
    Vector3::new(
        pose[0] + forward * pose[2].cos(),
        pose[1] + forward * pose[2].sin(),
        normalize_angle(pose[2] + turn),
    )
}

/// Range and bearing of a landmark from a pose.
fn range_bearing(pose: &Vector3<f64>, landmark: (f64, f64)) -> Vector2<f64> {
    let dx = landmark.0 - pose[0];
    let dy = landmark.1 - pose[1];
    Vector2::new(dx.hypot(dy), normalize_angle(dy.atan2(dx) - pose[2]))
}

/// One odometry step and a reading of each landmark, through the estimator traits.
fn track<E>(
    estimator: &mut E,
    odometry: &Vector2<f64>,
    readings: &[Vector2<f64>],
    odometry_noise: &GaussianDistribution<f64, U3>,
    reading_noise: &GaussianDistribution<f64, U2>,
) -> FilterResult<()>
where
    E: FunctionPredictor<f64, U3> + FunctionObserver<f64, U3, U2>,
{
    estimator.predict(&|pose: &Vector3<f64>| drive(pose, odometry[0], odometry[1]), odometry_noise)?;

    for (landmark, reading) in LANDMARKS.iter().zip(readings.iter()) {
        let residual = |pose: &Vector3<f64>| {
            let expected = range_bearing(pose, *landmark);
            Vector2::new(expected[0] - reading[0], normalize_angle(expected[1] - reading[1]))
        };
        estimator.observe(&residual, reading_noise)?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let mut rng = rand::rngs::StdRng::seed_from_u64(7u64);
    let tolerances = Tolerances::default();

    let odometry_noise = GaussianDistribution::zero_mean(&Vector3::new(1e-4, 1e-4, 1e-4));
    let reading_noise = GaussianDistribution::zero_mean(&Vector2::new(1e-2, 4e-4));

    // Start on the circle heading along it, with some uncertainty
    let mut truth = Vector3::new(0., -1.6, 0.);
    let initial = GaussianDistribution::from_variances(Vector3::new(0.2, -1.4, 0.1), &Vector3::new(0.1, 0.1, 0.05));
    let mut filter = match UnscentedKalmanFilter::with_delta(initial, HeadingDelta { index: 2 }) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Invalid initial belief: {}", e);
            return;
        }
    };

    for step in 0..STEPS {
        // Move the robot, the true motion differs from the odometry by its noise
        let slip = match odometry_noise.sample(&mut rng, &tolerances) {
            Ok(slip) => slip,
            Err(e) => {
                eprintln!("Odometry noise: {}", e);
                return;
            }
        };
        truth = drive(&truth, FORWARD + slip[0], TURN + slip[2]);

        let mut readings = Vec::with_capacity(LANDMARKS.len());
        for landmark in LANDMARKS.iter() {
            match reading_noise.sample(&mut rng, &tolerances) {
                Ok(noise) => readings.push(range_bearing(&truth, *landmark) + noise),
                Err(e) => {
                    eprintln!("Reading noise: {}", e);
                    return;
                }
            }
        }

        let odometry = Vector2::new(FORWARD, TURN);
        if let Err(e) = track(&mut filter, &odometry, &readings, &odometry_noise, &reading_noise) {
            eprintln!("Tracking failed at step {}: {}", step, e);
            return;
        }

        if step % 20 == 0 {
            if let Ok(belief) = filter.gaussian_state() {
                let error = belief.mean() - truth;
                println!(
                    "step {:3} pose {:.3} heading error {:.4} position sd {:.3}",
                    step,
                    belief.mean().transpose(),
                    normalize_angle(error[2]),
                    (belief.covariance()[(0, 0)] + belief.covariance()[(1, 1)]).sqrt()
                );
            }
        }
    }
}
