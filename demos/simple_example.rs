//! Operation of the unscented state estimator in a simple example.
//!
//! An unscented Kalman filter with one state and constant noises.

use na::{Matrix1, Vector1};
use nalgebra as na;

use pose_estimate::{GaussianDistribution, UnscentedKalmanFilter};

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    // Constant noises of the prediction and observation models
    let my_predict_noise = GaussianDistribution::new(Vector1::new(0.), Matrix1::new(1.));
    let my_observe_noise = GaussianDistribution::new(Vector1::new(0.), Matrix1::new(1.));

    // Setup the initial belief, at 10 with unit uncertainty
    let initial = GaussianDistribution::new(Vector1::new(10.), Matrix1::new(1.));
    let mut estimate = match UnscentedKalmanFilter::new(initial) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("Invalid initial belief: {}", e);
            return;
        }
    };
    let b = estimate.belief();
    println!("Initial x{:.1} X{:.2}", b.mean(), b.covariance());

    // Make a state prediction, the state does not move
    if let Err(e) = estimate.predict(|x| *x, &my_predict_noise) {
        eprintln!("Predict failed: {}", e);
        return;
    }
    let b = estimate.belief();
    println!("Predict x{:.1} X{:.2}", b.mean(), b.covariance());

    // Make an observation that we appear to be at 11, the residual is zero for a perfect reading
    let z = 11.;
    if let Err(e) = estimate.observe(|x| Vector1::new(x[0] - z), &my_observe_noise) {
        eprintln!("Observe failed: {}", e);
        return;
    }
    let b = estimate.belief();
    println!("Observe x{:.1} X{:.2}", b.mean(), b.covariance());
}
