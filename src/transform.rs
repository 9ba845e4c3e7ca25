//! Orientation conversions used by the manifold delta models.
//!
//! Orientations are carried in filter states as rotation vectors: a vector along the rotation axis
//! with length of the rotation angle.

use nalgebra as na;
use na::{Quaternion, RealField, UnitQuaternion, Vector3};

/// Rotation vector of a quaternion.
///
/// The quaternion with positive 'w' is used, i.e. the one with a smaller angle that represents this
/// orientation, so the result has a norm no greater than pi.
pub fn rotation_vector_from_quaternion<N: RealField>(quaternion: &UnitQuaternion<N>) -> Vector3<N> {
    let mut q: Quaternion<N> = *quaternion.quaternion();
    if q.w < N::zero() {
        q = -q;
    }
    let two: N = na::convert(2.);
    let angle = two * q.imag().norm().atan2(q.w);
    // Linearize below this angle
    let scale = if angle < na::convert(1e-7) {
        two
    } else {
        angle / (angle / two).sin()
    };
    q.imag() * scale
}

/// Quaternion of a rotation vector.
pub fn quaternion_from_rotation_vector<N: RealField>(rotation: &Vector3<N>) -> UnitQuaternion<N> {
    let two: N = na::convert(2.);
    let mut scale: N = na::convert(0.5);
    let mut w = N::one();
    // Linearize below this squared angle
    if rotation.norm_squared() > na::convert(1e-8) {
        let norm = rotation.norm();
        scale = (norm / two).sin() / norm;
        w = (norm / two).cos();
    }
    let xyz = rotation * scale;
    UnitQuaternion::from_quaternion(Quaternion::new(w, xyz.x, xyz.y, xyz.z))
}

/// Wrap an angle into [-pi, pi).
pub fn normalize_angle<N: RealField>(angle: N) -> N {
    let pi = N::pi();
    let two_pi = N::two_pi();
    let shifted = angle + pi;
    shifted - two_pi * (shifted / two_pi).floor() - pi
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn rotation_vector_round_trip() {
        let v = Vector3::new(0.3, -0.2, 1.1);
        let q = quaternion_from_rotation_vector(&v);
        approx::assert_relative_eq!(rotation_vector_from_quaternion(&q), v, epsilon = 1e-12);
        approx::assert_relative_eq!(q.scaled_axis(), v, epsilon = 1e-12);
    }

    #[test]
    fn small_rotation_linearized() {
        let v = Vector3::new(1e-9, 0., -2e-9);
        let q = quaternion_from_rotation_vector(&v);
        approx::assert_relative_eq!(rotation_vector_from_quaternion(&q), v, epsilon = 1e-15);
        approx::assert_relative_eq!(
            rotation_vector_from_quaternion(&UnitQuaternion::<f64>::identity()),
            Vector3::zeros()
        );
    }

    #[test]
    fn negative_w_hemisphere() {
        let q = UnitQuaternion::from_quaternion(Quaternion::new(-0.9, 0.1, 0.2, 0.3));
        let v = rotation_vector_from_quaternion(&q);
        assert!(v.norm() <= PI);
        approx::assert_relative_eq!(
            quaternion_from_rotation_vector(&v).angle_to(&q),
            0.,
            epsilon = 1e-6
        );
    }

    #[test]
    fn angles_wrap() {
        approx::assert_relative_eq!(normalize_angle(3. * PI / 2.), -PI / 2., epsilon = 1e-12);
        approx::assert_relative_eq!(normalize_angle(-3. * PI / 2.), PI / 2., epsilon = 1e-12);
        approx::assert_relative_eq!(normalize_angle(0.25), 0.25, epsilon = 1e-15);
        approx::assert_relative_eq!(normalize_angle(PI), -PI, epsilon = 1e-12);
    }
}
