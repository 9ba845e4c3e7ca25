//! State delta models.
//!
//! A delta model defines how a tangent space delta is composed with a state and how the delta
//! between two states is computed. Together they define the manifold the filter state lives on.
//! For Euclidean states these are vector addition and subtraction.
//!
//! Implementations should satisfy `add_delta(x, compute_delta(x, y)) ≈ y` and
//! `compute_delta(x, x) = 0`. Models that index into the state check the state dimension in
//! `validate`, which the filter calls on construction.

use nalgebra as na;
use na::{allocator::Allocator, DefaultAllocator, Dim, RealField, Vector3, VectorN};

use crate::error::{FilterError, FilterResult};
use crate::transform::{normalize_angle, quaternion_from_rotation_vector, rotation_vector_from_quaternion};

/// Composition rules of a filter state.
pub trait DeltaModel<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D>,
{
    /// The state reached by applying 'delta' to 'state'.
    fn add_delta(&self, state: &VectorN<N, D>, delta: &VectorN<N, D>) -> VectorN<N, D>;

    /// The delta which takes 'origin' to 'target'.
    fn compute_delta(&self, origin: &VectorN<N, D>, target: &VectorN<N, D>) -> VectorN<N, D>;

    /// Check the model can compose states of dimension 'dim'.
    fn validate(&self, _dim: usize) -> FilterResult<()> {
        Ok(())
    }
}

/// Ordinary vector arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl<N: RealField, D: Dim> DeltaModel<N, D> for Euclidean
where
    DefaultAllocator: Allocator<N, D>,
{
    fn add_delta(&self, state: &VectorN<N, D>, delta: &VectorN<N, D>) -> VectorN<N, D> {
        state + delta
    }

    fn compute_delta(&self, origin: &VectorN<N, D>, target: &VectorN<N, D>) -> VectorN<N, D> {
        target - origin
    }
}

/// Delta model from a pair of functions.
#[derive(Clone, Copy)]
pub struct DeltaFn<A, C> {
    add: A,
    compute: C,
}

impl<A, C> DeltaFn<A, C> {
    pub fn new(add: A, compute: C) -> Self {
        DeltaFn { add, compute }
    }
}

impl<N: RealField, D: Dim, A, C> DeltaModel<N, D> for DeltaFn<A, C>
where
    DefaultAllocator: Allocator<N, D>,
    A: Fn(&VectorN<N, D>, &VectorN<N, D>) -> VectorN<N, D>,
    C: Fn(&VectorN<N, D>, &VectorN<N, D>) -> VectorN<N, D>,
{
    fn add_delta(&self, state: &VectorN<N, D>, delta: &VectorN<N, D>) -> VectorN<N, D> {
        (self.add)(state, delta)
    }

    fn compute_delta(&self, origin: &VectorN<N, D>, target: &VectorN<N, D>) -> VectorN<N, D> {
        (self.compute)(origin, target)
    }
}

/// Planar state with one heading angle.
///
/// The element at 'index' is an angle kept within [-pi, pi), deltas of it are the shortest angular
/// distance. All other elements are Euclidean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingDelta {
    pub index: usize,
}

impl<N: RealField, D: Dim> DeltaModel<N, D> for HeadingDelta
where
    DefaultAllocator: Allocator<N, D>,
{
    fn add_delta(&self, state: &VectorN<N, D>, delta: &VectorN<N, D>) -> VectorN<N, D> {
        let mut new_state = state + delta;
        new_state[self.index] = normalize_angle(new_state[self.index]);
        new_state
    }

    fn compute_delta(&self, origin: &VectorN<N, D>, target: &VectorN<N, D>) -> VectorN<N, D> {
        let mut delta = target - origin;
        delta[self.index] = normalize_angle(delta[self.index]);
        delta
    }

    fn validate(&self, dim: usize) -> FilterResult<()> {
        if self.index < dim {
            Ok(())
        } else {
            Err(FilterError::InvalidConfiguration("heading index outside the state"))
        }
    }
}

/// State with a 3D orientation stored as a rotation vector.
///
/// Elements 'offset'..'offset'+3 are a rotation vector. Orientation deltas are rotation vectors in
/// the frame of the state: state + delta = q(state) * q(delta) and
/// delta(origin, target) = rotation vector of q(origin)^-1 * q(target).
/// All other elements are Euclidean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationVectorDelta {
    pub offset: usize,
}

impl RotationVectorDelta {
    fn rotation<N: RealField, D: Dim>(&self, state: &VectorN<N, D>) -> Vector3<N>
    where
        DefaultAllocator: Allocator<N, D>,
    {
        let o = self.offset;
        Vector3::new(state[o], state[o + 1], state[o + 2])
    }

    fn set_rotation<N: RealField, D: Dim>(&self, state: &mut VectorN<N, D>, rotation: &Vector3<N>)
    where
        DefaultAllocator: Allocator<N, D>,
    {
        for i in 0..3 {
            state[self.offset + i] = rotation[i];
        }
    }
}

impl<N: RealField, D: Dim> DeltaModel<N, D> for RotationVectorDelta
where
    DefaultAllocator: Allocator<N, D>,
{
    fn add_delta(&self, state: &VectorN<N, D>, delta: &VectorN<N, D>) -> VectorN<N, D> {
        let orientation = quaternion_from_rotation_vector(&self.rotation(state));
        let rotation = quaternion_from_rotation_vector(&self.rotation(delta));

        let mut new_state = state + delta;
        self.set_rotation(&mut new_state, &rotation_vector_from_quaternion(&(orientation * rotation)));
        new_state
    }

    fn compute_delta(&self, origin: &VectorN<N, D>, target: &VectorN<N, D>) -> VectorN<N, D> {
        let origin_orientation = quaternion_from_rotation_vector(&self.rotation(origin));
        let target_orientation = quaternion_from_rotation_vector(&self.rotation(target));

        let mut delta = target - origin;
        self.set_rotation(
            &mut delta,
            &rotation_vector_from_quaternion(&(origin_orientation.inverse() * target_orientation)),
        );
        delta
    }

    fn validate(&self, dim: usize) -> FilterResult<()> {
        if self.offset + 3 <= dim {
            Ok(())
        } else {
            Err(FilterError::InvalidConfiguration("rotation vector outside the state"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use na::{Vector4, Vector6};
    use std::f64::consts::PI;

    #[test]
    fn heading_wraps() {
        let model = HeadingDelta { index: 2 };
        let a = na::Vector3::new(1., 2., PI - 0.1);
        let b = na::Vector3::new(1.5, 2., -PI + 0.1);

        let d = model.compute_delta(&a, &b);
        approx::assert_relative_eq!(d, na::Vector3::new(0.5, 0., 0.2), epsilon = 1e-12);
        approx::assert_relative_eq!(model.add_delta(&a, &d), b, epsilon = 1e-12);
    }

    #[test]
    fn rotation_vector_inverse() {
        let model = RotationVectorDelta { offset: 3 };
        let a = Vector6::new(1., 2., 3., 0.1, -0.4, 0.8);
        let b = Vector6::new(-1., 0.5, 3., 1.2, 0.3, -0.2);

        let d = model.compute_delta(&a, &b);
        approx::assert_relative_eq!(model.add_delta(&a, &d), b, epsilon = 1e-9);
        approx::assert_relative_eq!(model.compute_delta(&a, &a), Vector6::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn validate_checks_dimension() {
        assert!(DeltaModel::<f64, na::U3>::validate(&HeadingDelta { index: 2 }, 3).is_ok());
        assert_eq!(
            DeltaModel::<f64, na::U3>::validate(&HeadingDelta { index: 3 }, 3),
            Err(FilterError::InvalidConfiguration("heading index outside the state"))
        );
        assert!(DeltaModel::<f64, na::U6>::validate(&RotationVectorDelta { offset: 3 }, 6).is_ok());
        assert!(DeltaModel::<f64, na::U6>::validate(&RotationVectorDelta { offset: 4 }, 6).is_err());
        assert!(DeltaModel::<f64, na::U2>::validate(&Euclidean, 2).is_ok());
    }

    #[test]
    fn delta_fn_forwards() {
        let model = DeltaFn::new(
            |x: &Vector4<f64>, d: &Vector4<f64>| x + d * 2.,
            |o: &Vector4<f64>, t: &Vector4<f64>| (t - o) / 2.,
        );
        let a = Vector4::new(1., 2., 3., 4.);
        let b = Vector4::new(2., 2., 0., 4.);
        let d = model.compute_delta(&a, &b);
        assert_eq!(d, Vector4::new(0.5, 0., -1.5, 0.));
        assert_eq!(model.add_delta(&a, &d), b);
    }
}
