//! Double-buffered node transform
//!
//! Every transform keeps the state as of the last simulation tick (`previous`)
//! and the state being built up for the next one (`current`). Rendering
//! happens between ticks and blends the two with an interpolation fraction,
//! so motion stays smooth no matter how the frame rate relates to the tick
//! rate.
//!
//! ## Conventions
//!
//! - Position composes additively.
//! - Rotation is three per-axis angles in degrees, composed additively per
//!   axis. Angles are kept unwrapped so interpolation never crosses the
//!   ±180° seam the wrong way.
//! - Scale composes multiplicatively, component-wise.
//! - World matrices apply scale, then rotation about X, Y and Z in that order,
//!   then translation: `M = T * Rz * Ry * Rx * S`.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Angles beyond this are folded back by whole turns during [`Transform::update`]
const FULL_TURN: f32 = 360.0;

/// Principal axis for [`Transform::rotate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationAxis {
    /// Pitch
    X,
    /// Yaw
    Y,
    /// Roll
    Z,
}

impl RotationAxis {
    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// A single position/rotation/scale state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformState {
    /// World position
    pub position: Vec3,
    /// Per-axis rotation in degrees
    pub rotation: Vec3,
    /// Per-axis scale factors
    pub scale: Vec3,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformState {
    /// Blend two states component-wise
    pub fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Self {
            position: utils::lerp_vec3(&from.position, &to.position, t),
            rotation: utils::lerp_vec3(&from.rotation, &to.rotation, t),
            scale: utils::lerp_vec3(&from.scale, &to.scale, t),
        }
    }

    /// Rotation part only (`Rz * Ry * Rx`)
    pub fn rotation_matrix(&self) -> Mat4 {
        Mat4::rotation_z(utils::deg_to_rad(self.rotation.z))
            * Mat4::rotation_y(utils::deg_to_rad(self.rotation.y))
            * Mat4::rotation_x(utils::deg_to_rad(self.rotation.x))
    }

    /// World matrix (`T * Rz * Ry * Rx * S`)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation_matrix()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Position, rotation and scale with previous/current double buffering
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transform {
    previous: TransformState,
    current: TransformState,
}

impl Transform {
    /// Identity transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform resting at `state` (both buffers equal)
    pub fn from_state(state: TransformState) -> Self {
        Self {
            previous: state,
            current: state,
        }
    }

    /// Translate the current state
    pub fn move_by(&mut self, delta: Vec3) {
        self.current.position += delta;
    }

    /// Add `degrees` to the current angle about `axis`
    pub fn rotate(&mut self, axis: RotationAxis, degrees: f32) {
        self.current.rotation[axis.index()] += degrees;
    }

    /// Multiply the current scale component-wise by `factor`
    pub fn scale_by(&mut self, factor: Vec3) {
        self.current.scale.component_mul_assign(&factor);
    }

    /// Place the transform at `position` without interpolating from the old one
    pub fn set_position(&mut self, position: Vec3) {
        self.previous.position = position;
        self.current.position = position;
    }

    /// Set both buffers' rotation
    pub fn set_rotation(&mut self, degrees: Vec3) {
        self.previous.rotation = degrees;
        self.current.rotation = degrees;
    }

    /// Set both buffers' scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.previous.scale = scale;
        self.current.scale = scale;
    }

    /// Close the tick: previous becomes current
    pub fn update(&mut self) {
        for axis in 0..3 {
            let turns = (self.current.rotation[axis] / FULL_TURN).trunc();
            if turns != 0.0 {
                self.current.rotation[axis] -= turns * FULL_TURN;
            }
        }
        self.previous = self.current;
    }

    /// State blended between the last tick and the pending one
    ///
    /// `t` is clamped to [0, 1].
    pub fn interpolated(&self, t: f32) -> TransformState {
        TransformState::lerp(&self.previous, &self.current, utils::clamp(t, 0.0, 1.0))
    }

    /// World matrix of [`Transform::interpolated`]
    pub fn interpolated_matrix(&self, t: f32) -> Mat4 {
        self.interpolated(t).to_matrix()
    }

    /// State as of the last tick
    pub fn previous(&self) -> &TransformState {
        &self.previous
    }

    /// State being accumulated for the next tick
    pub fn current(&self) -> &TransformState {
        &self.current
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.current.position
    }

    /// Current per-axis rotation in degrees
    pub fn rotation(&self) -> Vec3 {
        self.current.rotation
    }

    /// Current scale
    pub fn scale(&self) -> Vec3 {
        self.current.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_interpolation_bounds() {
        let mut transform = Transform::new();
        transform.move_by(Vec3::new(1.0, 0.0, 0.0));
        transform.rotate(RotationAxis::Y, 30.0);
        transform.update();
        let ticked = *transform.current();

        transform.move_by(Vec3::new(0.5, 2.0, 0.0));
        transform.move_by(Vec3::new(0.5, 0.0, -1.0));
        transform.rotate(RotationAxis::Y, 10.0);
        transform.scale_by(Vec3::new(2.0, 2.0, 2.0));
        let pending = *transform.current();

        assert_eq!(transform.interpolated(0.0), ticked);
        assert_eq!(transform.interpolated(1.0), pending);
    }

    #[test]
    fn test_midpoint_blend() {
        let mut transform = Transform::new();
        transform.move_by(Vec3::new(1.0, 0.0, 0.0));
        transform.update();
        transform.move_by(Vec3::new(1.0, 0.0, 0.0));
        transform.scale_by(Vec3::new(3.0, 1.0, 1.0));

        let mid = transform.interpolated(0.5);
        assert_relative_eq!(mid.position, Vec3::new(1.5, 0.0, 0.0), epsilon = EPSILON);
        assert_relative_eq!(mid.scale, Vec3::new(2.0, 1.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_out_of_range_fraction_is_clamped() {
        let mut transform = Transform::new();
        transform.move_by(Vec3::new(4.0, 0.0, 0.0));

        assert_eq!(transform.interpolated(-3.0), *transform.previous());
        assert_eq!(transform.interpolated(7.0), *transform.current());
    }

    #[test]
    fn test_scale_is_multiplicative() {
        let mut transform = Transform::new();
        transform.scale_by(Vec3::new(2.0, 2.0, 2.0));
        transform.scale_by(Vec3::new(1.5, 1.0, 0.5));
        assert_relative_eq!(transform.scale(), Vec3::new(3.0, 2.0, 1.0), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_folds_whole_turns_on_update() {
        let mut transform = Transform::new();
        transform.rotate(RotationAxis::Z, 350.0);
        transform.update();
        transform.rotate(RotationAxis::Z, 20.0);

        // Halfway between 350 and 370 is 360, not 180
        assert_relative_eq!(transform.interpolated(0.5).rotation.z, 360.0, epsilon = 1e-3);

        transform.update();
        assert_relative_eq!(transform.rotation().z, 10.0, epsilon = 1e-3);
        assert_eq!(transform.previous(), transform.current());
    }

    #[test]
    fn test_negative_rotation_folds_toward_zero() {
        let mut transform = Transform::new();
        transform.rotate(RotationAxis::Z, -350.0);
        transform.update();
        assert_relative_eq!(transform.rotation().z, -350.0, epsilon = 1e-3);
        transform.rotate(RotationAxis::Z, -20.0);

        assert_relative_eq!(transform.interpolated(0.5).rotation.z, -360.0, epsilon = 1e-3);

        transform.update();
        assert_relative_eq!(transform.rotation().z, -10.0, epsilon = 1e-3);
        assert_eq!(transform.previous(), transform.current());
    }

    #[test]
    fn test_matrix_composition_order() {
        let state = TransformState {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation: Vec3::new(0.0, 0.0, 90.0),
            scale: Vec3::new(2.0, 1.0, 1.0),
        };

        // Scale first (x doubled), then rotate about Z (x -> y), then translate
        let point = state.to_matrix().transform_point(&crate::foundation::math::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(point.coords, Vec3::new(10.0, 2.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_setters_do_not_interpolate() {
        let mut transform = Transform::new();
        transform.set_position(Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(transform.interpolated(0.0).position, Vec3::new(5.0, 5.0, 5.0));
    }
}
