//! Interpolating fly camera
//!
//! The camera is double-buffered like scene transforms: input changes the
//! current state during a tick, [`Camera::update`] closes the tick, and the
//! view matrix is blended with the same fraction the scene is baked at.

use crate::core::config::ViewConfig;
use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Pitch is kept inside this range to avoid flipping over the pole
const PITCH_LIMIT: f32 = 89.0;

/// Directions the camera can be moved in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Along the view direction
    Forward,
    /// Against the view direction
    Backward,
    /// Strafe left
    Left,
    /// Strafe right
    Right,
}

/// Camera position and orientation (degrees)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// World position
    pub position: Vec3,
    /// Heading; -90 looks down -Z
    pub yaw: f32,
    /// Elevation
    pub pitch: f32,
}

impl CameraState {
    /// Unit view direction
    pub fn front(&self) -> Vec3 {
        let (yaw, pitch) = (utils::deg_to_rad(self.yaw), utils::deg_to_rad(self.pitch));
        Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos()).normalize()
    }

    /// View matrix
    pub fn view(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front(), Vec3::y())
    }
}

/// First-person camera with previous/current buffering
#[derive(Debug, Clone)]
pub struct Camera {
    previous: CameraState,
    current: CameraState,
    /// Units per tick for each held direction
    pub speed: f32,
    /// Degrees per unit of look input
    pub sensitivity: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl Camera {
    /// Camera at `position` looking down -Z
    pub fn new(position: Vec3) -> Self {
        let state = CameraState {
            position,
            yaw: -90.0,
            pitch: 0.0,
        };
        Self {
            previous: state,
            current: state,
            speed: 0.1,
            sensitivity: 0.1,
            fov_degrees: 45.0,
            near: 0.1,
            far: 300.0,
        }
    }

    /// Builder: speed, sensitivity and field of view from a view config
    pub fn with_view_config(mut self, config: &ViewConfig) -> Self {
        self.speed = config.camera_speed;
        self.sensitivity = config.mouse_sensitivity;
        self.fov_degrees = config.fov_degrees;
        self
    }

    /// Teleport without interpolating from the old position
    pub fn set_position(&mut self, position: Vec3) {
        self.previous.position = position;
        self.current.position = position;
    }

    /// Place the pending position, interpolating from the last tick
    pub fn move_to(&mut self, position: Vec3) {
        self.current.position = position;
    }

    /// Move once per held direction
    pub fn move_in(&mut self, directions: &[MoveDirection]) {
        let front = self.current.front();
        let right = front.cross(&Vec3::y()).normalize();
        for direction in directions {
            let step = match direction {
                MoveDirection::Forward => front,
                MoveDirection::Backward => -front,
                MoveDirection::Left => -right,
                MoveDirection::Right => right,
            };
            self.current.position += step * self.speed;
        }
    }

    /// Turn by a cursor offset; positive `dy` looks down
    pub fn look(&mut self, dx: f32, dy: f32) {
        self.current.yaw += dx * self.sensitivity;
        self.current.pitch = utils::clamp(
            self.current.pitch - dy * self.sensitivity,
            -PITCH_LIMIT,
            PITCH_LIMIT,
        );
    }

    /// Close the tick
    pub fn update(&mut self) {
        self.previous = self.current;
    }

    /// State blended between the last tick and the pending one
    pub fn interpolated(&self, t: f32) -> CameraState {
        let t = utils::clamp(t, 0.0, 1.0);
        CameraState {
            position: utils::lerp_vec3(&self.previous.position, &self.current.position, t),
            yaw: utils::lerp(self.previous.yaw, self.current.yaw, t),
            pitch: utils::lerp(self.previous.pitch, self.current.pitch, t),
        }
    }

    /// View matrix of [`Camera::interpolated`]
    pub fn interpolated_view(&self, t: f32) -> Mat4 {
        self.interpolated(t).view()
    }

    /// Perspective projection for a viewport aspect ratio
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective(utils::deg_to_rad(self.fov_degrees), aspect, self.near, self.far)
    }

    /// Pending position
    pub fn position(&self) -> Vec3 {
        self.current.position
    }

    /// Pending state
    pub fn current(&self) -> &CameraState {
        &self.current
    }
}
