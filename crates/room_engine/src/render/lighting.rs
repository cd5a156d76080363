//! Renderer-side lights
//!
//! Point lights mirror the light nodes of a [`Scene`]: the `i`-th point light
//! follows the `i`-th registered light node. Directional lights have no node.
//!
//! Movement arrives as [`LightCommand`] values so input handling never has to
//! hold references into both the scene and the renderer.

use crate::foundation::math::Vec3;
use crate::scene::graph::{Scene, SceneError};

/// Distance falloff `1 / (constant + linear * d + quadratic * d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl Default for Attenuation {
    /// Roughly a 50 unit range
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl Attenuation {
    /// Intensity multiplier at `distance`
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// Parallel light such as the sun
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels (not necessarily normalized)
    pub direction: Vec3,
    /// RGB colour
    pub color: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.3, -0.5, -0.5),
            color: Vec3::new(0.9, 0.9, 0.9),
        }
    }
}

/// Omnidirectional light at a position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World position
    pub position: Vec3,
    /// RGB colour
    pub color: Vec3,
    /// Falloff
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            color: Vec3::new(0.8, 0.8, 0.8),
            attenuation: Attenuation::default(),
        }
    }
}

/// A change to the light setup requested by input handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightCommand {
    /// Move the `index`-th light node and the point light that follows it
    MovePoint {
        /// Light index in scene load order
        index: usize,
        /// Translation
        delta: Vec3,
    },
    /// Offset the direction of the `index`-th directional light
    NudgeDirectional {
        /// Directional light index
        index: usize,
        /// Added to the direction
        delta: Vec3,
    },
}

/// Every light the renderer shades with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lights {
    /// Directional lights
    pub directional: Vec<DirectionalLight>,
    /// Point lights, index-aligned with the scene's light nodes
    pub point: Vec<PointLight>,
}

impl Lights {
    /// No lights
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a directional light
    pub fn with_directional(mut self, light: DirectionalLight) -> Self {
        self.directional.push(light);
        self
    }

    /// Builder: add a point light
    pub fn with_point(mut self, light: PointLight) -> Self {
        self.point.push(light);
        self
    }

    /// Apply a light command
    ///
    /// Nothing changes when the index is out of range.
    pub fn apply(&mut self, scene: &mut Scene, command: LightCommand) -> Result<(), SceneError> {
        match command {
            LightCommand::MovePoint { index, delta } => {
                let count = self.point.len();
                let light = self
                    .point
                    .get_mut(index)
                    .ok_or(SceneError::LightIndexOutOfRange { index, count })?;
                let key = scene.light(index)?;
                scene.move_node(key, delta)?;
                light.position = scene.get(key)?.transform().interpolated(1.0).position;
            }
            LightCommand::NudgeDirectional { index, delta } => {
                let count = self.directional.len();
                let light = self
                    .directional
                    .get_mut(index)
                    .ok_or(SceneError::LightIndexOutOfRange { index, count })?;
                light.direction += delta;
            }
        }
        Ok(())
    }

    /// Copy every light node's pending position into its point light
    ///
    /// Returns how many lights were synced; extra nodes or extra point lights
    /// are left alone.
    pub fn sync_point_lights(&mut self, scene: &Scene) -> usize {
        let mut synced = 0;
        for (light, key) in self.point.iter_mut().zip(scene.lights()) {
            if let Some(node) = scene.node(*key) {
                light.position = node.transform().interpolated(1.0).position;
                synced += 1;
            }
        }
        synced
    }

    /// Drop every light
    pub fn clear(&mut self) {
        self.directional.clear();
        self.point.clear();
    }
}
