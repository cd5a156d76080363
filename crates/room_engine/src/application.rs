//! Application trait and lifecycle management

use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::render::RenderError;
use crate::scene::SceneError;
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive a scene with the engine's fixed-tick loop.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. Load assets and build the scene
    /// here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Advance the simulation by one fixed tick
    ///
    /// Called zero or more times per frame, always with the same `delta_time`.
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Draw a frame
    ///
    /// Called once per frame after the frame's ticks. `interpolation` is the
    /// progress towards the next tick in [0, 1].
    fn render(&mut self, engine: &mut Engine, interpolation: f32) -> Result<(), AppError>;

    /// Cleanup the application
    ///
    /// Called once after the last frame.
    fn cleanup(&mut self, _engine: &mut Engine) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Rendering error
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
