//! # Unified Configuration System
//!
//! All configuration structures for the engine live here. Every struct is
//! serde-serializable with builder-style setters and sensible defaults, and the
//! top-level [`ApplicationConfig`] can be loaded from TOML or RON through the
//! [`Config`] trait.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging, tick rate, frame clamping
//! - **Scene Config**: dirty tracking and default bounds
//! - **View Config**: display toggles that used to be screen-level globals
//! - **Asset Config**: asset directory and scene description file

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::foundation::math::Vec3;

pub use crate::config::{Config, ConfigError};

/// # Engine Configuration
///
/// Core loop behaviour: logging and the fixed simulation tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default log filter (`RUST_LOG` overrides it)
    pub log_level: String,
    /// Fixed simulation ticks per second
    pub tick_rate: u32,
    /// Longest frame time fed into the tick accumulator, in milliseconds
    pub max_frame_time_ms: u64,
    /// Stop after this many rendered frames (headless runs)
    pub max_frames: Option<u64>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            tick_rate: 60,
            max_frame_time_ms: 250,
            max_frames: None,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the fixed tick rate
    pub fn with_tick_rate(mut self, tick_rate: u32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Bound the number of rendered frames
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Frame time clamp as a [`Duration`]
    pub fn max_frame_time(&self) -> Duration {
        Duration::from_millis(self.max_frame_time_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Scene Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Only report nodes mutated since the last drain
    ///
    /// When disabled every node is reported on every drain. Output is the
    /// same either way, only slower.
    pub enable_dirty_tracking: bool,

    /// Half-size of the local bounds used when a node's mesh is unknown
    pub default_extents: Vec3,
}

impl SceneConfig {
    /// Toggle dirty tracking
    pub fn with_dirty_tracking(mut self, enabled: bool) -> Self {
        self.enable_dirty_tracking = enabled;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            enable_dirty_tracking: true,
            default_extents: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// # View Configuration
///
/// Display and interaction toggles owned by the application, passed into the
/// operations that need them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Spin every `cube*` node around Y each tick
    pub rotating: bool,
    /// Degrees added per tick while rotating
    pub rotation_increment: f32,
    /// Draw node bounding boxes
    pub show_aabbs: bool,
    /// Draw debug overlay
    pub show_debug_info: bool,
    /// Index into the scene's light list moved by light commands
    pub moving_light_index: usize,
    /// Camera trails the controlled character instead of flying freely
    #[serde(default)]
    pub follow_character: bool,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Camera translation per tick
    pub camera_speed: f32,
    /// Camera rotation per unit of cursor offset
    pub mouse_sensitivity: f32,
    /// Presented frames per second, independent of the tick rate
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: u32,
}

fn default_refresh_rate() -> u32 {
    60
}

impl ViewConfig {
    /// Flip the rotation toggle
    pub fn toggle_rotation(&mut self) {
        self.rotating = !self.rotating;
    }

    /// Flip AABB drawing
    pub fn toggle_aabbs(&mut self) {
        self.show_aabbs = !self.show_aabbs;
    }

    /// Flip between follow and free-fly camera
    pub fn toggle_follow(&mut self) {
        self.follow_character = !self.follow_character;
    }

    /// Flip the debug overlay
    pub fn toggle_debug_info(&mut self) {
        self.show_debug_info = !self.show_debug_info;
    }

    /// Select the next light for light commands, wrapping at `light_count`
    pub fn cycle_moving_light(&mut self, light_count: usize) {
        if light_count > 0 {
            self.moving_light_index = (self.moving_light_index + 1) % light_count;
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            rotating: false,
            rotation_increment: 0.05,
            show_aabbs: false,
            show_debug_info: false,
            moving_light_index: 0,
            follow_character: false,
            fov_degrees: 45.0,
            camera_speed: 0.1,
            mouse_sensitivity: 0.1,
            refresh_rate: default_refresh_rate(),
        }
    }
}

/// # Asset Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Base directory for assets
    pub assets_dir: String,
    /// Scene description, relative to `assets_dir`
    pub scene_file: String,
    /// Files preloaded by the background loader, relative to `assets_dir`
    pub preload: Vec<String>,
}

impl AssetConfig {
    /// Create a new asset configuration
    pub fn new() -> Self {
        Self {
            assets_dir: "resources".to_string(),
            scene_file: "main_scene.ron".to_string(),
            preload: Vec::new(),
        }
    }

    /// Set assets directory
    pub fn with_assets_dir(mut self, dir: impl Into<String>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Full path of the scene description
    pub fn scene_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.assets_dir).join(&self.scene_file)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Scene graph configuration
    pub scene: SceneConfig,
    /// Display toggles
    pub view: ViewConfig,
    /// Asset system configuration
    pub assets: AssetConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be at least 1".to_string()));
        }
        if self.engine.max_frame_time_ms == 0 {
            return Err(ConfigError::Invalid("max_frame_time_ms must be positive".to_string()));
        }
        if self.scene.default_extents.iter().any(|e| *e < 0.0) {
            return Err(ConfigError::Invalid("default_extents must not be negative".to_string()));
        }
        if !(1.0..180.0).contains(&self.view.fov_degrees) {
            return Err(ConfigError::Invalid(format!(
                "fov_degrees out of range: {}",
                self.view.fov_degrees
            )));
        }
        if self.view.refresh_rate == 0 {
            return Err(ConfigError::Invalid("refresh_rate must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Config for ApplicationConfig {}
