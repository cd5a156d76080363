//! # Room Engine
//!
//! Scene graph and render-form baking core for a real-time 3D renderer.
//!
//! ## Features
//!
//! - **Scene Graph**: named nodes in a slot-map arena with parent/child links
//! - **Fixed Tick, Smooth Frames**: double-buffered transforms interpolated
//!   between simulation ticks
//! - **Render Forms**: flat per-frame snapshots of matrices and resource
//!   handles, decoupled from the graph
//! - **Asset Stores**: name-keyed meshes, materials and textures
//! - **Configuration**: TOML or RON files for engine, scene and view settings
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use room_engine::prelude::*;
//!
//! struct MyApp {
//!     scene: Scene,
//!     creator: RenderformCreator,
//! }
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.models.load("cube", MeshData::cube())?;
//!         self.scene.insert_node(SceneNode::new("cube0").with_model("cube"), None)?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         self.scene.rotate("cube0", RotationAxis::Y, 1.0)?;
//!         self.scene.update();
//!         Ok(())
//!     }
//!
//!     fn render(&mut self, engine: &mut Engine, interpolation: f32) -> Result<(), AppError> {
//!         let dirty = self.scene.pull_updates();
//!         self.creator.update(&self.scene, &dirty, &engine.models, &engine.materials)?;
//!         let form = self.creator.bake(&self.scene, interpolation)?;
//!         let lights = engine.lights.clone();
//!         engine.submit(&FrameData {
//!             form: &form,
//!             view: Mat4::identity(),
//!             projection: Mat4::identity(),
//!             lights: &lights,
//!             debug_boxes: &[],
//!         })?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default().with_max_frames(600);
//!     let mut engine = Engine::new(config, Box::new(RecordingBackend::new()))?;
//!     let mut app = MyApp {
//!         scene: Scene::new(SceneConfig::default()),
//!         creator: RenderformCreator::new(),
//!     };
//!     engine.run(&mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;
pub mod foundation;

pub mod assets;
pub mod physics;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, BackgroundLoader, FileDataCache, Material, MeshData},
        config::Config,
        core::config::{ApplicationConfig, AssetConfig, EngineConfig, SceneConfig, ViewConfig},
        foundation::math::{Mat4, Mat4Ext, Vec3},
        physics::{collision_response, resolve_penetrations},
        render::{
            Camera, EnvironmentMaps, FrameData, LightCommand, Lights, RecordingBackend,
            RenderBackend, RenderError, RenderForm, RenderformCreator,
        },
        scene::{
            NodeDescription, NodeKey, RotationAxis, Scene, SceneDescription, SceneError,
            SceneFactory, SceneNode, AABB,
        },
        AppError, Application, Engine, EngineError,
    };
}
