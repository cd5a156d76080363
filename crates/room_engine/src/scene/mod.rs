//! # Scene Graph
//!
//! Named, transformable nodes with bounding boxes, owned by a [`Scene`].
//!
//! ## Tick and frame
//!
//! Game logic mutates nodes through the scene between ticks. [`Scene::update`]
//! closes a tick: every transform's previous state catches up with its current
//! state and every box is recomputed. Rendering happens between ticks and
//! reads transforms interpolated by the frame's fraction; nodes mutated since
//! the last frame are reported by [`Scene::pull_updates`].

pub mod aabb;
pub mod description;
pub mod graph;
pub mod node;
pub mod transform;

pub use aabb::{intersects, AABB};
pub use description::{NodeDescription, SceneDescription, SceneFactory, TransformDescription};
pub use graph::{NodeRef, Scene, SceneError};
pub use node::{NodeKey, SceneNode};
pub use transform::{RotationAxis, Transform, TransformState};
