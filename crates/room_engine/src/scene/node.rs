//! Scene nodes
//!
//! A node is a named object in the scene: a double-buffered transform, the
//! world-space box derived from it, and optional references to the model and
//! material it is drawn with. Hierarchy links are arena keys owned by the
//! [`Scene`](crate::scene::Scene); a node never owns another node.

use slotmap::new_key_type;

use crate::foundation::math::Vec3;
use crate::scene::aabb::AABB;
use crate::scene::transform::{Transform, TransformState};

new_key_type! {
    /// Stable handle to a node in a scene's arena
    pub struct NodeKey;
}

/// Named, transformable, bounded scene object
#[derive(Debug, Clone)]
pub struct SceneNode {
    uuid: String,
    transform: Transform,
    local_bounds: AABB,
    aabb: AABB,
    model: Option<String>,
    material: Option<String>,
    light: bool,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
}

impl SceneNode {
    /// Create a node at the origin with unit local bounds
    pub fn new(uuid: impl Into<String>) -> Self {
        let local_bounds = AABB::default();
        Self {
            uuid: uuid.into(),
            transform: Transform::new(),
            local_bounds,
            aabb: local_bounds,
            model: None,
            material: None,
            light: false,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Builder: model drawn for this node
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builder: material override (the model's default is used otherwise)
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Builder: register the node as a light source
    pub fn as_light(mut self) -> Self {
        self.light = true;
        self
    }

    /// Builder: local-space bounds
    pub fn with_local_bounds(mut self, bounds: AABB) -> Self {
        self.local_bounds = bounds;
        self.refresh_aabb();
        self
    }

    /// Builder: initial transform, no interpolation from the origin
    pub fn with_initial_state(mut self, state: TransformState) -> Self {
        self.transform = Transform::from_state(state);
        self.refresh_aabb();
        self
    }

    /// Unique identifier
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Transform (read-only; mutate through the scene)
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub(crate) fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// World-space box as of the last tick
    pub fn aabb(&self) -> &AABB {
        &self.aabb
    }

    /// Local-space bounds the box is derived from
    pub fn local_bounds(&self) -> &AABB {
        &self.local_bounds
    }

    /// Model reference
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Material override
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    /// Replace the material override; the node must be re-baked
    pub(crate) fn set_material(&mut self, material: Option<String>) {
        self.material = material;
    }

    /// Whether the node was registered as a light
    pub fn is_light(&self) -> bool {
        self.light
    }

    /// Parent key
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Child keys in insertion order
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Close the tick for this node: advance the transform, then the box
    pub(crate) fn tick(&mut self) {
        self.transform.update();
        self.refresh_aabb();
    }

    fn refresh_aabb(&mut self) {
        let t = &self.transform;
        self.aabb
            .update(&self.local_bounds, t.position(), t.scale(), t.rotation());
    }

    /// Current world position
    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }
}
