//! Scene graph
//!
//! The [`Scene`] is the sole owner of node lifetime. Nodes live in a slot-map
//! arena; the id index, insertion order, root list, light list and
//! parent/child links are all secondary indices holding [`NodeKey`]s.
//!
//! Every mutation goes through the scene so the transform, the dirty set and
//! (at tick time) the bounding box stay consistent.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;
use thiserror::Error;

use crate::core::config::SceneConfig;
use crate::foundation::math::Vec3;
use crate::scene::aabb::AABB;
use crate::scene::node::{NodeKey, SceneNode};
use crate::scene::transform::RotationAxis;

/// Scene graph errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// A mutation or query named a node that does not exist
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Two nodes were inserted with the same identifier
    #[error("Duplicate node identifier: {0}")]
    DuplicateIdentifier(String),

    /// A light index past the end of the light list
    #[error("Light index {index} out of range ({count} lights)")]
    LightIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of registered lights
        count: usize,
    },
}

/// A node named either by identifier or by arena key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    /// Look up by unique identifier
    Id(&'a str),
    /// Direct arena key
    Key(NodeKey),
}

impl<'a> From<&'a str> for NodeRef<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a String> for NodeRef<'a> {
    fn from(id: &'a String) -> Self {
        Self::Id(id.as_str())
    }
}

impl From<NodeKey> for NodeRef<'_> {
    fn from(key: NodeKey) -> Self {
        Self::Key(key)
    }
}

/// Forest of scene nodes with dirty tracking
#[derive(Debug, Default)]
pub struct Scene {
    config: SceneConfig,
    nodes: SlotMap<NodeKey, SceneNode>,
    index: HashMap<String, NodeKey>,
    order: Vec<NodeKey>,
    roots: Vec<NodeKey>,
    lights: Vec<NodeKey>,
    dirty: Vec<NodeKey>,
    dirty_marks: HashSet<NodeKey>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Scene configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Insert a node, optionally under a parent
    ///
    /// Light nodes are appended to the light list in insertion order. New
    /// nodes start dirty so the first bake picks them up.
    pub fn insert_node(
        &mut self,
        mut node: SceneNode,
        parent: Option<NodeRef<'_>>,
    ) -> Result<NodeKey, SceneError> {
        if self.index.contains_key(node.uuid()) {
            return Err(SceneError::DuplicateIdentifier(node.uuid().to_string()));
        }
        let parent = parent.map(|p| self.resolve(p)).transpose()?;

        node.parent = parent;
        node.children.clear();
        let uuid = node.uuid().to_string();
        let is_light = node.is_light();
        let key = self.nodes.insert(node);

        match parent {
            Some(parent_key) => self.nodes[parent_key].children.push(key),
            None => self.roots.push(key),
        }
        if is_light {
            self.lights.push(key);
        }
        self.order.push(key);
        self.mark_dirty(key);

        log::debug!("Inserted node '{}' (light: {}, parent: {:?})", uuid, is_light, parent);
        self.index.insert(uuid, key);
        Ok(key)
    }

    /// Resolve a node reference to its arena key
    pub fn resolve(&self, node: NodeRef<'_>) -> Result<NodeKey, SceneError> {
        match node {
            NodeRef::Id(id) => self.find_node_by_uuid(id),
            NodeRef::Key(key) if self.nodes.contains_key(key) => Ok(key),
            NodeRef::Key(key) => Err(SceneError::NodeNotFound(format!("{key:?}"))),
        }
    }

    /// Key of the node with identifier `id`
    pub fn find_node_by_uuid(&self, id: &str) -> Result<NodeKey, SceneError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| SceneError::NodeNotFound(id.to_string()))
    }

    /// Node by key
    pub fn node(&self, key: NodeKey) -> Option<&SceneNode> {
        self.nodes.get(key)
    }

    /// Node by reference
    pub fn get<'a>(&self, node: impl Into<NodeRef<'a>>) -> Result<&SceneNode, SceneError> {
        let key = self.resolve(node.into())?;
        Ok(&self.nodes[key])
    }

    /// Translate a node's current transform
    pub fn move_node<'a>(&mut self, node: impl Into<NodeRef<'a>>, delta: Vec3) -> Result<(), SceneError> {
        let key = self.resolve(node.into())?;
        self.nodes[key].transform_mut().move_by(delta);
        self.mark_dirty(key);
        Ok(())
    }

    /// Rotate a node's current transform about one axis
    pub fn rotate<'a>(
        &mut self,
        node: impl Into<NodeRef<'a>>,
        axis: RotationAxis,
        degrees: f32,
    ) -> Result<(), SceneError> {
        let key = self.resolve(node.into())?;
        self.nodes[key].transform_mut().rotate(axis, degrees);
        self.mark_dirty(key);
        Ok(())
    }

    /// Scale a node's current transform component-wise
    pub fn scale<'a>(&mut self, node: impl Into<NodeRef<'a>>, factor: Vec3) -> Result<(), SceneError> {
        let key = self.resolve(node.into())?;
        self.nodes[key].transform_mut().scale_by(factor);
        self.mark_dirty(key);
        Ok(())
    }

    /// Swap a node's material override; `None` falls back to the model default
    pub fn set_material<'a>(
        &mut self,
        node: impl Into<NodeRef<'a>>,
        material: Option<String>,
    ) -> Result<(), SceneError> {
        let key = self.resolve(node.into())?;
        self.nodes[key].set_material(material);
        self.mark_dirty(key);
        Ok(())
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &SceneNode)> + '_ {
        self.order.iter().map(move |key| {
            let node = &self.nodes[*key];
            (node.uuid(), node)
        })
    }

    /// Node keys in insertion order
    pub fn keys(&self) -> &[NodeKey] {
        &self.order
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Light nodes in load order
    pub fn lights(&self) -> &[NodeKey] {
        &self.lights
    }

    /// The `index`-th registered light
    pub fn light(&self, index: usize) -> Result<NodeKey, SceneError> {
        self.lights
            .get(index)
            .copied()
            .ok_or(SceneError::LightIndexOutOfRange {
                index,
                count: self.lights.len(),
            })
    }

    /// Top-level nodes in insertion order
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    /// Children of a node in insertion order
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(key).map_or(&[][..], SceneNode::children)
    }

    /// Parent of a node
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(key).and_then(SceneNode::parent)
    }

    /// Fixed tick: advance every node's transform buffer, then its box
    pub fn update(&mut self) {
        for node in self.nodes.values_mut() {
            node.tick();
        }
        log::trace!("Scene tick over {} nodes", self.nodes.len());
    }

    /// Drain the set of nodes mutated since the last drain
    ///
    /// One-shot: an immediate second call returns nothing. With dirty tracking
    /// disabled every node is returned every time.
    pub fn pull_updates(&mut self) -> Vec<NodeKey> {
        self.dirty_marks.clear();
        let dirty = std::mem::take(&mut self.dirty);
        if self.config.enable_dirty_tracking {
            dirty
        } else {
            self.order.clone()
        }
    }

    /// World boxes of every node in insertion order
    pub fn aabbs(&self) -> impl Iterator<Item = (NodeKey, &AABB)> + '_ {
        self.order.iter().map(move |key| (*key, self.nodes[*key].aabb()))
    }

    fn mark_dirty(&mut self, key: NodeKey) {
        if self.dirty_marks.insert(key) {
            self.dirty.push(key);
        }
    }
}
