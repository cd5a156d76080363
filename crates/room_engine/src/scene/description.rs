//! Scene description files
//!
//! A scene file is a flat list of node records. Parents must be listed
//! before their children. Files load through [`Config`], so both `.ron` and
//! `.toml` work.

use serde::{Deserialize, Serialize};

use crate::assets::stores::ModelStore;
use crate::config::Config;
use crate::core::config::SceneConfig;
use crate::foundation::math::Vec3;
use crate::scene::aabb::AABB;
use crate::scene::graph::{NodeRef, Scene, SceneError};
use crate::scene::node::SceneNode;
use crate::scene::transform::TransformState;

/// Initial placement of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDescription {
    /// World position
    pub position: [f32; 3],
    /// Per-axis rotation in degrees
    pub rotation: [f32; 3],
    /// Per-axis scale
    pub scale: [f32; 3],
}

impl Default for TransformDescription {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl From<&TransformDescription> for TransformState {
    fn from(desc: &TransformDescription) -> Self {
        Self {
            position: Vec3::from(desc.position),
            rotation: Vec3::from(desc.rotation),
            scale: Vec3::from(desc.scale),
        }
    }
}

/// One node record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Unique identifier
    pub id: String,
    /// Model name
    #[serde(default)]
    pub mesh: Option<String>,
    /// Material override
    #[serde(default)]
    pub material: Option<String>,
    /// Identifier of an earlier node
    #[serde(default)]
    pub parent: Option<String>,
    /// Initial transform
    #[serde(default)]
    pub transform: TransformDescription,
    /// Register as a light
    #[serde(default)]
    pub light: bool,
}

impl NodeDescription {
    /// Record with only an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mesh: None,
            material: None,
            parent: None,
            transform: TransformDescription::default(),
            light: false,
        }
    }

    /// Builder: model name
    pub fn with_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.mesh = Some(mesh.into());
        self
    }

    /// Builder: material override
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Builder: parent identifier
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Builder: initial position
    pub fn at(mut self, position: [f32; 3]) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder: register as a light
    pub fn as_light(mut self) -> Self {
        self.light = true;
        self
    }
}

/// Whole scene file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Node records in load order
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
}

impl Config for SceneDescription {}

impl SceneDescription {
    /// Builder: append a node record
    pub fn with_node(mut self, node: NodeDescription) -> Self {
        self.nodes.push(node);
        self
    }
}

/// Builds scenes from descriptions
pub struct SceneFactory;

impl SceneFactory {
    /// Create a scene from a description
    ///
    /// Local bounds come from the model store. Unknown models get
    /// `config.default_extents` here and fail later when baked.
    pub fn build(
        description: &SceneDescription,
        models: &ModelStore,
        config: &SceneConfig,
    ) -> Result<Scene, SceneError> {
        let mut scene = Scene::new(config.clone());

        for record in &description.nodes {
            let bounds = record
                .mesh
                .as_deref()
                .and_then(|mesh| models.get(mesh))
                .map(|entry| entry.bounds)
                .unwrap_or_else(|| AABB::from_center_extents(Vec3::zeros(), config.default_extents));

            let mut node = SceneNode::new(record.id.as_str())
                .with_local_bounds(bounds)
                .with_initial_state(TransformState::from(&record.transform));
            if let Some(mesh) = &record.mesh {
                node = node.with_model(mesh.as_str());
            }
            if let Some(material) = &record.material {
                node = node.with_material(material.as_str());
            }
            if record.light {
                node = node.as_light();
            }

            let parent = record.parent.as_deref().map(NodeRef::Id);
            scene.insert_node(node, parent)?;
        }

        log::info!(
            "Built scene with {} nodes ({} lights)",
            scene.len(),
            scene.lights().len()
        );
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::mesh::MeshData;
    use crate::config::ConfigFormat;
    use approx::assert_relative_eq;

    const RON_SCENE: &str = r#"(
        nodes: [
            (id: "room", mesh: Some("cube"), transform: (scale: (10.0, 10.0, 10.0))),
            (id: "cube0", mesh: Some("cube"), material: Some("mahogany"), parent: Some("room"),
             transform: (position: (4.0, 10.0, -20.0), rotation: (20.0, 7.0, 10.0))),
            (id: "lamp0", light: true, transform: (position: (0.0, 3.0, 0.0))),
        ],
    )"#;

    const TOML_SCENE: &str = r#"
        [[nodes]]
        id = "teapot"
        mesh = "teapot"
        transform = { position = [0.0, -1.0, 0.0] }

        [[nodes]]
        id = "lamp1"
        light = true
    "#;

    fn models() -> ModelStore {
        let mut models = ModelStore::new();
        models.load("cube", MeshData::cube()).unwrap();
        models
    }

    #[test]
    fn test_ron_scene_builds_hierarchy() {
        let description = SceneDescription::from_str_with_format(RON_SCENE, ConfigFormat::Ron).unwrap();
        let scene = SceneFactory::build(&description, &models(), &SceneConfig::default()).unwrap();

        let room = scene.find_node_by_uuid("room").unwrap();
        let cube = scene.find_node_by_uuid("cube0").unwrap();
        assert_eq!(scene.children(room), &[cube]);
        assert_eq!(scene.lights().len(), 1);

        let cube = scene.get("cube0").unwrap();
        assert_eq!(cube.material(), Some("mahogany"));
        assert_relative_eq!(cube.transform().rotation(), Vec3::new(20.0, 7.0, 10.0));
        assert_eq!(cube.transform().previous(), cube.transform().current());

        let room = scene.get("room").unwrap();
        assert_relative_eq!(room.aabb().max, Vec3::new(10.0, 10.0, 10.0), epsilon = 1e-5);
    }

    #[test]
    fn test_toml_scene_uses_default_extents_for_unknown_mesh() {
        let description = SceneDescription::from_str_with_format(TOML_SCENE, ConfigFormat::Toml).unwrap();
        let config = SceneConfig {
            default_extents: Vec3::new(0.5, 0.5, 0.5),
            ..SceneConfig::default()
        };
        let scene = SceneFactory::build(&description, &models(), &config).unwrap();

        let teapot = scene.get("teapot").unwrap();
        assert_eq!(teapot.model(), Some("teapot"));
        assert_relative_eq!(teapot.aabb().min, Vec3::new(-0.5, -1.5, -0.5), epsilon = 1e-6);
        assert_eq!(teapot.transform().scale(), Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_duplicate_ids_abort_construction() {
        let description = SceneDescription::default()
            .with_node(NodeDescription::new("cube0").with_mesh("cube"))
            .with_node(NodeDescription::new("cube0").with_mesh("cube"));
        let result = SceneFactory::build(&description, &models(), &SceneConfig::default());
        assert!(matches!(result, Err(SceneError::DuplicateIdentifier(id)) if id == "cube0"));
    }

    #[test]
    fn test_parent_must_come_first() {
        let description = SceneDescription::default()
            .with_node(NodeDescription::new("child").with_parent("later"))
            .with_node(NodeDescription::new("later"));
        let result = SceneFactory::build(&description, &models(), &SceneConfig::default());
        assert_eq!(result.err(), Some(SceneError::NodeNotFound("later".to_string())));
    }
}
