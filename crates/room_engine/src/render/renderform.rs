//! Render-form baking
//!
//! A render form is the flat, frame-scoped snapshot a back end draws from:
//! one entry per drawable node with resolved mesh/material handles and the
//! node's world matrix at the frame's interpolation fraction.
//!
//! ## Two phases per frame
//!
//! 1. [`RenderformCreator::update`] takes the nodes the scene reports as
//!    dirty and resolves their model/material names into handles, keeping one
//!    baked record per node (lookup-or-insert, so material swaps re-resolve).
//! 2. [`RenderformCreator::bake`] walks every record in scene order and
//!    interpolates its transform. Handles are not looked up again here.
//!
//! A node whose references cannot be resolved poisons the creator until a
//! later update resolves it; baking refuses to produce a partial form.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

use crate::assets::stores::{CubemapId, MaterialHandle, MaterialStore, MeshHandle, ModelStore};
use crate::foundation::math::{utils, Mat4};
use crate::scene::graph::Scene;
use crate::scene::node::{NodeKey, SceneNode};

/// Rendering errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A node's model or material name is not loaded
    #[error("Node '{node}' references unresolved resource '{resource}'")]
    UnresolvedResource {
        /// Node identifier
        node: String,
        /// Model or material name
        resource: String,
    },

    /// The back end rejected a frame
    #[error("Render backend error: {0}")]
    Backend(String),
}

/// Image-based lighting cubemaps drawn with every frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvironmentMaps {
    /// Background cubemap
    pub skybox: Option<CubemapId>,
    /// Diffuse irradiance map
    pub irradiance: Option<CubemapId>,
    /// Prefiltered specular radiance map
    pub radiance: Option<CubemapId>,
}

impl EnvironmentMaps {
    /// Builder: skybox
    pub fn with_skybox(mut self, id: CubemapId) -> Self {
        self.skybox = Some(id);
        self
    }

    /// Builder: irradiance map
    pub fn with_irradiance(mut self, id: CubemapId) -> Self {
        self.irradiance = Some(id);
        self
    }

    /// Builder: radiance map
    pub fn with_radiance(mut self, id: CubemapId) -> Self {
        self.radiance = Some(id);
        self
    }
}

/// One drawable node in a render form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderEntry {
    /// Node the entry was baked from
    pub node: NodeKey,
    /// Geometry
    pub mesh: MeshHandle,
    /// Surface; `None` draws with the back end's default material
    pub material: Option<MaterialHandle>,
    /// Interpolated world matrix
    pub transform: Mat4,
}

/// Per-instance record laid out for direct upload
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// World matrix, column-major
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the world matrix's linear part, column-major
    pub normal: [[f32; 4]; 4],
}

impl InstanceData {
    /// Instance record for a world matrix
    ///
    /// Singular matrices (zero scale on some axis) fall back to an identity
    /// normal matrix.
    pub fn from_model(model: &Mat4) -> Self {
        let normal = model
            .fixed_view::<3, 3>(0, 0)
            .clone_owned()
            .try_inverse()
            .map(|inverse| inverse.transpose().to_homogeneous())
            .unwrap_or_else(Mat4::identity);
        Self {
            model: (*model).into(),
            normal: normal.into(),
        }
    }
}

/// Flat snapshot of the scene at one interpolation fraction
#[derive(Debug, Clone, PartialEq)]
pub struct RenderForm {
    entries: Vec<RenderEntry>,
    environment: EnvironmentMaps,
    fraction: f32,
}

impl RenderForm {
    /// Entries in scene order
    pub fn entries(&self) -> &[RenderEntry] {
        &self.entries
    }

    /// Entry baked from `node`
    pub fn entry_for(&self, node: NodeKey) -> Option<&RenderEntry> {
        self.entries.iter().find(|entry| entry.node == node)
    }

    /// Environment cubemaps
    pub fn environment(&self) -> &EnvironmentMaps {
        &self.environment
    }

    /// Interpolation fraction the form was baked at (after clamping)
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is drawn
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Upload records in entry order
    pub fn instance_data(&self) -> Vec<InstanceData> {
        self.entries
            .iter()
            .map(|entry| InstanceData::from_model(&entry.transform))
            .collect()
    }
}

/// Resolved handles for one node
#[derive(Debug, Clone, Copy, PartialEq)]
struct BakedRecord {
    mesh: MeshHandle,
    material: Option<MaterialHandle>,
}

/// Turns scene state into render forms
#[derive(Debug, Default)]
pub struct RenderformCreator {
    records: HashMap<NodeKey, BakedRecord>,
    unresolved: HashMap<NodeKey, RenderError>,
    environment: EnvironmentMaps,
}

impl RenderformCreator {
    /// Create a creator with no records
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-resolve the handles of every node in `dirty`
    ///
    /// All dirty nodes are processed even when some fail, since the scene has
    /// already forgotten them. The first failure is returned. Records for keys
    /// that `scene` no longer holds are dropped.
    pub fn update(
        &mut self,
        scene: &Scene,
        dirty: &[NodeKey],
        models: &ModelStore,
        materials: &MaterialStore,
    ) -> Result<(), RenderError> {
        let mut first_error = None;
        self.records.retain(|key, _| scene.node(*key).is_some());
        self.unresolved.retain(|key, _| scene.node(*key).is_some());

        for key in dirty {
            let Some(node) = scene.node(*key) else {
                self.records.remove(key);
                self.unresolved.remove(key);
                continue;
            };

            match Self::resolve(node, models, materials) {
                Ok(Some(record)) => {
                    log::trace!("Baked record for '{}'", node.uuid());
                    self.records.insert(*key, record);
                    self.unresolved.remove(key);
                }
                Ok(None) => {
                    self.records.remove(key);
                    self.unresolved.remove(key);
                }
                Err(error) => {
                    log::warn!("Skipping node: {}", error);
                    self.records.remove(key);
                    self.unresolved.insert(*key, error.clone());
                    first_error.get_or_insert(error);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn resolve(
        node: &SceneNode,
        models: &ModelStore,
        materials: &MaterialStore,
    ) -> Result<Option<BakedRecord>, RenderError> {
        let Some(model_name) = node.model() else {
            return Ok(None);
        };
        let unresolved = |resource: &str| RenderError::UnresolvedResource {
            node: node.uuid().to_string(),
            resource: resource.to_string(),
        };

        let model = models.get(model_name).ok_or_else(|| unresolved(model_name))?;
        let material = match node.material() {
            Some(name) => Some(materials.find(name).ok_or_else(|| unresolved(name))?),
            None => model.material,
        };

        Ok(Some(BakedRecord {
            mesh: model.mesh,
            material,
        }))
    }

    /// Produce the render form at fraction `t`
    ///
    /// Fails while any node of `scene` is unresolved. `t` is clamped to [0, 1].
    pub fn bake(&self, scene: &Scene, t: f32) -> Result<RenderForm, RenderError> {
        if !self.unresolved.is_empty() {
            if let Some(error) = scene.keys().iter().find_map(|key| self.unresolved.get(key)) {
                return Err(error.clone());
            }
        }

        let fraction = utils::clamp(t, 0.0, 1.0);
        let entries: Vec<RenderEntry> = scene
            .keys()
            .iter()
            .filter_map(|key| {
                let record = self.records.get(key)?;
                let node = scene.node(*key)?;
                Some(RenderEntry {
                    node: *key,
                    mesh: record.mesh,
                    material: record.material,
                    transform: node.transform().interpolated_matrix(fraction),
                })
            })
            .collect();

        log::trace!("Baked {} entries at t = {:.3}", entries.len(), fraction);
        Ok(RenderForm {
            entries,
            environment: self.environment,
            fraction,
        })
    }

    /// Cubemaps attached to every baked form
    pub fn set_environment(&mut self, environment: EnvironmentMaps) {
        self.environment = environment;
    }

    /// Current cubemaps
    pub fn environment(&self) -> &EnvironmentMaps {
        &self.environment
    }

    /// Number of nodes with a resolved record
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of nodes blocking bakes
    pub fn unresolved_count(&self) -> usize {
        self.unresolved.len()
    }

    /// Whether `node` has a resolved record
    pub fn has_record(&self, node: NodeKey) -> bool {
        self.records.contains_key(&node)
    }

    /// Forget every record
    ///
    /// Call this when the scene is replaced. Keys of a new scene can reuse
    /// slots of the old one and would otherwise pick up its records.
    pub fn clear(&mut self) {
        self.records.clear();
        self.unresolved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::mesh::MeshData;
    use crate::assets::stores::{Material, TextureStore};
    use crate::core::config::SceneConfig;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use crate::scene::transform::RotationAxis;
    use approx::assert_relative_eq;

    struct Fixture {
        scene: Scene,
        models: ModelStore,
        materials: MaterialStore,
        creator: RenderformCreator,
    }

    impl Fixture {
        fn new(config: SceneConfig) -> Self {
            let mut models = ModelStore::new();
            let mut materials = MaterialStore::new();
            models.load("cube", MeshData::cube()).unwrap();
            let white = materials.insert("white", Material::default()).unwrap();
            models.load("teapot", MeshData::uv_sphere(1.0, 8, 8)).unwrap();
            models.set_material("teapot", white).unwrap();
            Self {
                scene: Scene::new(config),
                models,
                materials,
                creator: RenderformCreator::new(),
            }
        }

        fn add(&mut self, node: SceneNode) -> NodeKey {
            self.scene.insert_node(node, None).unwrap()
        }

        fn sync(&mut self) -> Result<(), RenderError> {
            let dirty = self.scene.pull_updates();
            self.creator.update(&self.scene, &dirty, &self.models, &self.materials)
        }
    }

    #[test]
    fn test_end_to_end_interpolated_translation() {
        let mut f = Fixture::new(SceneConfig::default());
        let cube = f.add(SceneNode::new("cube0").with_model("cube"));

        f.scene.move_node("cube0", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        f.scene.update();
        f.scene.move_node("cube0", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        f.sync().unwrap();

        let form = f.creator.bake(&f.scene, 0.5).unwrap();
        let entry = form.entry_for(cube).unwrap();
        assert_relative_eq!(entry.transform.translation_part(), Vec3::new(1.5, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_bake_is_deterministic() {
        let mut f = Fixture::new(SceneConfig::default());
        for i in 0..5 {
            f.add(SceneNode::new(format!("cube{i}")).with_model("cube"));
            f.scene.rotate(format!("cube{i}").as_str(), RotationAxis::Y, 7.0 * i as f32).unwrap();
        }
        f.sync().unwrap();

        let a = f.creator.bake(&f.scene, 0.37).unwrap();
        let b = f.creator.bake(&f.scene, 0.37).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_entries_follow_scene_order() {
        let mut f = Fixture::new(SceneConfig::default());
        let keys: Vec<NodeKey> = ["zeta", "alpha", "mid"]
            .iter()
            .map(|id| f.add(SceneNode::new(*id).with_model("cube")))
            .collect();
        f.sync().unwrap();

        let form = f.creator.bake(&f.scene, 1.0).unwrap();
        let baked: Vec<NodeKey> = form.entries().iter().map(|e| e.node).collect();
        assert_eq!(baked, keys);
    }

    #[test]
    fn test_unresolved_mesh_blocks_bake() {
        let mut f = Fixture::new(SceneConfig::default());
        f.add(SceneNode::new("cube0").with_model("cube"));
        let well = f.add(SceneNode::new("well").with_model("well"));

        let expected = RenderError::UnresolvedResource {
            node: "well".to_string(),
            resource: "well".to_string(),
        };
        assert_eq!(f.sync(), Err(expected.clone()));
        assert_eq!(f.creator.bake(&f.scene, 0.5), Err(expected));
        assert!(!f.creator.has_record(well));
        assert_eq!(f.creator.record_count(), 1);
    }

    #[test]
    fn test_failures_of_a_replaced_scene_do_not_block() {
        let mut f = Fixture::new(SceneConfig::default());
        f.add(SceneNode::new("cube0").with_model("cube"));
        f.add(SceneNode::new("well").with_model("well"));
        assert!(f.sync().is_err());

        let empty = Scene::new(SceneConfig::default());
        let form = f.creator.bake(&empty, 0.5).unwrap();
        assert!(form.is_empty());

        f.creator.update(&empty, &[], &f.models, &f.materials).unwrap();
        assert_eq!(f.creator.record_count(), 0);
        assert_eq!(f.creator.unresolved_count(), 0);
    }

    #[test]
    fn test_later_resolve_clears_failure() {
        let mut f = Fixture::new(SceneConfig::default());
        f.add(SceneNode::new("lamp").with_model("cube").with_material("glow"));
        assert!(f.sync().is_err());

        f.scene.set_material("lamp", None).unwrap();
        f.sync().unwrap();
        assert_eq!(f.creator.unresolved_count(), 0);
        assert_eq!(f.creator.bake(&f.scene, 0.0).unwrap().len(), 1);
    }

    #[test]
    fn test_material_swap_rebakes_record() {
        let mut f = Fixture::new(SceneConfig::default());
        let teapot = f.add(SceneNode::new("teapot").with_model("teapot"));
        f.sync().unwrap();
        let white = f.materials.find("white");
        assert_eq!(f.creator.bake(&f.scene, 0.0).unwrap().entries()[0].material, white);

        let mut textures = TextureStore::new();
        let wood = textures.load("mahogany_wood");
        let mahogany = f
            .materials
            .insert("mahogany", Material::default().with_diffuse_texture(wood))
            .unwrap();
        f.scene.set_material(teapot, Some("mahogany".to_string())).unwrap();
        f.sync().unwrap();

        let form = f.creator.bake(&f.scene, 0.0).unwrap();
        assert_eq!(form.len(), 1);
        assert_eq!(form.entries()[0].material, Some(mahogany));
    }

    #[test]
    fn test_nodes_without_model_are_skipped() {
        let mut f = Fixture::new(SceneConfig::default());
        f.add(SceneNode::new("lamp0").as_light());
        f.add(SceneNode::new("cube0").with_model("cube"));
        f.sync().unwrap();

        assert_eq!(f.creator.record_count(), 1);
        assert_eq!(f.creator.bake(&f.scene, 0.5).unwrap().len(), 1);
    }

    #[test]
    fn test_dirty_tracking_does_not_change_output() {
        let build = |config: SceneConfig| {
            let mut f = Fixture::new(config);
            f.add(SceneNode::new("cube0").with_model("cube"));
            f.add(SceneNode::new("teapot").with_model("teapot"));
            f.sync().unwrap();
            f.scene.move_node("teapot", Vec3::new(0.0, 2.0, 0.0)).unwrap();
            f.scene.update();
            f.scene.scale("cube0", Vec3::new(2.0, 2.0, 2.0)).unwrap();
            f.sync().unwrap();
            f.creator.bake(&f.scene, 0.25).unwrap()
        };

        let tracked = build(SceneConfig::default());
        let untracked = build(SceneConfig::default().with_dirty_tracking(false));
        assert_eq!(tracked.instance_data(), untracked.instance_data());
    }

    #[test]
    fn test_environment_and_instance_data() {
        let mut f = Fixture::new(SceneConfig::default());
        f.add(SceneNode::new("cube0").with_model("cube"));
        f.sync().unwrap();

        let mut textures = TextureStore::new();
        let environment = EnvironmentMaps::default()
            .with_skybox(textures.load_cubemap("bluesky"))
            .with_irradiance(textures.load_cubemap("bluesky_irradiance"));
        f.creator.set_environment(environment);

        let form = f.creator.bake(&f.scene, 2.0).unwrap();
        assert_eq!(*form.environment(), environment);
        assert_eq!(form.fraction(), 1.0);

        let instances = form.instance_data();
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].model, <[[f32; 4]; 4]>::from(Mat4::identity()));
        assert_eq!(bytemuck::cast_slice::<InstanceData, u8>(&instances).len(), 128);
    }
}
