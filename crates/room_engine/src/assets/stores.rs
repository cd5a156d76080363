//! Named asset stores
//!
//! Meshes, materials and textures are registered once by name and referenced
//! afterwards through slot-map handles. Scene nodes only hold names; the
//! render-form creator resolves names to handles when it bakes.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use super::mesh::MeshData;
use super::AssetError;
use crate::foundation::math::Vec3;
use crate::scene::aabb::AABB;

new_key_type! {
    /// Handle to a mesh in a [`ModelStore`]
    pub struct MeshHandle;

    /// Handle to a material in a [`MaterialStore`]
    pub struct MaterialHandle;

    /// Handle to a 2D texture in a [`TextureStore`]
    pub struct TextureId;

    /// Handle to a cubemap in a [`TextureStore`]
    pub struct CubemapId;
}

/// Surface description referenced by meshes and nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Diffuse map
    pub diffuse_texture: Option<TextureId>,

    /// Specular map
    pub specular_texture: Option<TextureId>,

    /// Flat diffuse colour, used when there is no diffuse map
    pub diffuse_color: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_texture: None,
            specular_texture: None,
            diffuse_color: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Material {
    /// Builder: diffuse map
    pub fn with_diffuse_texture(mut self, texture: TextureId) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    /// Builder: specular map
    pub fn with_specular_texture(mut self, texture: TextureId) -> Self {
        self.specular_texture = Some(texture);
        self
    }

    /// Builder: flat diffuse colour
    pub fn with_diffuse_color(mut self, color: Vec3) -> Self {
        self.diffuse_color = color;
        self
    }
}

/// What a model name resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelEntry {
    /// Geometry
    pub mesh: MeshHandle,

    /// Default material, overridable per node
    pub material: Option<MaterialHandle>,

    /// Local-space bounds of the geometry
    pub bounds: AABB,
}

/// Meshes by name
#[derive(Debug, Default)]
pub struct ModelStore {
    meshes: SlotMap<MeshHandle, MeshData>,
    entries: HashMap<String, ModelEntry>,
}

impl ModelStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh under `name`
    pub fn load(&mut self, name: impl Into<String>, mesh: MeshData) -> Result<MeshHandle, AssetError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(AssetError::DuplicateName(name));
        }

        let bounds = *mesh.bounds();
        log::debug!(
            "Loaded model '{}' ({} vertices, {} triangles)",
            name,
            mesh.vertices().len(),
            mesh.triangle_count()
        );
        let handle = self.meshes.insert(mesh);
        self.entries.insert(
            name,
            ModelEntry {
                mesh: handle,
                material: None,
                bounds,
            },
        );
        Ok(handle)
    }

    /// Look up a model by name
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.entries.get(name)
    }

    /// Geometry behind a handle
    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshData> {
        self.meshes.get(handle)
    }

    /// Set the default material of a loaded model
    pub fn set_material(&mut self, name: &str, material: MaterialHandle) -> Result<(), AssetError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        entry.material = Some(material);
        Ok(())
    }

    /// Number of loaded models
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no model is loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every model
    pub fn clear(&mut self) {
        self.entries.clear();
        self.meshes.clear();
    }
}

/// Materials by name
#[derive(Debug, Default)]
pub struct MaterialStore {
    materials: SlotMap<MaterialHandle, Material>,
    names: HashMap<String, MaterialHandle>,
}

impl MaterialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material under `name`
    pub fn insert(&mut self, name: impl Into<String>, material: Material) -> Result<MaterialHandle, AssetError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(AssetError::DuplicateName(name));
        }
        let handle = self.materials.insert(material);
        log::debug!("Registered material '{}'", name);
        self.names.insert(name, handle);
        Ok(handle)
    }

    /// Material behind a handle
    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    /// Handle of a named material
    pub fn find(&self, name: &str) -> Option<MaterialHandle> {
        self.names.get(name).copied()
    }

    /// Number of materials
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Drop every material
    pub fn clear(&mut self) {
        self.names.clear();
        self.materials.clear();
    }
}

/// Texture and cubemap ids by name
///
/// Pixel data belongs to the back end; the store only hands out stable ids.
#[derive(Debug, Default)]
pub struct TextureStore {
    textures: SlotMap<TextureId, String>,
    texture_names: HashMap<String, TextureId>,
    cubemaps: SlotMap<CubemapId, String>,
    cubemap_names: HashMap<String, CubemapId>,
}

impl TextureStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for the texture `name`, registering it on first use
    pub fn load(&mut self, name: impl Into<String>) -> TextureId {
        let name = name.into();
        if let Some(id) = self.texture_names.get(&name) {
            return *id;
        }
        let id = self.textures.insert(name.clone());
        log::trace!("Registered texture '{}'", name);
        self.texture_names.insert(name, id);
        id
    }

    /// Id for the cubemap `name`, registering it on first use
    pub fn load_cubemap(&mut self, name: impl Into<String>) -> CubemapId {
        let name = name.into();
        if let Some(id) = self.cubemap_names.get(&name) {
            return *id;
        }
        let id = self.cubemaps.insert(name.clone());
        log::trace!("Registered cubemap '{}'", name);
        self.cubemap_names.insert(name, id);
        id
    }

    /// Id of a registered texture
    pub fn find(&self, name: &str) -> Option<TextureId> {
        self.texture_names.get(name).copied()
    }

    /// Id of a registered cubemap
    pub fn find_cubemap(&self, name: &str) -> Option<CubemapId> {
        self.cubemap_names.get(name).copied()
    }

    /// Name a texture was registered under
    pub fn name(&self, id: TextureId) -> Option<&str> {
        self.textures.get(id).map(String::as_str)
    }

    /// Number of textures (cubemaps not included)
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether no texture is registered
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Drop every texture and cubemap
    pub fn clear(&mut self) {
        self.textures.clear();
        self.texture_names.clear();
        self.cubemaps.clear();
        self.cubemap_names.clear();
    }
}
