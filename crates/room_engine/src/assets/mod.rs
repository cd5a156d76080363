//! Asset management
//!
//! Name-keyed stores for meshes, materials and textures, procedural mesh
//! generation, and the file loading used during the loading phase.

pub mod loader;
pub mod mesh;
pub mod stores;

pub use loader::{BackgroundLoader, FileDataCache};
pub use mesh::{MeshData, Vertex};
pub use stores::{
    CubemapId, Material, MaterialHandle, MaterialStore, MeshHandle, ModelEntry, ModelStore,
    TextureId, TextureStore,
};

use std::path::PathBuf;
use thiserror::Error;

/// Asset loading errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// A file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Asset name already registered
    #[error("Asset already loaded: {0}")]
    DuplicateName(String),

    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Loader thread went away without delivering
    #[error("Background loader disconnected before delivering its result")]
    LoaderDisconnected,
}
