//! Everything that turns files into engine data.
//!
//! - `source` decides where the bytes of an asset reference come from
//! - `obj` parses Wavefront OBJ geometry
//! - `texture` decodes images (with a placeholder on failure)
//! - `cache` deduplicates loaded models and textures by path
//! - `scene` reads world and environment descriptions

pub mod cache;
pub mod obj;
pub mod scene;
pub mod source;
pub mod texture;

use std::sync::Arc;

use anyhow::anyhow;

use crate::{
    data_structures::model::Model,
    render::GraphicsBackend,
    resources::source::AssetSource,
};

/// Reads, parses and uploads the OBJ model at `path`.
///
/// Fails if the file cannot be opened or contains no faces.
pub fn load_model_obj(
    source: &AssetSource,
    backend: &Arc<dyn GraphicsBackend>,
    path: &str,
) -> anyhow::Result<Model> {
    let reader = source.open(path)?;
    let parsed = obj::parse(reader, path).ok_or_else(|| anyhow!("No mesh data in {}", path))?;
    let meshes = parsed
        .meshes
        .iter()
        .map(|mesh| mesh.upload(backend))
        .collect();
    Ok(Model::new(&parsed.name, meshes, parsed.bounds))
}
