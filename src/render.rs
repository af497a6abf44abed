//! The graphics boundary and the draw logic built on top of it.
//!
//! Rasterization itself happens behind the [`GraphicsBackend`] trait, which the
//! crate only ever talks to through opaque handles. Everything above that line
//! (deciding whether an object is drawn from a cached model or a built-in
//! primitive, which meshes of a model get drawn, the ground plane) lives here.
//!
//! # Key types
//!
//! - [`GraphicsBackend`] uploads, draws and frees meshes and textures
//! - [`GpuMesh`] / [`GpuTexture`] own a handle and free it through the backend on drop
//! - [`Renderable`] is what an object resolves to for a frame
//! - [`PrimitiveMeshes`] holds the built-in shapes, uploaded once
//! - [`Renderer`] draws a whole environment
//!
//! Resource release is tied to `Drop`: the last owner of a [`GpuMesh`] frees it,
//! so a mesh can neither leak nor be freed twice.

use std::{collections::HashMap, fmt, sync::Arc};

use cgmath::{Matrix4, Vector3};

use crate::{
    data_structures::{
        environment::Environment,
        game_object::GameObject,
        model::{Mesh, MeshVertex, Model},
        primitives::{self, Primitive},
    },
    resources::cache::AssetCache,
};

/// Opaque id of an uploaded mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Opaque id of an uploaded texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Per-draw state passed along with a mesh handle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawParams {
    pub transform: Matrix4<f32>,
    pub color: [f32; 3],
    pub texture: Option<TextureHandle>,
}

impl DrawParams {
    pub fn new(transform: Matrix4<f32>, color: Vector3<f32>) -> Self {
        Self {
            transform,
            color: color.into(),
            texture: None,
        }
    }
}

/// The external rasterizer.
///
/// Implementations must accept calls from any thread; the asset cache may upload
/// from a preloading thread while the simulation draws.
pub trait GraphicsBackend: Send + Sync {
    fn upload_mesh(&self, vertices: &[MeshVertex], indices: &[u32], has_tex_coords: bool)
    -> MeshHandle;
    fn draw_mesh(&self, mesh: MeshHandle, params: &DrawParams);
    fn free_mesh(&self, mesh: MeshHandle);
    fn upload_texture(&self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle;
    fn free_texture(&self, texture: TextureHandle);
}

/// Owns a mesh handle; frees it when dropped.
pub struct GpuMesh {
    handle: MeshHandle,
    backend: Arc<dyn GraphicsBackend>,
}

impl GpuMesh {
    pub fn new(handle: MeshHandle, backend: Arc<dyn GraphicsBackend>) -> Self {
        Self { handle, backend }
    }

    pub fn handle(&self) -> MeshHandle {
        self.handle
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.backend.free_mesh(self.handle);
    }
}

impl fmt::Debug for GpuMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GpuMesh").field(&self.handle).finish()
    }
}

/// Owns a texture handle; frees it when dropped.
pub struct GpuTexture {
    handle: TextureHandle,
    backend: Arc<dyn GraphicsBackend>,
}

impl GpuTexture {
    pub fn new(handle: TextureHandle, backend: Arc<dyn GraphicsBackend>) -> Self {
        Self { handle, backend }
    }

    pub fn handle(&self) -> TextureHandle {
        self.handle
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.backend.free_texture(self.handle);
    }
}

impl fmt::Debug for GpuTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GpuTexture").field(&self.handle).finish()
    }
}

/// What a game object draws as this frame.
#[derive(Debug, Clone)]
pub enum Renderable {
    Model(Arc<Model>),
    Primitive(Primitive),
}

/// Decides how `object` is drawn.
///
/// Objects with a custom model go through the cache (loading with their texture
/// on first use). A model that cannot be loaded, or an object without one, falls
/// back to the primitive named by `model_type`, and to a cube if that name is
/// unknown too.
pub fn resolve(object: &GameObject, cache: &AssetCache) -> Renderable {
    if let Some(path) = object.custom_model_path() {
        let model = match object.texture_path.as_deref() {
            Some(texture) if !cache.has_model(path) => cache.load_model(path, Some(texture)),
            _ => cache.get_model(path),
        };
        match model {
            Some(model) => return Renderable::Model(model),
            None => log::debug!("{}: model {} unavailable, using primitive", object.id, path),
        }
    }
    Renderable::Primitive(Primitive::from_name_or_cube(&object.model_type))
}

/// Draws every mesh of `model`.
///
/// When the model carries a texture and has texture coordinates, the texture is
/// bound and only the meshes with texture coordinates are drawn.
pub fn draw_model(backend: &dyn GraphicsBackend, model: &Model, params: DrawParams) {
    let texture = model
        .texture
        .as_ref()
        .filter(|_| model.has_texture_coordinates())
        .map(|texture| texture.handle());
    let params = DrawParams { texture, ..params };
    model
        .meshes
        .iter()
        .filter(|mesh| texture.is_none() || mesh.has_tex_coords)
        .for_each(|mesh| backend.draw_mesh(mesh.handle(), &params));
}

/// The built-in shapes, uploaded once per backend.
pub struct PrimitiveMeshes {
    meshes: HashMap<Primitive, Mesh>,
    ground: Mesh,
}

impl PrimitiveMeshes {
    pub fn new(backend: &Arc<dyn GraphicsBackend>) -> Self {
        let meshes = Primitive::ALL
            .into_iter()
            .map(|primitive| {
                log::debug!("Uploading primitive {}", primitive.name());
                (primitive, primitive.mesh_data().upload(backend))
            })
            .collect();
        Self {
            meshes,
            ground: primitives::plane(1.0, 1.0).upload(backend),
        }
    }

    pub fn get(&self, primitive: Primitive) -> Option<&Mesh> {
        self.meshes.get(&primitive)
    }

    /// Unit ground quad; scaled to the environment's footprint when drawn.
    pub fn ground(&self) -> &Mesh {
        &self.ground
    }

    pub fn draw(&self, backend: &dyn GraphicsBackend, primitive: Primitive, params: DrawParams) {
        let mesh = self
            .meshes
            .get(&primitive)
            .or_else(|| self.meshes.get(&Primitive::Cube));
        if let Some(mesh) = mesh {
            backend.draw_mesh(mesh.handle(), &params);
        }
    }
}

/// Draws environments through a backend, resolving models through the cache.
pub struct Renderer {
    backend: Arc<dyn GraphicsBackend>,
    primitives: PrimitiveMeshes,
}

impl Renderer {
    pub fn new(backend: Arc<dyn GraphicsBackend>) -> Self {
        log::info!("Uploading primitive meshes");
        let primitives = PrimitiveMeshes::new(&backend);
        Self {
            backend,
            primitives,
        }
    }

    pub fn primitives(&self) -> &PrimitiveMeshes {
        &self.primitives
    }

    /// Ground plane first, then every object in insertion order.
    pub fn draw_environment(&self, environment: &Environment, cache: &AssetCache) {
        let bounds = environment.bounds;
        let ground = DrawParams::new(
            Matrix4::from_nonuniform_scale(bounds.x * 2.0, 1.0, bounds.z * 2.0),
            environment.ground_color,
        );
        self.backend
            .draw_mesh(self.primitives.ground().handle(), &ground);

        for object in &environment.objects {
            self.draw_object(object, cache);
        }
    }

    pub fn draw_object(&self, object: &GameObject, cache: &AssetCache) {
        let params = DrawParams::new(object.transform.to_matrix(), object.color);
        match resolve(object, cache) {
            Renderable::Model(model) => draw_model(self.backend.as_ref(), &model, params),
            Renderable::Primitive(primitive) => {
                self.primitives
                    .draw(self.backend.as_ref(), primitive, params)
            }
        }
    }

    /// Loads every custom model `environment` references that is not cached yet.
    pub fn preload_models(&self, environment: &Environment, cache: &AssetCache) {
        log::info!("Preloading models for environment: {}", environment.name);
        for object in &environment.objects {
            if let Some(path) = object.custom_model_path() {
                if !cache.has_model(path) {
                    cache.load_model(path, object.texture_path.as_deref());
                }
            }
        }
    }
}
