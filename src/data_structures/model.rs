//! Parsed, renderable model content.
//!
//! A [`MeshData`] is the CPU side of a mesh as produced by the OBJ parser or the
//! primitive generators. Once uploaded through a [`GraphicsBackend`] it becomes a
//! [`Mesh`] that owns its GPU handle. A [`Model`] groups meshes and is what the
//! asset cache hands out, shared as `Arc<Model>`.

use std::sync::Arc;

use cgmath::Vector3;

use crate::{
    data_structures::texture::Texture,
    render::{GpuMesh, GraphicsBackend, MeshHandle},
};

/// Vertex layout shared by every mesh: position, tint, normal and texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl MeshVertex {
    pub const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
    pub const UP: [f32; 3] = [0.0, 1.0, 0.0];
}

/// Axis-aligned bounding box. An empty box has `min > max` on every axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vector3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    pub fn include(&mut self, p: [f32; 3]) {
        self.min.x = self.min.x.min(p[0]);
        self.min.y = self.min.y.min(p[1]);
        self.min.z = self.min.z.min(p[2]);
        self.max.x = self.max.x.max(p[0]);
        self.max.y = self.max.y.max(p[1]);
        self.max.z = self.max.z.max(p[2]);
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// CPU side mesh buffers, ready for upload.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub has_tex_coords: bool,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn upload(&self, backend: &Arc<dyn GraphicsBackend>) -> Mesh {
        let handle = backend.upload_mesh(&self.vertices, &self.indices, self.has_tex_coords);
        Mesh {
            name: self.name.clone(),
            gpu: GpuMesh::new(handle, backend.clone()),
            index_count: self.indices.len() as u32,
            has_tex_coords: self.has_tex_coords,
        }
    }
}

/// An uploaded mesh. The GPU resource is freed when the mesh is dropped.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    gpu: GpuMesh,
    pub index_count: u32,
    pub has_tex_coords: bool,
}

impl Mesh {
    pub fn handle(&self) -> MeshHandle {
        self.gpu.handle()
    }
}

/// A named, immutable collection of meshes with its bounding box.
///
/// Models are shared through `Arc`; the meshes (and the texture, once its last
/// user is gone) are released when the final reference is dropped.
#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub bounds: Aabb,
    pub texture: Option<Arc<Texture>>,
    pub texture_path: Option<String>,
}

impl Model {
    pub fn new(name: &str, meshes: Vec<Mesh>, bounds: Aabb) -> Self {
        Self {
            name: name.to_string(),
            meshes,
            bounds,
            texture: None,
            texture_path: None,
        }
    }

    pub fn with_texture(mut self, path: &str, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self.texture_path = Some(path.to_string());
        self
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some() || self.texture_path.is_some()
    }

    pub fn has_texture_coordinates(&self) -> bool {
        self.meshes.iter().any(|m| m.has_tex_coords)
    }
}
