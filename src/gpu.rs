//! [`GraphicsBackend`] on top of wgpu.
//!
//! The backend owns every buffer and texture handed out as a handle. Draw
//! calls are queued and replayed into a render pass with
//! [`WgpuBackend::encode_draws`]; the pipeline and per-draw uniforms belong to
//! the caller.

use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use anyhow::Context as _;
use dashmap::DashMap;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::model::MeshVertex,
    render::{DrawParams, GraphicsBackend, MeshHandle, TextureHandle},
};

pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Vertex buffer layout matching [`MeshVertex`]: position, color and normal at
/// shader locations 0 to 2, texture coordinates at 3.
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    use std::mem;
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: mem::size_of::<[f32; 9]>() as wgpu::BufferAddress,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x2,
        },
    ];
    wgpu::VertexBufferLayout {
        array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

struct TextureResources {
    // kept alive for the view
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub struct WgpuBackend {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    sampler: wgpu::Sampler,
    meshes: DashMap<u64, MeshBuffers>,
    textures: DashMap<u64, TextureResources>,
    next_id: AtomicU64,
    draws: Mutex<Vec<(MeshHandle, DrawParams)>>,
}

impl std::fmt::Debug for WgpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuBackend")
            .field("meshes", &self.meshes.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            device,
            queue,
            sampler,
            meshes: DashMap::new(),
            textures: DashMap::new(),
            next_id: AtomicU64::new(1),
            draws: Mutex::new(Vec::new()),
        }
    }

    /// Creates a device without a surface, for tools and tests.
    pub async fn new_headless() -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter available")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("world-ngin device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .context("Could not open graphics device")?;
        Ok(Self::new(device, queue))
    }

    pub fn new_headless_blocking() -> anyhow::Result<Self> {
        futures::executor::block_on(Self::new_headless())
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn texture_view(&self, handle: TextureHandle) -> Option<wgpu::TextureView> {
        self.textures.get(&handle.0).map(|t| t.view.clone())
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn queued_draws(&self) -> usize {
        self.draws.lock().map(|d| d.len()).unwrap_or(0)
    }

    /// Replays and clears the queued draws. `bind` is called before each draw
    /// to set the pipeline state for its parameters. Draws of meshes freed in
    /// the meantime are skipped.
    pub fn encode_draws<F>(&self, pass: &mut wgpu::RenderPass<'_>, mut bind: F)
    where
        F: FnMut(&mut wgpu::RenderPass<'_>, &DrawParams),
    {
        let draws = match self.draws.lock() {
            Ok(mut draws) => std::mem::take(&mut *draws),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for (handle, params) in draws {
            let Some(mesh) = self.meshes.get(&handle.0) else {
                log::trace!("Skipping draw of freed mesh {:?}", handle);
                continue;
            };
            bind(pass, &params);
            pass.set_vertex_buffer(0, mesh.vertex.slice(..));
            pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl GraphicsBackend for WgpuBackend {
    fn upload_mesh(
        &self,
        vertices: &[MeshVertex],
        indices: &[u32],
        _has_tex_coords: bool,
    ) -> MeshHandle {
        let vertex = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let id = self.next_id();
        self.meshes.insert(
            id,
            MeshBuffers {
                vertex,
                index,
                index_count: indices.len() as u32,
            },
        );
        MeshHandle(id)
    }

    fn draw_mesh(&self, mesh: MeshHandle, params: &DrawParams) {
        if let Ok(mut draws) = self.draws.lock() {
            draws.push((mesh, *params));
        }
    }

    fn free_mesh(&self, mesh: MeshHandle) {
        if let Some((_, buffers)) = self.meshes.remove(&mesh.0) {
            buffers.vertex.destroy();
            buffers.index.destroy();
        }
    }

    fn upload_texture(&self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Model Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let id = self.next_id();
        self.textures.insert(
            id,
            TextureResources {
                _texture: texture,
                view,
            },
        );
        TextureHandle(id)
    }

    fn free_texture(&self, texture: TextureHandle) {
        self.textures.remove(&texture.0);
    }
}
