//! Decoded textures owned by the asset cache.
//!
//! Pixel decoding lives in `resources::texture`; this is the uploaded result.

use crate::render::{GpuTexture, TextureHandle};

/// An uploaded RGBA texture. Freed on the backend when dropped.
#[derive(Debug)]
pub struct Texture {
    pub path: String,
    pub width: u32,
    pub height: u32,
    gpu: GpuTexture,
}

impl Texture {
    pub fn new(path: &str, width: u32, height: u32, gpu: GpuTexture) -> Self {
        Self {
            path: path.to_string(),
            width,
            height,
            gpu,
        }
    }

    pub fn handle(&self) -> TextureHandle {
        self.gpu.handle()
    }
}
