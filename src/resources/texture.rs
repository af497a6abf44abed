//! Image decoding for model textures.
//!
//! Decoding goes through `image`, always ending up as tightly packed RGBA8.
//! When a texture cannot be read or decoded, [`load`] substitutes a grey
//! checkerboard so that textured models stay visibly textured.

use std::sync::Arc;

use image::{ImageFormat, load_from_memory, load_from_memory_with_format};

use crate::{
    data_structures::texture::Texture,
    render::{GpuTexture, GraphicsBackend},
    resources::source::AssetSource,
};

const PLACEHOLDER_SIZE: u32 = 64;
const PLACEHOLDER_CHECK: u32 = 8;

/// Decoded RGBA8 pixels, row major, top row first.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes `bytes`, using the extension of `name` as a format hint when it has
/// a known one.
pub fn decode(bytes: &[u8], name: &str) -> anyhow::Result<DecodedImage> {
    let img = match ImageFormat::from_path(name) {
        Ok(format) => load_from_memory_with_format(bytes, format)?,
        Err(_) => load_from_memory(bytes)?,
    };
    let rgba = img.to_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Reads and decodes the image at `path`.
pub fn load_image_bytes(source: &AssetSource, path: &str) -> anyhow::Result<DecodedImage> {
    let bytes = source.read_bytes(path)?;
    decode(&bytes, path)
}

/// 64x64 grey checkerboard in 8 pixel checks, alternating 255 and 200.
pub fn placeholder() -> DecodedImage {
    let size = PLACEHOLDER_SIZE;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let value = if (x / PLACEHOLDER_CHECK + y / PLACEHOLDER_CHECK) % 2 == 0 {
                255
            } else {
                200
            };
            rgba.extend_from_slice(&[value, value, value, 255]);
        }
    }
    DecodedImage {
        width: size,
        height: size,
        rgba,
    }
}

pub fn upload(backend: &Arc<dyn GraphicsBackend>, path: &str, image: &DecodedImage) -> Texture {
    let handle = backend.upload_texture(image.width, image.height, &image.rgba);
    Texture::new(
        path,
        image.width,
        image.height,
        GpuTexture::new(handle, backend.clone()),
    )
}

/// Loads and uploads the texture at `path`, falling back to [`placeholder`].
pub fn load(source: &AssetSource, backend: &Arc<dyn GraphicsBackend>, path: &str) -> Texture {
    let image = match load_image_bytes(source, path) {
        Ok(image) => {
            log::info!("Loaded texture {}: {}x{}", path, image.width, image.height);
            image
        }
        Err(e) => {
            log::warn!("Failed to load texture {}: {:#}. Using placeholder.", path, e);
            placeholder()
        }
    };
    upload(backend, path, &image)
}
