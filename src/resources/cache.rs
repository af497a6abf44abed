//! Path keyed cache of loaded models and textures.
//!
//! The cache owns one `Arc` per entry; callers get clones of it. Releasing an
//! entry (replacing, clearing) drops the cache's reference, and the GPU
//! resources go away as soon as the last clone does. A model or texture can
//! therefore never be freed while something still draws with it, and is freed
//! exactly once.
//!
//! Both maps are [`DashMap`]s. Loading and uploading happen with no lock held;
//! the result is published in a single insert, so concurrent readers either see
//! a complete entry or none.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    data_structures::{model::Model, texture::Texture},
    render::GraphicsBackend,
    resources::{load_model_obj, source::AssetSource, texture},
};

pub struct AssetCache {
    backend: Arc<dyn GraphicsBackend>,
    source: AssetSource,
    models: DashMap<String, Arc<Model>>,
    textures: DashMap<String, Arc<Texture>>,
}

impl AssetCache {
    pub fn new(backend: Arc<dyn GraphicsBackend>, source: AssetSource) -> Self {
        Self {
            backend,
            source,
            models: DashMap::new(),
            textures: DashMap::new(),
        }
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    pub fn backend(&self) -> &Arc<dyn GraphicsBackend> {
        &self.backend
    }

    /// The cached model for `path`, loading it on a miss.
    ///
    /// `None` means the model could not be loaded and a primitive should be
    /// drawn instead. Failures are not cached, so the next call tries again.
    /// When two threads miss on the same path at once, the first insert wins
    /// and the other copy is dropped.
    pub fn get_model(&self, path: &str) -> Option<Arc<Model>> {
        if let Some(model) = self.models.get(path) {
            log::debug!("Returning cached model: {}", path);
            return Some(model.clone());
        }

        let loaded = Arc::new(self.read_model(path, None)?);
        let cached = self
            .models
            .entry(path.to_string())
            .or_insert(loaded.clone())
            .clone();
        if Arc::ptr_eq(&cached, &loaded) {
            log::info!("Cached model: {}", path);
        } else {
            log::debug!("Model {} was cached concurrently, dropping duplicate", path);
        }
        Some(cached)
    }

    /// Loads `path` again even if it is cached, attaching the texture at
    /// `texture_path` if given.
    ///
    /// On success the new model replaces the old entry before the old one is
    /// released. On failure the old entry is released as well, so a stale
    /// model is never handed out after a reload.
    pub fn load_model(&self, path: &str, texture_path: Option<&str>) -> Option<Arc<Model>> {
        log::info!("Loading model: {}", path);
        if let Some(texture_path) = texture_path {
            log::info!("With texture: {}", texture_path);
        }

        match self.read_model(path, texture_path) {
            Some(model) => {
                let model = Arc::new(model);
                let previous = self.models.insert(path.to_string(), model.clone());
                if previous.is_some() {
                    log::debug!("Released previous model for {}", path);
                }
                log::info!("Cached model: {}", path);
                Some(model)
            }
            None => {
                if self.models.remove(path).is_some() {
                    log::debug!("Released previous model for {}", path);
                }
                None
            }
        }
    }

    pub fn has_model(&self, path: &str) -> bool {
        self.models.contains_key(path)
    }

    /// Loads every path in `paths` that is not cached yet.
    pub fn preload_models<S: AsRef<str>>(&self, paths: &[S]) {
        log::info!("Preloading {} models", paths.len());
        for path in paths {
            let path = path.as_ref();
            if !self.has_model(path) {
                self.load_model(path, None);
            }
        }
    }

    /// The cached texture for `path`, loading it on a miss. Never fails: an
    /// unreadable image is replaced by a placeholder.
    pub fn get_texture(&self, path: &str) -> Arc<Texture> {
        if let Some(texture) = self.textures.get(path) {
            log::debug!("Returning cached texture: {}", path);
            return texture.clone();
        }

        let loaded = Arc::new(texture::load(&self.source, &self.backend, path));
        let cached = self
            .textures
            .entry(path.to_string())
            .or_insert(loaded.clone())
            .clone();
        if Arc::ptr_eq(&cached, &loaded) {
            log::info!("Cached texture: {}", path);
        }
        cached
    }

    /// Loads `path` again even if it is cached, replacing the old entry.
    pub fn load_texture(&self, path: &str) -> Arc<Texture> {
        log::info!("Loading texture: {}", path);
        let texture = Arc::new(texture::load(&self.source, &self.backend, path));
        if self
            .textures
            .insert(path.to_string(), texture.clone())
            .is_some()
        {
            log::debug!("Released previous texture for {}", path);
        }
        texture
    }

    pub fn has_texture(&self, path: &str) -> bool {
        self.textures.contains_key(path)
    }

    pub fn preload_textures<S: AsRef<str>>(&self, paths: &[S]) {
        log::info!("Preloading {} textures", paths.len());
        for path in paths {
            let path = path.as_ref();
            if !self.has_texture(path) {
                self.load_texture(path);
            }
        }
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn clear_model_cache(&self) {
        log::info!("Clearing model cache ({} models)", self.models.len());
        self.models.clear();
    }

    pub fn clear_texture_cache(&self) {
        log::info!("Clearing texture cache ({} textures)", self.textures.len());
        self.textures.clear();
    }

    /// Releases every model and texture. Safe to call on an empty cache.
    pub fn clear_cache(&self) {
        log::info!("Clearing all caches");
        self.clear_model_cache();
        self.clear_texture_cache();
    }

    fn read_model(&self, path: &str, texture_path: Option<&str>) -> Option<Model> {
        if !path.to_ascii_lowercase().ends_with(".obj") {
            log::warn!("Unsupported model format: {}", path);
            return None;
        }

        let model = match load_model_obj(&self.source, &self.backend, path) {
            Ok(model) => model,
            Err(e) => {
                log::warn!("Failed to load OBJ model {}: {:#}", path, e);
                return None;
            }
        };

        Some(match texture_path.filter(|texture| !texture.is_empty()) {
            Some(texture_path) => model.with_texture(texture_path, self.get_texture(texture_path)),
            None => model,
        })
    }
}

impl Drop for AssetCache {
    fn drop(&mut self) {
        if !self.models.is_empty() || !self.textures.is_empty() {
            self.clear_cache();
        }
    }
}
