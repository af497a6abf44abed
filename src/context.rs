//! The engine context: settings, the graphics backend and the asset cache.
//!
//! There is no global state. A [`Context`] is built once with [`Context::new`]
//! and everything that loads assets borrows its cache. Dropping the context (or
//! calling [`Context::shutdown`]) releases every cached model and texture.

use std::sync::Arc;

use crate::{
    config::Config,
    data_structures::world::World,
    flow::Session,
    render::{GraphicsBackend, Renderer},
    resources::{cache::AssetCache, scene, source::AssetSource},
};

pub const EMPTY_WORLD_ID: &str = "empty";
pub const EMPTY_WORLD_NAME: &str = "Empty World";

/// Installs `env_logger` with `level` as the default filter. `RUST_LOG` still
/// wins when set. Returns false if a logger was already installed.
pub fn init_logging(level: &str) -> bool {
    let env = env_logger::Env::default().default_filter_or(level.to_string());
    match env_logger::Builder::from_env(env).try_init() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not initialize logger: {}", e);
            false
        }
    }
}

pub struct Context {
    pub config: Config,
    backend: Arc<dyn GraphicsBackend>,
    cache: Arc<AssetCache>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("models", &self.cache.model_count())
            .field("textures", &self.cache.texture_count())
            .finish()
    }
}

impl Context {
    pub fn new(config: Config, backend: Arc<dyn GraphicsBackend>) -> Self {
        let source = AssetSource::new(&config.asset_root);
        let cache = Arc::new(AssetCache::new(backend.clone(), source));
        log::info!("Context ready, assets from {}", config.asset_root);
        Self {
            config,
            backend,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }

    pub fn backend(&self) -> &Arc<dyn GraphicsBackend> {
        &self.backend
    }

    pub fn source(&self) -> &AssetSource {
        self.cache.source()
    }

    /// Loads the configured world file.
    pub fn load_world(&self) -> World {
        self.load_world_from(&self.config.world)
    }

    /// Loads the world at `path`, preloading its custom models. Falls back to
    /// an empty world if the file cannot be read.
    pub fn load_world_from(&self, path: &str) -> World {
        match scene::load_world(self.source(), path, Some(&self.cache)) {
            Ok(world) => world,
            Err(e) => {
                log::error!("Failed to load world {}: {:#}", path, e);
                World::new(EMPTY_WORLD_ID, EMPTY_WORLD_NAME)
            }
        }
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.backend.clone())
    }

    /// A session on the configured world with the configured portal cooldown.
    pub fn session(&self) -> Session {
        Session::with_cooldown(self.load_world(), self.config.portal_cooldown())
    }

    /// Releases every cached asset. Safe to call more than once; models still
    /// held elsewhere are freed when their last owner drops them.
    pub fn shutdown(&self) {
        if self.cache.model_count() > 0 || self.cache.texture_count() > 0 {
            log::info!("Releasing cached assets");
        }
        self.cache.clear_cache();
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::render::test_backend::RecordingBackend;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 3\n";

    fn context(root: &std::path::Path) -> (Arc<RecordingBackend>, Context) {
        let backend = RecordingBackend::new();
        let config = Config {
            asset_root: root.to_string_lossy().into_owned(),
            world: "worlds/main.json".to_string(),
            portal_cooldown_millis: 500,
            ..Default::default()
        };
        let context = Context::new(config, backend.clone());
        (backend, context)
    }

    #[test]
    fn missing_world_yields_the_empty_world() {
        let dir = tempfile::tempdir().unwrap();
        let (_, context) = context(dir.path());
        let world = context.load_world();
        assert_eq!(world.id, "empty");
        assert_eq!(world.name, "Empty World");
        assert!(world.current_environment().is_none());
    }

    #[test]
    fn loading_a_world_preloads_models_and_shutdown_frees_them() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("worlds")).unwrap();
        fs::create_dir_all(dir.path().join("models")).unwrap();
        fs::write(dir.path().join("models/rock.obj"), TRIANGLE).unwrap();
        fs::write(
            dir.path().join("worlds/main.json"),
            r#"{"id": "w", "name": "W", "startEnvironment": "yard", "environments": ["yard.json"]}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("worlds/yard.json"),
            r#"{"id": "yard", "name": "Yard", "type": "outdoor",
                "objects": [{"id": "r", "type": "static", "modelPath": "models/rock.obj"}]}"#,
        )
        .unwrap();

        let (backend, context) = context(dir.path());
        let session = context.session();
        assert_eq!(session.world.current_environment_id(), Some("yard"));
        assert_eq!(session.navigator.remaining_cooldown(), instant::Duration::ZERO);
        assert!(context.cache().has_model("models/rock.obj"));
        assert_eq!(backend.live_meshes(), 1);

        context.shutdown();
        context.shutdown();
        assert_eq!(backend.live_meshes(), 0);
    }

    #[test]
    fn dropping_the_context_releases_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tri.obj"), TRIANGLE).unwrap();
        let (backend, context) = context(dir.path());
        context.cache().get_model("tri.obj").unwrap();
        assert_eq!(backend.live_meshes(), 1);
        drop(context);
        assert_eq!(backend.live_meshes(), 0);
    }

    #[test]
    fn logging_initializes_once() {
        init_logging("debug");
        assert!(!init_logging("debug"));
    }
}
