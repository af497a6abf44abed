use std::sync::Arc;

use world_ngin::resources::{cache::AssetCache, source::AssetSource};

use crate::common::test_utils::{CountingBackend, QUAD_OBJ, write_fixture};

mod common;

fn cache(root: &std::path::Path) -> (Arc<CountingBackend>, AssetCache) {
    let backend = CountingBackend::new();
    let cache = AssetCache::new(backend.clone(), AssetSource::new(root));
    (backend, cache)
}

#[test]
fn models_are_shared_until_cleared() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "models/quad.obj", QUAD_OBJ);
    let (backend, cache) = cache(dir.path());

    let first = cache.get_model("models/quad.obj").unwrap();
    let second = cache.get_model("models/quad.obj").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(backend.mesh_uploads(), 1);
    assert!(first.has_texture_coordinates());

    cache.clear_cache();
    assert!(!cache.has_model("models/quad.obj"));
    // still held here
    assert_eq!(backend.live_meshes(), 1);
    drop((first, second));
    assert_eq!(backend.live_meshes(), 0);
}

#[test]
fn textured_models_share_their_texture() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "models/a.obj", QUAD_OBJ);
    write_fixture(dir.path(), "models/b.obj", QUAD_OBJ);
    let (backend, cache) = cache(dir.path());

    // the texture file does not exist, so both get the placeholder
    let a = cache.load_model("models/a.obj", Some("textures/bark.png")).unwrap();
    let b = cache.load_model("models/b.obj", Some("textures/bark.png")).unwrap();
    assert!(a.has_texture());
    assert!(Arc::ptr_eq(a.texture.as_ref().unwrap(), b.texture.as_ref().unwrap()));
    assert_eq!(backend.texture_uploads(), 1);
    assert_eq!(cache.texture_count(), 1);
}

#[test]
fn unsupported_and_missing_models_are_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "models/thing.fbx", "binary");
    write_fixture(dir.path(), "models/empty.obj", "# nothing here\n");
    let (backend, cache) = cache(dir.path());

    assert!(cache.get_model("models/thing.fbx").is_none());
    assert!(cache.get_model("models/empty.obj").is_none());
    assert!(cache.get_model("models/absent.obj").is_none());
    assert_eq!(cache.model_count(), 0);
    assert_eq!(backend.mesh_uploads(), 0);
}

#[test]
fn file_paths_bypass_the_asset_root() {
    let assets = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    write_fixture(elsewhere.path(), "quad.obj", QUAD_OBJ);
    let (_, cache) = cache(assets.path());

    let absolute = elsewhere.path().join("quad.obj");
    let absolute = absolute.to_str().unwrap();
    assert!(AssetSource::is_file_path(absolute));
    assert!(cache.get_model(absolute).is_some());
}

#[test]
fn dropping_the_cache_frees_everything() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path(), "models/quad.obj", QUAD_OBJ);
    let (backend, cache) = cache(dir.path());
    cache.preload_models(&["models/quad.obj"]);
    cache.preload_textures(&["textures/none.png"]);
    assert_eq!(backend.live_meshes(), 1);
    assert_eq!(backend.live_textures(), 1);
    drop(cache);
    assert_eq!(backend.live_meshes(), 0);
    assert_eq!(backend.live_textures(), 0);
}
