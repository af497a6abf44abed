//! JSON scene descriptions: a world file listing environment files, and the
//! environment files themselves.
//!
//! Every field is optional. Absent values fall back to fixed defaults, so a
//! document only fails to load when it cannot be read or is not valid JSON of
//! the expected shape.
//!
//! ```json
//! {
//!   "id": "demo",
//!   "name": "Demo World",
//!   "startEnvironment": "forest",
//!   "environments": ["forest.json", "cabin.json"]
//! }
//! ```

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Context;
use cgmath::Vector3;
use serde::Deserialize;

use crate::{
    data_structures::{
        environment::{
            DEFAULT_BOUNDS, DEFAULT_GROUND_COLOR, DEFAULT_SKY_COLOR, DEFAULT_SPAWN, Environment,
            EnvironmentKind, Indoor, Outdoor,
        },
        game_object::{Actor, Container, GameObject, ObjectKind, StaticObject},
        portal::{DEFAULT_COLOR, DEFAULT_TRANSPARENCY, DEFAULT_TRIGGER_SIZE, Portal},
        transform::Transform,
        world::World,
    },
    resources::{cache::AssetCache, source::AssetSource},
};

static GENERATED_IDS: AtomicU64 = AtomicU64::new(0);

fn generated_id(prefix: &str) -> String {
    format!("{}_{}", prefix, GENERATED_IDS.fetch_add(1, Ordering::Relaxed))
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PositionDocument {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<PositionDocument> for Vector3<f32> {
    fn from(p: PositionDocument) -> Self {
        Vector3::new(p.x, p.y, p.z)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SizeDocument {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl From<SizeDocument> for Vector3<f32> {
    fn from(s: SizeDocument) -> Self {
        Vector3::new(s.width, s.height, s.depth)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ColorDocument {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl From<ColorDocument> for Vector3<f32> {
    fn from(c: ColorDocument) -> Self {
        Vector3::new(c.r, c.g, c.b)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransformDocument {
    pub position: Option<PositionDocument>,
    pub rotation: Option<PositionDocument>,
    pub scale: Option<PositionDocument>,
}

impl From<TransformDocument> for Transform {
    fn from(t: TransformDocument) -> Self {
        let identity = Transform::identity();
        Transform::new(
            t.position.map_or(identity.position, Into::into),
            t.rotation.map_or(identity.rotation, Into::into),
            t.scale.map_or(identity.scale, Into::into),
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldDocument {
    pub id: Option<String>,
    pub name: Option<String>,
    pub start_environment: Option<String>,
    pub environments: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectDocument {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub subtype: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub model_path: Option<String>,
    pub texture_path: Option<String>,
    pub transform: Option<TransformDocument>,
    pub color: Option<ColorDocument>,
    /// Container contents.
    pub items: Option<Vec<String>>,
    /// Whether a container starts open.
    pub open: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortalDocument {
    pub id: Option<String>,
    pub name: Option<String>,
    pub target_environment_id: Option<String>,
    pub target_spawn_point: Option<String>,
    pub transform: Option<TransformDocument>,
    pub trigger_size: Option<SizeDocument>,
    pub color: Option<ColorDocument>,
    pub transparency: Option<f32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvironmentDocument {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub bounds: Option<SizeDocument>,
    pub spawn_point: Option<PositionDocument>,
    pub spawn_points: Option<HashMap<String, PositionDocument>>,
    pub ground_color: Option<ColorDocument>,
    pub sky_color: Option<ColorDocument>,
    pub objects: Option<Vec<ObjectDocument>>,
    pub portals: Option<Vec<PortalDocument>>,
    pub has_ceiling: Option<bool>,
    pub ambient_light: Option<f32>,
    pub render_sky: Option<bool>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<ObjectDocument> for GameObject {
    fn from(doc: ObjectDocument) -> Self {
        let id = doc.id.unwrap_or_else(|| generated_id("obj"));
        let name = doc.name.unwrap_or_else(|| id.clone());
        let subtype = doc.subtype.unwrap_or_else(|| "unknown".to_string());
        let model = doc.model.unwrap_or_else(|| "cube".to_string());

        let kind = match doc.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("actor") => ObjectKind::Actor(Actor::new(&subtype)),
            Some("container") => {
                let mut container = Container::new();
                for item in doc.items.iter().flatten() {
                    container.add_item(item);
                }
                if doc.open.unwrap_or(false) {
                    container.open();
                }
                ObjectKind::Container(container)
            }
            _ => ObjectKind::Static(StaticObject::new(&subtype)),
        };

        let mut object = GameObject::new(&id, &name, &model, kind);
        if let Some(transform) = doc.transform {
            object.transform = transform.into();
        }
        if let Some(color) = doc.color {
            object.color = color.into();
        }
        object.model_path = non_empty(doc.model_path);
        object.texture_path = non_empty(doc.texture_path);
        object
    }
}

impl From<PortalDocument> for Portal {
    fn from(doc: PortalDocument) -> Self {
        let id = doc.id.unwrap_or_else(|| generated_id("portal"));
        let mut portal = Portal::new(
            &id,
            doc.name.as_deref().unwrap_or("Portal"),
            doc.target_environment_id.as_deref().unwrap_or_default(),
            doc.target_spawn_point.as_deref().unwrap_or("default"),
        );
        if let Some(position) = doc.transform.and_then(|t| t.position) {
            portal.transform.position = position.into();
        }
        portal.trigger_size = doc.trigger_size.map_or(DEFAULT_TRIGGER_SIZE, Into::into);
        portal.color = doc.color.map_or(DEFAULT_COLOR, Into::into);
        portal.set_transparency(doc.transparency.unwrap_or(DEFAULT_TRANSPARENCY));
        portal
    }
}

impl From<EnvironmentDocument> for Environment {
    fn from(doc: EnvironmentDocument) -> Self {
        let id = doc.id.as_deref().unwrap_or("unknown");
        let name = doc.name.as_deref().unwrap_or("Unnamed Environment");

        let kind = if doc
            .kind
            .as_deref()
            .is_some_and(|kind| kind.eq_ignore_ascii_case("indoor"))
        {
            let mut indoor = Indoor::default();
            if let Some(has_ceiling) = doc.has_ceiling {
                indoor.has_ceiling = has_ceiling;
            }
            if let Some(level) = doc.ambient_light {
                indoor.set_ambient_light(level);
            }
            EnvironmentKind::Indoor(indoor)
        } else {
            let mut outdoor = Outdoor::default();
            if let Some(render_sky) = doc.render_sky {
                outdoor.render_sky = render_sky;
            }
            EnvironmentKind::Outdoor(outdoor)
        };

        let mut environment = Environment::new(id, name, kind);
        environment.bounds = doc.bounds.map_or(DEFAULT_BOUNDS, Into::into);
        environment.set_spawn_point(doc.spawn_point.map_or(DEFAULT_SPAWN, Into::into));
        environment.ground_color = doc.ground_color.map_or(DEFAULT_GROUND_COLOR, Into::into);
        environment.sky_color = doc.sky_color.map_or(DEFAULT_SKY_COLOR, Into::into);

        for (name, position) in doc.spawn_points.into_iter().flatten() {
            environment.add_spawn_point(&name, position.into());
        }
        for object in doc.objects.into_iter().flatten() {
            environment.add_object(object.into());
        }
        for portal in doc.portals.into_iter().flatten() {
            environment.add_portal(portal.into());
        }
        environment
    }
}

pub fn parse_environment(json: &str) -> anyhow::Result<Environment> {
    let doc: EnvironmentDocument = serde_json::from_str(json)?;
    Ok(doc.into())
}

/// Reads the environment file at `path`.
pub fn load_environment(source: &AssetSource, path: &str) -> anyhow::Result<Environment> {
    let json = source.read_string(path)?;
    let environment =
        parse_environment(&json).with_context(|| format!("Invalid environment file {}", path))?;
    log::info!(
        "Loaded environment '{}' ({}) with {} objects and {} portals",
        environment.id,
        environment.type_name(),
        environment.objects.len(),
        environment.portals.len()
    );
    Ok(environment)
}

/// Directory part of `path`, including the trailing slash.
fn base_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(slash) => &path[..=slash],
        None => "",
    }
}

/// Reads the world file at `path` and every environment file it lists.
///
/// Environment files are resolved relative to the world file's directory. One
/// that fails to load is logged and skipped. When a cache is given, the custom
/// models of every loaded environment are loaded into it as well.
pub fn load_world(
    source: &AssetSource,
    path: &str,
    cache: Option<&AssetCache>,
) -> anyhow::Result<World> {
    let json = source.read_string(path)?;
    let doc: WorldDocument =
        serde_json::from_str(&json).with_context(|| format!("Invalid world file {}", path))?;

    let mut world = World::new(
        doc.id.as_deref().unwrap_or("unknown"),
        doc.name.as_deref().unwrap_or("Unnamed World"),
    );

    let base = base_path(path);
    for file in doc.environments.iter().flatten() {
        let environment_path = format!("{}{}", base, file);
        match load_environment(source, &environment_path) {
            Ok(environment) => {
                if let Some(cache) = cache {
                    preload(cache, &environment);
                }
                world.add_environment(environment);
            }
            Err(e) => log::warn!("Skipping environment {}: {:#}", environment_path, e),
        }
    }

    if let Some(start) = doc.start_environment.as_deref() {
        world.set_current_environment_id(start);
    }

    log::info!(
        "Loaded world '{}' with {} environments, starting in {:?}",
        world.name,
        world.environments().len(),
        world.current_environment_id()
    );
    Ok(world)
}

fn preload(cache: &AssetCache, environment: &Environment) {
    for object in &environment.objects {
        if let Some(model_path) = object.custom_model_path() {
            if !cache.has_model(model_path) {
                cache.load_model(model_path, object.texture_path.as_deref());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, sync::Arc};

    use super::*;
    use crate::render::{GraphicsBackend, test_backend::RecordingBackend};

    fn write(dir: &Path, name: &str, text: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, text).unwrap();
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let env = parse_environment("{}").unwrap();
        assert_eq!(env.id, "unknown");
        assert_eq!(env.name, "Unnamed Environment");
        assert_eq!(env.type_name(), "outdoor");
        assert_eq!(env.bounds, DEFAULT_BOUNDS);
        assert_eq!(env.spawn_point(), DEFAULT_SPAWN);
        assert_eq!(env.ground_color, DEFAULT_GROUND_COLOR);
        assert_eq!(env.sky_color, DEFAULT_SKY_COLOR);
        assert!(env.objects.is_empty());
        assert!(env.portals.is_empty());
    }

    #[test]
    fn environment_fields_are_read() {
        let env = parse_environment(
            r#"{
                "id": "cabin",
                "type": "Indoor",
                "name": "Cabin",
                "bounds": {"width": 10, "height": 4, "depth": 8},
                "spawnPoint": {"x": 1, "y": 1.7, "z": 2},
                "spawnPoints": {"door": {"x": 0, "y": 1, "z": 3}},
                "groundColor": {"r": 0.4, "g": 0.3, "b": 0.2},
                "ambientLight": 4.0,
                "hasCeiling": false
            }"#,
        )
        .unwrap();
        assert_eq!(env.id, "cabin");
        assert_eq!(env.bounds, Vector3::new(10.0, 4.0, 8.0));
        assert_eq!(env.spawn_point_named("default"), Vector3::new(1.0, 1.7, 2.0));
        assert_eq!(env.spawn_point_named("door"), Vector3::new(0.0, 1.0, 3.0));
        assert_eq!(env.ground_color, Vector3::new(0.4, 0.3, 0.2));
        assert_eq!(env.sky_color, DEFAULT_SKY_COLOR);
        match &env.kind {
            EnvironmentKind::Indoor(indoor) => {
                assert!(!indoor.has_ceiling);
                assert_eq!(indoor.ambient_light(), 1.0);
            }
            other => panic!("expected indoor, got {other:?}"),
        }
    }

    #[test]
    fn object_without_transform_is_at_identity() {
        let env = parse_environment(r#"{"objects": [{"id": "rock", "model": "sphere"}]}"#).unwrap();
        let rock = &env.objects[0];
        assert_eq!(rock.transform.position, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(rock.transform.rotation, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(rock.transform.scale, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(rock.name, "rock");
        assert_eq!(rock.model_type, "sphere");
        assert_eq!(rock.color, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(rock.as_static().map(|s| s.subtype.as_str()), Some("unknown"));
    }

    #[test]
    fn object_types_select_variants() {
        let env = parse_environment(
            r#"{"objects": [
                {"id": "deer", "type": "actor", "subtype": "creature"},
                {"id": "chest", "type": "CONTAINER", "items": ["coin", "key"], "open": true},
                {"id": "bench", "type": "bench", "subtype": "furniture"},
                {"id": "tree", "modelPath": "", "texturePath": "", "transform": {"scale": {"x": 2, "y": 3, "z": 2}}}
            ]}"#,
        )
        .unwrap();
        assert!(env.objects[0].as_actor().is_some_and(Actor::is_creature));
        let chest = env.objects[1].as_container().unwrap();
        assert_eq!(chest.items(), ["coin".to_string(), "key".to_string()]);
        assert!(chest.is_open());
        assert!(env.objects[2].as_static().is_some_and(StaticObject::is_furniture));

        let tree = &env.objects[3];
        assert!(!tree.has_custom_model());
        assert!(tree.texture_path.is_none());
        assert_eq!(tree.model_type, "cube");
        assert_eq!(tree.transform.scale, Vector3::new(2.0, 3.0, 2.0));
        assert_eq!(tree.transform.position, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn missing_ids_are_generated_and_unique() {
        let env = parse_environment(r#"{"objects": [{}, {}], "portals": [{}]}"#).unwrap();
        assert!(env.objects[0].id.starts_with("obj_"));
        assert_ne!(env.objects[0].id, env.objects[1].id);
        assert_eq!(env.objects[0].name, env.objects[0].id);
        assert!(env.portals[0].id.starts_with("portal_"));
    }

    #[test]
    fn portal_defaults() {
        let env = parse_environment(
            r#"{"portals": [
                {"id": "p1", "targetEnvironmentId": "cave", "transform": {"position": {"x": 5, "y": 0, "z": -3}}},
                {"id": "p2", "name": "Gate", "targetEnvironmentId": "cave", "targetSpawnPoint": "door",
                 "triggerSize": {"width": 1, "height": 1, "depth": 1}, "transparency": 3}
            ]}"#,
        )
        .unwrap();
        let p1 = &env.portals[0];
        assert_eq!(p1.name, "Portal");
        assert_eq!(p1.target_spawn_point, "default");
        assert_eq!(p1.trigger_size, DEFAULT_TRIGGER_SIZE);
        assert_eq!(p1.transform.position, Vector3::new(5.0, 0.0, -3.0));
        assert_eq!(p1.color, DEFAULT_COLOR);

        let p2 = &env.portals[1];
        assert_eq!(p2.target_spawn_point, "door");
        assert_eq!(p2.trigger_size, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(p2.transparency(), 1.0);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(parse_environment("{ not json").is_err());
        assert!(parse_environment(r#"{"bounds": "huge"}"#).is_err());
    }

    #[test]
    fn world_loads_environments_relative_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "worlds/demo.json",
            r#"{"id": "demo", "name": "Demo", "startEnvironment": "cave",
                "environments": ["forest.json", "cave.json", "missing.json"]}"#,
        );
        write(dir.path(), "worlds/forest.json", r#"{"id": "forest"}"#);
        write(dir.path(), "worlds/cave.json", r#"{"id": "cave", "type": "indoor"}"#);

        let source = AssetSource::new(dir.path());
        let world = load_world(&source, "worlds/demo.json", None).unwrap();
        assert_eq!(world.id, "demo");
        assert_eq!(world.environments().len(), 2);
        assert_eq!(world.current_environment_id(), Some("cave"));
    }

    #[test]
    fn unknown_start_environment_keeps_the_first_one() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "world.json",
            r#"{"startEnvironment": "nowhere", "environments": ["a.json"]}"#,
        );
        write(dir.path(), "a.json", r#"{"id": "a"}"#);

        let world = load_world(&AssetSource::new(dir.path()), "world.json", None).unwrap();
        assert_eq!(world.id, "unknown");
        assert_eq!(world.name, "Unnamed World");
        assert_eq!(world.current_environment_id(), Some("a"));
    }

    #[test]
    fn missing_world_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_world(&AssetSource::new(dir.path()), "world.json", None).is_err());
        write(dir.path(), "broken.json", "[1, 2");
        assert!(load_world(&AssetSource::new(dir.path()), "broken.json", None).is_err());
    }

    #[test]
    fn world_loading_fills_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "world.json", r#"{"environments": ["a.json"]}"#);
        write(
            dir.path(),
            "a.json",
            r#"{"id": "a", "objects": [{"id": "t", "modelPath": "models/t.obj"}, {"id": "u", "modelPath": "models/none.obj"}]}"#,
        );
        write(dir.path(), "models/t.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

        let recording = RecordingBackend::new();
        let backend: Arc<dyn GraphicsBackend> = recording.clone();
        let source = AssetSource::new(dir.path());
        let cache = AssetCache::new(backend, source.clone());

        load_world(&source, "world.json", Some(&cache)).unwrap();
        assert!(cache.has_model("models/t.obj"));
        assert!(!cache.has_model("models/none.obj"));
    }
}
