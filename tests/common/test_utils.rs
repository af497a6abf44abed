use std::{
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use world_ngin::{
    data_structures::model::MeshVertex,
    render::{DrawParams, GraphicsBackend, MeshHandle, TextureHandle},
};

/// Backend that only counts what passes through it.
#[derive(Default)]
pub struct CountingBackend {
    next_id: AtomicU64,
    mesh_uploads: AtomicUsize,
    mesh_frees: AtomicUsize,
    texture_uploads: AtomicUsize,
    texture_frees: AtomicUsize,
    draws: AtomicUsize,
}

impl CountingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn mesh_uploads(&self) -> usize {
        self.mesh_uploads.load(Ordering::SeqCst)
    }

    pub fn live_meshes(&self) -> usize {
        self.mesh_uploads() - self.mesh_frees.load(Ordering::SeqCst)
    }

    pub fn texture_uploads(&self) -> usize {
        self.texture_uploads.load(Ordering::SeqCst)
    }

    pub fn live_textures(&self) -> usize {
        self.texture_uploads() - self.texture_frees.load(Ordering::SeqCst)
    }

    pub fn draws(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }
}

impl GraphicsBackend for CountingBackend {
    fn upload_mesh(&self, _: &[MeshVertex], _: &[u32], _: bool) -> MeshHandle {
        self.mesh_uploads.fetch_add(1, Ordering::SeqCst);
        MeshHandle(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn draw_mesh(&self, _: MeshHandle, _: &DrawParams) {
        self.draws.fetch_add(1, Ordering::SeqCst);
    }

    fn free_mesh(&self, _: MeshHandle) {
        self.mesh_frees.fetch_add(1, Ordering::SeqCst);
    }

    fn upload_texture(&self, _: u32, _: u32, _: &[u8]) -> TextureHandle {
        self.texture_uploads.fetch_add(1, Ordering::SeqCst);
        TextureHandle(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn free_texture(&self, _: TextureHandle) {
        self.texture_frees.fetch_add(1, Ordering::SeqCst);
    }
}

/// Writes `contents` to `root/relative`, creating parent directories.
pub fn write_fixture(root: &Path, relative: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub const QUAD_OBJ: &str = "\
o quad
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

/// Two environments connected both ways: the forest portal leads to the
/// cabin's "door" spawn point, the cabin portal back to the forest default.
pub fn write_demo_world(root: &Path) {
    write_fixture(root, "models/quad.obj", QUAD_OBJ);
    write_fixture(
        root,
        "worlds/demo_world.json",
        r#"{
            "id": "demo",
            "name": "Demo World",
            "startEnvironment": "forest",
            "environments": ["forest.json", "cabin.json", "missing.json"]
        }"#,
    );
    write_fixture(
        root,
        "worlds/forest.json",
        r#"{
            "id": "forest",
            "name": "Forest",
            "type": "outdoor",
            "bounds": {"width": 50, "height": 20, "depth": 50},
            "spawnPoint": {"x": 0, "y": 1, "z": 8},
            "objects": [
                {"id": "tree_1", "type": "static", "subtype": "tree", "model": "cylinder"},
                {"id": "sign", "type": "static", "subtype": "sign", "modelPath": "models/quad.obj"},
                {"id": "deer", "type": "actor", "subtype": "creature", "model": "sphere",
                 "transform": {"position": {"x": 10, "y": 0, "z": 10}}}
            ],
            "portals": [
                {"id": "to_cabin", "name": "Cabin Door", "targetEnvironmentId": "cabin",
                 "targetSpawnPoint": "door", "transform": {"position": {"x": 0, "y": 1, "z": 0}}}
            ]
        }"#,
    );
    write_fixture(
        root,
        "worlds/cabin.json",
        r#"{
            "id": "cabin",
            "name": "Cabin",
            "type": "indoor",
            "hasCeiling": true,
            "ambientLight": 0.4,
            "spawnPoints": {"door": {"x": 2, "y": 1, "z": 2}},
            "objects": [
                {"id": "chest", "type": "container", "items": ["key", "map"]}
            ],
            "portals": [
                {"id": "to_forest", "targetEnvironmentId": "forest",
                 "transform": {"position": {"x": 2, "y": 1, "z": 2}}}
            ]
        }"#,
    );
}
