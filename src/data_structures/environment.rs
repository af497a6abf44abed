//! A single room or outdoor area: its objects, its portals and where players
//! appear when they arrive.

use std::collections::HashMap;

use cgmath::Vector3;
use rand::Rng;

use crate::data_structures::{game_object::GameObject, portal::Portal};

pub const DEFAULT_SPAWN_POINT: &str = "default";
pub const DEFAULT_BOUNDS: Vector3<f32> = Vector3 { x: 100.0, y: 50.0, z: 100.0 };
pub const DEFAULT_SPAWN: Vector3<f32> = Vector3 { x: 0.0, y: 1.0, z: 0.0 };
pub const DEFAULT_GROUND_COLOR: Vector3<f32> = Vector3 { x: 0.3, y: 0.5, z: 0.2 };
pub const DEFAULT_SKY_COLOR: Vector3<f32> = Vector3 { x: 0.5, y: 0.7, z: 1.0 };

#[derive(Clone, Debug, PartialEq)]
pub struct Indoor {
    pub has_ceiling: bool,
    ambient_light: f32,
}

impl Indoor {
    pub fn ambient_light(&self) -> f32 {
        self.ambient_light
    }

    /// Clamped to `[0, 1]`.
    pub fn set_ambient_light(&mut self, level: f32) {
        self.ambient_light = level.clamp(0.0, 1.0);
    }
}

impl Default for Indoor {
    fn default() -> Self {
        Self {
            has_ceiling: true,
            ambient_light: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outdoor {
    pub render_sky: bool,
}

impl Default for Outdoor {
    fn default() -> Self {
        Self { render_sky: true }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnvironmentKind {
    Indoor(Indoor),
    Outdoor(Outdoor),
}

impl EnvironmentKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EnvironmentKind::Indoor(_) => "indoor",
            EnvironmentKind::Outdoor(_) => "outdoor",
        }
    }
}

/// Invariant: the `"default"` spawn point always exists and equals
/// [`spawn_point`](Self::spawn_point).
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    pub id: String,
    pub name: String,
    /// Width, height and depth of the walkable area.
    pub bounds: Vector3<f32>,
    spawn_point: Vector3<f32>,
    spawn_points: HashMap<String, Vector3<f32>>,
    /// Drawn and updated in insertion order.
    pub objects: Vec<GameObject>,
    /// Checked in insertion order; the first one containing the player fires.
    pub portals: Vec<Portal>,
    pub ground_color: Vector3<f32>,
    pub sky_color: Vector3<f32>,
    pub kind: EnvironmentKind,
}

impl Environment {
    pub fn new(id: &str, name: &str, kind: EnvironmentKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            bounds: DEFAULT_BOUNDS,
            spawn_point: DEFAULT_SPAWN,
            spawn_points: HashMap::from([(DEFAULT_SPAWN_POINT.to_string(), DEFAULT_SPAWN)]),
            objects: Vec::new(),
            portals: Vec::new(),
            ground_color: DEFAULT_GROUND_COLOR,
            sky_color: DEFAULT_SKY_COLOR,
            kind,
        }
    }

    pub fn indoor(id: &str, name: &str) -> Self {
        Self::new(id, name, EnvironmentKind::Indoor(Indoor::default()))
    }

    pub fn outdoor(id: &str, name: &str) -> Self {
        Self::new(id, name, EnvironmentKind::Outdoor(Outdoor::default()))
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// The default spawn point.
    pub fn spawn_point(&self) -> Vector3<f32> {
        self.spawn_point
    }

    /// Sets the default spawn point, keeping the `"default"` entry in sync.
    pub fn set_spawn_point(&mut self, position: Vector3<f32>) {
        self.spawn_point = position;
        self.spawn_points
            .insert(DEFAULT_SPAWN_POINT.to_string(), position);
    }

    /// Adds or replaces a named spawn point. Naming it `"default"` moves the
    /// default spawn point.
    pub fn add_spawn_point(&mut self, name: &str, position: Vector3<f32>) {
        if name == DEFAULT_SPAWN_POINT {
            self.set_spawn_point(position);
        } else {
            self.spawn_points.insert(name.to_string(), position);
        }
    }

    /// The named spawn point, or the default one when `name` is unknown.
    pub fn spawn_point_named(&self, name: &str) -> Vector3<f32> {
        self.spawn_points
            .get(name)
            .copied()
            .unwrap_or(self.spawn_point)
    }

    pub fn spawn_points(&self) -> &HashMap<String, Vector3<f32>> {
        &self.spawn_points
    }

    pub fn add_object(&mut self, object: GameObject) {
        self.objects.push(object);
    }

    /// Removes every object with `id`. Returns whether any was removed.
    pub fn remove_object(&mut self, id: &str) -> bool {
        let before = self.objects.len();
        self.objects.retain(|object| object.id != id);
        self.objects.len() != before
    }

    pub fn find_object(&self, id: &str) -> Option<&GameObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn find_object_mut(&mut self, id: &str) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    pub fn add_portal(&mut self, portal: Portal) {
        self.portals.push(portal);
    }

    /// First portal, in insertion order, whose trigger box contains `point`.
    pub fn portal_at(&self, point: Vector3<f32>) -> Option<&Portal> {
        self.portals
            .iter()
            .find(|portal| portal.is_player_in_trigger(point))
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        for object in &mut self.objects {
            object.update(dt, rng);
        }
    }
}
