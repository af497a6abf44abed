//! Objects placed inside an environment.
//!
//! Every object shares the same record (identity, placement, tint and model
//! reference); what differs between static props, wandering actors and
//! containers lives in [`ObjectKind`].

use std::f32::consts::TAU;

use cgmath::Vector3;
use rand::Rng;

use crate::data_structures::transform::Transform;

/// Seconds between two changes of an actor's heading.
pub const WANDER_INTERVAL: f32 = 2.0;
/// Horizontal speed of a wandering actor, in units per second.
pub const WANDER_SPEED: f32 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct StaticObject {
    pub subtype: String,
}

impl StaticObject {
    pub fn new(subtype: &str) -> Self {
        Self {
            subtype: subtype.to_string(),
        }
    }

    pub fn is_natural_feature(&self) -> bool {
        self.subtype == "natural_feature"
    }

    pub fn is_tool(&self) -> bool {
        self.subtype == "tool"
    }

    pub fn is_furniture(&self) -> bool {
        self.subtype == "furniture"
    }
}

/// An object that wanders around on the ground plane.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub subtype: String,
    pub velocity: Vector3<f32>,
    wander_timer: f32,
}

impl Actor {
    pub fn new(subtype: &str) -> Self {
        Self {
            subtype: subtype.to_string(),
            velocity: Vector3::new(0.0, 0.0, 0.0),
            wander_timer: 0.0,
        }
    }

    pub fn is_creature(&self) -> bool {
        self.subtype == "creature"
    }

    pub fn is_npc(&self) -> bool {
        self.subtype == "npc"
    }

    /// Advances the wander timer and moves `transform` by the current velocity.
    ///
    /// Once the timer reaches [`WANDER_INTERVAL`] it restarts and a new random
    /// heading on the XZ plane is picked. The height never changes.
    fn step<R: Rng + ?Sized>(&mut self, transform: &mut Transform, dt: f32, rng: &mut R) {
        self.wander_timer += dt;
        if self.wander_timer >= WANDER_INTERVAL {
            self.wander_timer = 0.0;
            let angle = rng.random_range(0.0..TAU);
            self.velocity.x = angle.cos() * WANDER_SPEED;
            self.velocity.z = angle.sin() * WANDER_SPEED;
        }
        transform.position.x += self.velocity.x * dt;
        transform.position.z += self.velocity.z * dt;
    }
}

/// Openable box holding an ordered list of item ids.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Container {
    open: bool,
    items: Vec<String>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn add_item(&mut self, item: &str) {
        self.items.push(item.to_string());
    }

    /// Removes the first occurrence of `item`. Returns whether one was found.
    pub fn remove_item(&mut self, item: &str) -> bool {
        match self.items.iter().position(|i| i == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectKind {
    Static(StaticObject),
    Actor(Actor),
    Container(Container),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameObject {
    pub id: String,
    pub name: String,
    pub transform: Transform,
    pub color: Vector3<f32>,
    /// Built-in primitive drawn when there is no usable custom model.
    pub model_type: String,
    pub model_path: Option<String>,
    pub texture_path: Option<String>,
    pub kind: ObjectKind,
}

impl GameObject {
    /// White object at the origin without a custom model.
    pub fn new(id: &str, name: &str, model_type: &str, kind: ObjectKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            transform: Transform::identity(),
            color: Vector3::new(1.0, 1.0, 1.0),
            model_type: model_type.to_string(),
            model_path: None,
            texture_path: None,
            kind,
        }
    }

    pub fn has_custom_model(&self) -> bool {
        self.custom_model_path().is_some()
    }

    /// The model path, if set and non-empty.
    pub fn custom_model_path(&self) -> Option<&str> {
        self.model_path.as_deref().filter(|path| !path.is_empty())
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        match &mut self.kind {
            ObjectKind::Actor(actor) => actor.step(&mut self.transform, dt, rng),
            ObjectKind::Static(_) | ObjectKind::Container(_) => (),
        }
    }

    pub fn as_actor(&self) -> Option<&Actor> {
        match &self.kind {
            ObjectKind::Actor(actor) => Some(actor),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match &self.kind {
            ObjectKind::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Container> {
        match &mut self.kind {
            ObjectKind::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn as_static(&self) -> Option<&StaticObject> {
        match &self.kind {
            ObjectKind::Static(object) => Some(object),
            _ => None,
        }
    }

    /// Subtype tag of static objects and actors; containers have none.
    pub fn subtype(&self) -> Option<&str> {
        match &self.kind {
            ObjectKind::Static(object) => Some(&object.subtype),
            ObjectKind::Actor(actor) => Some(&actor.subtype),
            ObjectKind::Container(_) => None,
        }
    }
}
