//! Trigger volumes that move the player to another environment.
//!
//! A portal only names its target by environment id and spawn point name; the
//! world resolves both when the portal fires, so targets may be loaded later or
//! not at all.

use cgmath::Vector3;

use crate::data_structures::transform::Transform;

pub const DEFAULT_TRIGGER_SIZE: Vector3<f32> = Vector3 { x: 2.0, y: 3.0, z: 2.0 };
pub const DEFAULT_COLOR: Vector3<f32> = Vector3 { x: 0.3, y: 0.6, z: 1.0 };
pub const DEFAULT_TRANSPARENCY: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct Portal {
    pub id: String,
    pub name: String,
    /// Only the position is used for the trigger test.
    pub transform: Transform,
    /// Width, height and depth of the trigger box.
    pub trigger_size: Vector3<f32>,
    pub target_environment_id: String,
    pub target_spawn_point: String,
    pub color: Vector3<f32>,
    transparency: f32,
}

impl Portal {
    pub fn new(
        id: &str,
        name: &str,
        target_environment_id: &str,
        target_spawn_point: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            transform: Transform::identity(),
            trigger_size: DEFAULT_TRIGGER_SIZE,
            target_environment_id: target_environment_id.to_string(),
            target_spawn_point: target_spawn_point.to_string(),
            color: DEFAULT_COLOR,
            transparency: DEFAULT_TRANSPARENCY,
        }
    }

    pub fn at(mut self, position: Vector3<f32>) -> Self {
        self.transform.position = position;
        self
    }

    pub fn transparency(&self) -> f32 {
        self.transparency
    }

    /// Clamped to `[0, 1]`.
    pub fn set_transparency(&mut self, transparency: f32) {
        self.transparency = transparency.clamp(0.0, 1.0);
    }

    /// Closed box test: points exactly on a face count as inside.
    pub fn is_player_in_trigger(&self, player: Vector3<f32>) -> bool {
        let center = self.transform.position;
        let half = self.trigger_size / 2.0;
        let (min, max) = (center - half, center + half);
        player.x >= min.x
            && player.x <= max.x
            && player.y >= min.y
            && player.y <= max.y
            && player.z >= min.z
            && player.z <= max.z
    }
}
