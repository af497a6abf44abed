//! The environment graph and which node of it the player is currently in.

use std::collections::HashMap;

use cgmath::Vector3;
use rand::Rng;

use crate::data_structures::environment::Environment;

/// A set of environments keyed by id, plus the current one.
///
/// Invariant: `current_environment_id` is either `None` (no environments yet)
/// or the id of an environment in `environments`.
#[derive(Clone, Debug, Default)]
pub struct World {
    pub id: String,
    pub name: String,
    environments: HashMap<String, Environment>,
    current_environment_id: Option<String>,
}

impl World {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds (or replaces) an environment. The first one added becomes current.
    pub fn add_environment(&mut self, environment: Environment) {
        if self.current_environment_id.is_none() {
            self.current_environment_id = Some(environment.id.clone());
        }
        self.environments
            .insert(environment.id.clone(), environment);
    }

    pub fn environment(&self, id: &str) -> Option<&Environment> {
        self.environments.get(id)
    }

    pub fn environment_mut(&mut self, id: &str) -> Option<&mut Environment> {
        self.environments.get_mut(id)
    }

    pub fn environments(&self) -> &HashMap<String, Environment> {
        &self.environments
    }

    pub fn current_environment_id(&self) -> Option<&str> {
        self.current_environment_id.as_deref()
    }

    pub fn current_environment(&self) -> Option<&Environment> {
        self.current_environment_id
            .as_deref()
            .and_then(|id| self.environments.get(id))
    }

    pub fn current_environment_mut(&mut self) -> Option<&mut Environment> {
        match self.current_environment_id.as_deref() {
            Some(id) => self.environments.get_mut(id),
            None => None,
        }
    }

    /// Makes `id` current. Unknown ids are rejected and leave the state unchanged.
    pub fn set_current_environment_id(&mut self, id: &str) -> bool {
        if !self.environments.contains_key(id) {
            log::warn!("Unknown environment {}, staying in {:?}", id, self.current_environment_id);
            return false;
        }
        self.current_environment_id = Some(id.to_string());
        true
    }

    /// Switches to `environment_id`; a no-op returning `false` if it is unknown.
    ///
    /// The spawn point is only logged here. Where the player lands is answered
    /// by [`resolve_spawn`](Self::resolve_spawn).
    pub fn transition_to(&mut self, environment_id: &str, spawn_point: &str) -> bool {
        let accepted = self.set_current_environment_id(environment_id);
        if accepted {
            log::info!("Transitioned to environment {} at {}", environment_id, spawn_point);
        }
        accepted
    }

    /// Position of `spawn_point` in `environment_id`, falling back to that
    /// environment's default spawn point. `None` if the environment is unknown.
    pub fn resolve_spawn(&self, environment_id: &str, spawn_point: &str) -> Option<Vector3<f32>> {
        self.environments
            .get(environment_id)
            .map(|environment| environment.spawn_point_named(spawn_point))
    }

    /// Advances the current environment only; the others stay frozen.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if let Some(environment) = self.current_environment_mut() {
            environment.update(dt, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::data_structures::game_object::{Actor, GameObject, ObjectKind};

    fn two_rooms() -> World {
        let mut world = World::new("demo", "Demo");
        world.add_environment(Environment::outdoor("forest", "Forest"));
        let mut cave = Environment::indoor("cave", "Cave");
        cave.add_spawn_point("entrance", Vector3::new(3.0, 1.0, 3.0));
        world.add_environment(cave);
        world
    }

    #[test]
    fn first_environment_becomes_current() {
        let world = two_rooms();
        assert_eq!(world.current_environment_id(), Some("forest"));
        assert_eq!(world.current_environment().map(|e| e.name.as_str()), Some("Forest"));
    }

    #[test]
    fn empty_world_has_no_current_environment() {
        let world = World::new("empty", "Empty World");
        assert!(world.current_environment().is_none());
    }

    #[test]
    fn unknown_target_is_rejected() {
        let mut world = two_rooms();
        assert!(!world.transition_to("lava", "default"));
        assert!(!world.set_current_environment_id("lava"));
        assert_eq!(world.current_environment_id(), Some("forest"));
        assert!(world.transition_to("cave", "entrance"));
        assert_eq!(world.current_environment_id(), Some("cave"));
    }

    #[test]
    fn spawn_resolution_falls_back_to_default() {
        let world = two_rooms();
        assert_eq!(world.resolve_spawn("cave", "entrance"), Some(Vector3::new(3.0, 1.0, 3.0)));
        assert_eq!(world.resolve_spawn("cave", "chimney"), Some(Vector3::new(0.0, 1.0, 0.0)));
        assert_eq!(world.resolve_spawn("lava", "default"), None);
    }

    #[test]
    fn only_the_current_environment_is_updated() {
        let mut world = two_rooms();
        let deer_kind = ObjectKind::Actor(Actor::new("creature"));
        let mut deer = GameObject::new("deer", "Deer", "sphere", deer_kind);
        deer.transform.position = Vector3::new(0.0, 0.0, 0.0);
        world
            .environment_mut("cave")
            .unwrap()
            .add_object(deer.clone());
        world
            .environment_mut("forest")
            .unwrap()
            .add_object(deer);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..5 {
            world.update(1.0, &mut rng);
        }

        let moved = |env: &str| world.environment(env).unwrap().objects[0].transform.position;
        assert_ne!(moved("forest"), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(moved("cave"), Vector3::new(0.0, 0.0, 0.0));
    }
}
