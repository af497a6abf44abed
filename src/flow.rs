//! Simulation flow: the player, portal checks and the per-step update.
//!
//! # Key types
//!
//! - [`Player`] is the first-person viewpoint moved by [`MovementInput`]
//! - [`PortalNavigator`] fires portals and enforces the cooldown between them
//! - [`Session`] ties a [`World`] and a player together
//!
//! # Lifecycle
//!
//! Each call to [`Session::step`]:
//! 1. Moves the player from the input of this step
//! 2. Advances the objects of the current environment
//! 3. Ticks the portal cooldown and, once it has run out, checks the portals
//!    of the current environment
//! 4. On a transition, puts the player on the resolved spawn point

use cgmath::{InnerSpace, Vector3};
use instant::Duration;
use rand::Rng;

use crate::data_structures::world::World;

pub const DEFAULT_PORTAL_COOLDOWN: Duration = Duration::from_millis(2000);
const PITCH_LIMIT: f32 = 89.0;

/// Movement keys and mouse motion for one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub position: Vector3<f32>,
    /// Degrees. Zero looks down -Z, positive turns right.
    pub yaw: f32,
    /// Degrees, within ±89.
    pub pitch: f32,
    /// Units per second.
    pub move_speed: f32,
    /// Degrees per unit of mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 1.7, 0.0))
    }
}

impl Player {
    pub fn new(position: Vector3<f32>) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            move_speed: 5.0,
            mouse_sensitivity: 0.1,
        }
    }

    /// Turns by the mouse motion, then moves. Horizontal movement follows the
    /// yaw only, so looking up or down does not slow the player. Diagonal
    /// input is normalized.
    pub fn update(&mut self, dt: f32, input: &MovementInput) {
        self.yaw += input.mouse_dx * self.mouse_sensitivity;
        self.pitch = (self.pitch - input.mouse_dy * self.mouse_sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let (sin, cos) = self.yaw.to_radians().sin_cos();
        let forward = Vector3::new(sin, 0.0, -cos);
        let right = Vector3::new(cos, 0.0, sin);
        let up = Vector3::unit_y();

        let mut movement = Vector3::new(0.0, 0.0, 0.0);
        for (pressed, direction) in [
            (input.forward, forward),
            (input.backward, -forward),
            (input.right, right),
            (input.left, -right),
            (input.up, up),
            (input.down, -up),
        ] {
            if pressed {
                movement += direction;
            }
        }

        if movement.magnitude2() > 0.0 {
            self.position += movement.normalize() * self.move_speed * dt;
        }
    }

    /// Unit vector the player is looking along.
    pub fn look_direction(&self) -> Vector3<f32> {
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        Vector3::new(pitch_cos * yaw_sin, pitch_sin, -pitch_cos * yaw_cos)
    }
}

/// A portal that fired.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub portal_id: String,
    pub from_environment: String,
    pub to_environment: String,
    pub spawn_point: String,
    /// Where the player is placed in the new environment.
    pub position: Vector3<f32>,
}

/// Detects portal entry and keeps the player from bouncing straight back.
///
/// After a successful transition every further check is suppressed until the
/// cooldown has elapsed, even while the player stands inside a portal box.
#[derive(Clone, Debug)]
pub struct PortalNavigator {
    cooldown: Duration,
    remaining: Duration,
}

impl Default for PortalNavigator {
    fn default() -> Self {
        Self::new(DEFAULT_PORTAL_COOLDOWN)
    }
}

impl PortalNavigator {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            remaining: Duration::ZERO,
        }
    }

    pub fn is_cooling_down(&self) -> bool {
        !self.remaining.is_zero()
    }

    pub fn remaining_cooldown(&self) -> Duration {
        self.remaining
    }

    /// Ticks the cooldown by `dt`, then, if it has run out, fires the first
    /// portal of the current environment containing `player`.
    ///
    /// A portal whose target environment is unknown does nothing and does not
    /// start the cooldown.
    pub fn check(
        &mut self,
        world: &mut World,
        player: Vector3<f32>,
        dt: Duration,
    ) -> Option<Transition> {
        self.remaining = self.remaining.saturating_sub(dt);
        if self.is_cooling_down() {
            return None;
        }

        let environment = world.current_environment()?;
        let portal = environment.portal_at(player)?;
        let from_environment = environment.id.clone();
        let portal_id = portal.id.clone();
        let target = portal.target_environment_id.clone();
        let spawn_point = portal.target_spawn_point.clone();

        log::debug!("Player entered portal {} in {}", portal_id, from_environment);
        if !world.transition_to(&target, &spawn_point) {
            log::warn!("Portal {} targets unknown environment {:?}", portal_id, target);
            return None;
        }
        let position = world.resolve_spawn(&target, &spawn_point)?;

        self.remaining = self.cooldown;
        Some(Transition {
            portal_id,
            from_environment,
            to_environment: target,
            spawn_point,
            position,
        })
    }
}

/// A world being walked through by one player.
#[derive(Debug)]
pub struct Session {
    pub world: World,
    pub player: Player,
    pub navigator: PortalNavigator,
}

impl Session {
    /// Places the player on the default spawn point of the current environment.
    pub fn new(world: World) -> Self {
        Self::with_cooldown(world, DEFAULT_PORTAL_COOLDOWN)
    }

    pub fn with_cooldown(world: World, cooldown: Duration) -> Self {
        let player = match world.current_environment() {
            Some(environment) => Player::new(environment.spawn_point()),
            None => Player::default(),
        };
        Self {
            world,
            player,
            navigator: PortalNavigator::new(cooldown),
        }
    }

    /// Advances the session by `dt` seconds.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        input: &MovementInput,
        rng: &mut R,
    ) -> Option<Transition> {
        self.player.update(dt, input);
        self.world.update(dt, rng);

        // NaN and negative steps count as zero, overflowing ones as forever
        let elapsed = Duration::try_from_secs_f32(dt.max(0.0)).unwrap_or(Duration::MAX);
        let transition = self
            .navigator
            .check(&mut self.world, self.player.position, elapsed)?;
        self.player.position = transition.position;
        Some(transition)
    }
}
