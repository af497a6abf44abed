//! Engine data structures: the world graph and the geometry it is drawn with.
//!
//! - `world` holds the environments and which one the player is in
//! - `environment` is one area with its objects, portals and spawn points
//! - `game_object` holds static objects, wandering actors and containers
//! - `portal` is a trigger box leading to another environment
//! - `transform` holds position, Euler rotation and scale
//! - `model` contains mesh data, uploaded meshes and models
//! - `texture` is an uploaded image
//! - `primitives` builds the shapes used when an object has no model

pub mod environment;
pub mod game_object;
pub mod model;
pub mod portal;
pub mod primitives;
pub mod texture;
pub mod transform;
pub mod world;
