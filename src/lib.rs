//! world-ngin
//!
//! The content and navigation core of a first-person walkthrough engine. A
//! world is a set of environments (indoor or outdoor) holding objects and
//! portals; stepping into a portal moves the player to a spawn point in
//! another environment. Models come from Wavefront OBJ files and are shared
//! through a path-keyed cache; objects without a model fall back to built-in
//! primitive shapes.
//!
//! High-level modules
//! - `config`: JSON settings (asset root, start world, portal cooldown, log level)
//! - `context`: explicit context owning the backend and the asset cache, logger setup
//! - `data_structures`: engine data models (world graph, objects, portals, meshes)
//! - `flow`: player movement, portal checks and the simulation step
//! - `gpu`: wgpu implementation of the graphics boundary
//! - `resources`: OBJ parsing, image decoding, the asset cache and scene files
//! - `render`: graphics boundary and model/primitive draw resolution
//!

pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod gpu;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
