//! Scene data: the node graph and what hangs off its nodes.
//!
//! - `scene_graph` is the arena of nodes with local and world transforms
//! - `instance` holds per-node transformation data and its GPU layout
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` wraps the depth buffer

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
