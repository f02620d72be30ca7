//! pcb-pivot
//!
//! An interactive 3D scene that shows the difference between rotating a board
//! about the world origin and rotating it about its own center. A toggle
//! switches between the two modes, another starts and stops the rotation.
//! Runs natively and in the browser (WebGL through wgpu).
//!
//! High-level modules
//! - `config`: every tunable of the scene in one struct
//! - `rotation`: the two modes and the user-facing state machine
//! - `scene`: builds the scene graph for a mode and advances it per frame
//! - `scene_manager`: mount, frame loop, resize and teardown
//! - `camera`: fixed camera, projection and their uniform
//! - `context`: the wgpu implementation of the renderer
//! - `data_structures`: scene graph, instances, meshes and depth texture
//! - `flow`: window, event loop and keyboard controls
//! - `pipelines`: lit and unlit render pipelines plus the light uniform
//! - `resources`: procedural geometry and its GPU upload
//! - `render`: the renderer seam and per-pipeline batching
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod rotation;
pub mod scene;
pub mod scene_manager;

pub use config::SceneConfig;
pub use flow::run;
pub use rotation::{Control, Mode, RotationState};
pub use scene::{Attachment, Scene};
pub use scene_manager::SceneManager;
