//! Render composition and the renderer seam.
//!
//! [`Renderer`] is everything the scene manager needs from a rendering
//! backend: a place to put its output, GPU resources for a scene, and a way
//! to draw a frame. [`crate::context::Context`] implements it with wgpu; the
//! tests implement it without a GPU.
//!
//! [`Render`] describes how a drawable should be drawn so that the backend
//! can batch drawables per pipeline before issuing draw calls.

use crate::{camera::Projection, data_structures::model::Model, scene::Scene};

/// A rendering backend driven by [`crate::scene_manager::SceneManager`].
///
/// The manager calls these in a fixed order: `attach` and `upload` on mount,
/// `release` and `upload` on every rebuild, `render` and `request_frame` once
/// per frame, and `release`, `dispose` and `detach` on unmount.
pub trait Renderer {
    /// Size of the drawable region, `None` while no surface is available.
    fn surface_size(&self) -> Option<(u32, u32)>;

    /// Appends the output element to the mount point. Attaching twice is a no-op.
    fn attach(&mut self) -> anyhow::Result<()>;

    /// Removes the output element from its mount point if it is still there.
    fn detach(&mut self);

    fn is_attached(&self) -> bool;

    /// Allocates geometry, material and instance buffers for every model in `scene`.
    fn upload(&mut self, scene: &Scene) -> anyhow::Result<()>;

    /// Frees everything `upload` allocated. Releasing twice is a no-op.
    fn release(&mut self);

    fn resize(&mut self, width: u32, height: u32);

    fn render(&mut self, scene: &Scene, projection: &Projection) -> Result<(), wgpu::SurfaceError>;

    /// Schedules the next frame callback.
    fn request_frame(&self);

    /// Shows the one line status readout to the user.
    fn show_status(&mut self, status: &str);

    /// Frees the renderer's own GPU objects. Only `detach` may follow.
    fn dispose(&mut self);
}

/// Data for instanced object rendering: a model and its instance buffer.
#[derive(Clone, Copy)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Specifies how a scene object should be rendered.
///
/// # Variants
///
/// - `Lit(Instanced)` renders with the Phong pipeline
/// - `Unlit(Instanced)` renders vertex coloured triangles
/// - `Lines(Instanced)` renders vertex coloured lines
/// - `Composed(Vec<Render>)` recursively renders composition of multiple renders
pub enum Render<'a> {
    Lit(Instanced<'a>),
    Unlit(Instanced<'a>),
    Lines(Instanced<'a>),
    Composed(Vec<Render<'a>>),
}

/// Drawables sorted by pipeline.
#[derive(Default)]
pub struct Batches<'a> {
    pub lit: Vec<Instanced<'a>>,
    pub unlit: Vec<Instanced<'a>>,
    pub lines: Vec<Instanced<'a>>,
}

impl<'a> Render<'a> {
    pub fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Lit(instanced) => batches.lit.push(instanced),
            Render::Unlit(instanced) => batches.unlit.push(instanced),
            Render::Lines(instanced) => batches.lines.push(instanced),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
        }
    }
}
