//! Owns the scene for as long as the view is mounted.
//!
//! The manager turns user [`Control`]s into scene changes, drives the frame
//! loop and tears everything down on unmount. All rendering goes through a
//! [`Renderer`], so the whole lifecycle runs without a GPU in tests.

use cgmath::Deg;
use instant::{Duration, Instant};
use log::{debug, error, info, warn};

use crate::{
    camera::Projection,
    config::SceneConfig,
    render::Renderer,
    rotation::{Control, RotationState, Transition},
    scene::Scene,
};

const FPS_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Frame scheduling state. Once cancelled it never runs again.
#[derive(Debug)]
pub struct FrameLoop {
    cancelled: bool,
    frames: u64,
    frames_since_report: u32,
    last_report: Instant,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            cancelled: false,
            frames: 0,
            frames_since_report: 0,
            last_report: Instant::now(),
        }
    }

    /// Checked at the start of every tick. Returns `false` after [`FrameLoop::cancel`].
    pub fn begin_frame(&mut self) -> bool {
        if self.cancelled {
            return false;
        }
        self.frames += 1;
        self.frames_since_report += 1;
        let elapsed = self.last_report.elapsed();
        if elapsed >= FPS_REPORT_INTERVAL {
            debug!(
                "{:.1} fps",
                self.frames_since_report as f32 / elapsed.as_secs_f32()
            );
            self.frames_since_report = 0;
            self.last_report = Instant::now();
        }
        true
    }

    /// Returns whether this call did the cancelling.
    pub fn cancel(&mut self) -> bool {
        !std::mem::replace(&mut self.cancelled, true)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

struct Mounted<R: Renderer> {
    renderer: R,
    scene: Scene,
    projection: Projection,
    frame_loop: FrameLoop,
}

enum Lifecycle<R: Renderer> {
    Unmounted,
    /// A renderer was handed over but has no usable surface yet.
    Waiting(R),
    Mounted(Mounted<R>),
}

pub struct SceneManager<R: Renderer> {
    config: SceneConfig,
    state: RotationState,
    lifecycle: Lifecycle<R>,
}

impl<R: Renderer> SceneManager<R> {
    pub fn new(config: SceneConfig) -> Self {
        let state = RotationState::new(config.initial_mode, config.start_rotating);
        Self {
            config,
            state,
            lifecycle: Lifecycle::Unmounted,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Mounted(_))
    }

    pub fn scene(&self) -> Option<&Scene> {
        match &self.lifecycle {
            Lifecycle::Mounted(mounted) => Some(&mounted.scene),
            _ => None,
        }
    }

    pub fn projection(&self) -> Option<&Projection> {
        match &self.lifecycle {
            Lifecycle::Mounted(mounted) => Some(&mounted.projection),
            _ => None,
        }
    }

    pub fn frame_loop(&self) -> Option<&FrameLoop> {
        match &self.lifecycle {
            Lifecycle::Mounted(mounted) => Some(&mounted.frame_loop),
            _ => None,
        }
    }

    pub fn renderer(&self) -> Option<&R> {
        match &self.lifecycle {
            Lifecycle::Unmounted => None,
            Lifecycle::Waiting(renderer) => Some(renderer),
            Lifecycle::Mounted(mounted) => Some(&mounted.renderer),
        }
    }

    /// Hands a renderer to the manager and builds the scene for the current mode.
    ///
    /// Without a usable surface the renderer is parked and the mount completes
    /// on the first [`SceneManager::resize`] or [`SceneManager::frame`] that
    /// finds one. Mounting again tears the previous mount down first.
    pub fn mount(&mut self, renderer: R) -> anyhow::Result<()> {
        if !matches!(self.lifecycle, Lifecycle::Unmounted) {
            warn!("Mount requested while mounted, unmounting first.");
            self.unmount();
        }
        self.lifecycle = Lifecycle::Waiting(renderer);
        self.try_complete_mount()
    }

    fn try_complete_mount(&mut self) -> anyhow::Result<()> {
        let size = match &self.lifecycle {
            Lifecycle::Waiting(renderer) => renderer.surface_size(),
            _ => return Ok(()),
        };
        let Some((width, height)) = size.filter(|&(w, h)| w > 0 && h > 0) else {
            debug!("No surface yet, postponing mount.");
            return Ok(());
        };
        let Lifecycle::Waiting(mut renderer) =
            std::mem::replace(&mut self.lifecycle, Lifecycle::Unmounted)
        else {
            return Ok(());
        };

        let scene = match self.prepare(&mut renderer, width, height) {
            Ok(scene) => scene,
            Err(e) => {
                teardown(&mut renderer);
                return Err(e);
            }
        };
        renderer.show_status(&self.state.status());

        let projection = Projection::new(
            width,
            height,
            Deg(self.config.fovy),
            self.config.znear,
            self.config.zfar,
        );
        info!(
            "Mounted {} at {}x{}. [R]/[Space] toggles rotation, [M]/[Tab] toggles mode.",
            self.state, width, height
        );
        info!("Legend: green box = PCB component, red sphere = world origin, axes red = X, green = Y, blue = Z.");

        renderer.request_frame();
        self.lifecycle = Lifecycle::Mounted(Mounted {
            renderer,
            scene,
            projection,
            frame_loop: FrameLoop::new(),
        });
        Ok(())
    }

    fn prepare(&self, renderer: &mut R, width: u32, height: u32) -> anyhow::Result<Scene> {
        renderer.attach()?;
        renderer.resize(width, height);
        let scene = Scene::build(&self.config, self.state.mode);
        renderer.upload(&scene)?;
        Ok(scene)
    }

    /// Applies a user toggle. A mode change rebuilds the scene from scratch.
    ///
    /// A rebuild whose upload fails unmounts.
    pub fn handle(&mut self, control: Control) -> anyhow::Result<()> {
        let transition = self.state.apply(control);
        info!("{:?}: now {}", control, self.state);

        let Lifecycle::Mounted(mounted) = &mut self.lifecycle else {
            return Ok(());
        };
        if transition == Transition::Rebuild {
            mounted.renderer.release();
            mounted.scene = Scene::build(&self.config, self.state.mode);
            if let Err(e) = mounted.renderer.upload(&mounted.scene) {
                self.unmount();
                return Err(e.context("Cannot upload the rebuilt scene"));
            }
        }
        mounted.renderer.show_status(&self.state.status());
        Ok(())
    }

    /// One tick of the frame loop. Returns whether a frame was rendered.
    ///
    /// Does nothing before mount and after unmount.
    pub fn frame(&mut self) -> bool {
        if matches!(self.lifecycle, Lifecycle::Waiting(_)) {
            if let Err(e) = self.try_complete_mount() {
                error!("Mount failed: {e:#}");
            }
        }
        let Lifecycle::Mounted(mounted) = &mut self.lifecycle else {
            return false;
        };
        if !mounted.frame_loop.begin_frame() {
            return false;
        }

        mounted.scene.advance(self.state.rotating);
        match mounted.renderer.render(&mounted.scene, &mounted.projection) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some((width, height)) = mounted.renderer.surface_size() {
                    mounted.renderer.resize(width, height);
                }
            }
            Err(e) => error!("Unable to render {e}"),
        }
        mounted.renderer.request_frame();
        true
    }

    /// Follows a change of the drawable size. Zero sized updates are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            warn!("Ignoring resize to {width}x{height}");
            return;
        }
        if matches!(self.lifecycle, Lifecycle::Waiting(_)) {
            if let Err(e) = self.try_complete_mount() {
                error!("Mount failed: {e:#}");
            }
            return;
        }
        let Lifecycle::Mounted(mounted) = &mut self.lifecycle else {
            return;
        };
        mounted.projection.resize(width, height);
        mounted.renderer.resize(width, height);
    }

    /// Stops the frame loop and frees everything the mount allocated.
    ///
    /// Returns the disposed renderer. Unmounting twice is a no-op.
    pub fn unmount(&mut self) -> Option<R> {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Unmounted) {
            Lifecycle::Unmounted => None,
            Lifecycle::Waiting(mut renderer) => {
                renderer.dispose();
                renderer.detach();
                Some(renderer)
            }
            Lifecycle::Mounted(Mounted {
                mut renderer,
                mut frame_loop,
                ..
            }) => {
                frame_loop.cancel();
                teardown(&mut renderer);
                info!("Unmounted after {} frames", frame_loop.frames());
                Some(renderer)
            }
        }
    }
}

/// Frees everything a renderer holds. Each step is a no-op on a renderer that
/// never got that far.
fn teardown<R: Renderer>(renderer: &mut R) {
    renderer.release();
    renderer.dispose();
    renderer.detach();
}
