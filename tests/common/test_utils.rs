use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use pcb_pivot::{camera::Projection, render::Renderer, scene::Scene};

/// Everything the manager asked the renderer to do, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Attach,
    Detach,
    Upload(usize),
    Release,
    Resize(u32, u32),
    Render,
    Status(String),
    Dispose,
}

/// A renderer without a GPU. The surface size is shared so tests can change
/// it after handing the renderer to a manager.
pub struct RecordingRenderer {
    surface: Rc<Cell<Option<(u32, u32)>>>,
    calls: Rc<RefCell<Vec<Call>>>,
    frame_requests: Rc<Cell<u32>>,
    attached: bool,
    live_models: usize,
    disposed: bool,
    render_error: Rc<RefCell<Option<wgpu::SurfaceError>>>,
    upload_fails: Rc<Cell<bool>>,
    last_aspect: Option<f32>,
}

/// Handles a test keeps after the renderer moved into the manager.
#[derive(Clone)]
pub struct Probe {
    pub surface: Rc<Cell<Option<(u32, u32)>>>,
    calls: Rc<RefCell<Vec<Call>>>,
    frame_requests: Rc<Cell<u32>>,
    render_error: Rc<RefCell<Option<wgpu::SurfaceError>>>,
    upload_fails: Rc<Cell<bool>>,
}

impl Probe {
    /// Makes the next `upload` call fail.
    pub fn fail_next_upload(&self) {
        self.upload_fails.set(true);
    }

    /// Makes the next `render` call fail with `error`.
    pub fn fail_next_render(&self, error: wgpu::SurfaceError) {
        *self.render_error.borrow_mut() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn uploads(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Upload(_)))
            .count()
    }

    pub fn renders(&self) -> usize {
        self.count(&Call::Render)
    }

    pub fn last_status(&self) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            Call::Status(status) => Some(status.clone()),
            _ => None,
        })
    }

    pub fn frame_requests(&self) -> u32 {
        self.frame_requests.get()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl RecordingRenderer {
    pub fn new(size: Option<(u32, u32)>) -> (Self, Probe) {
        let surface = Rc::new(Cell::new(size));
        let calls = Rc::new(RefCell::new(Vec::new()));
        let frame_requests = Rc::new(Cell::new(0));
        let render_error = Rc::new(RefCell::new(None));
        let upload_fails = Rc::new(Cell::new(false));
        let probe = Probe {
            surface: surface.clone(),
            calls: calls.clone(),
            frame_requests: frame_requests.clone(),
            render_error: render_error.clone(),
            upload_fails: upload_fails.clone(),
        };
        let renderer = Self {
            surface,
            calls,
            frame_requests,
            attached: false,
            live_models: 0,
            disposed: false,
            render_error,
            upload_fails,
            last_aspect: None,
        };
        (renderer, probe)
    }

    pub fn live_models(&self) -> usize {
        self.live_models
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn last_aspect(&self) -> Option<f32> {
        self.last_aspect
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Renderer for RecordingRenderer {
    fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface.get()
    }

    fn attach(&mut self) -> anyhow::Result<()> {
        self.attached = true;
        self.record(Call::Attach);
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
        self.record(Call::Detach);
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn upload(&mut self, scene: &Scene) -> anyhow::Result<()> {
        assert!(!self.disposed, "upload after dispose");
        if self.upload_fails.replace(false) {
            anyhow::bail!("out of device memory");
        }
        self.live_models = scene.graph.all_models().count();
        self.record(Call::Upload(self.live_models));
        Ok(())
    }

    fn release(&mut self) {
        self.live_models = 0;
        self.record(Call::Release);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.record(Call::Resize(width, height));
    }

    fn render(&mut self, _scene: &Scene, projection: &Projection) -> Result<(), wgpu::SurfaceError> {
        assert!(!self.disposed, "render after dispose");
        self.last_aspect = Some(projection.aspect());
        self.record(Call::Render);
        match self.render_error.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn request_frame(&self) {
        self.frame_requests.set(self.frame_requests.get() + 1);
    }

    fn show_status(&mut self, status: &str) {
        self.record(Call::Status(status.to_string()));
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.record(Call::Dispose);
    }
}
