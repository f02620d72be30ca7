//! Window and event loop glue.
//!
//! [`App`] owns the winit window and a [`SceneManager`] driving a wgpu
//! [`Context`]. Keyboard input becomes [`Control`]s, `Resized` and
//! `RedrawRequested` feed the manager, and closing the window unmounts it.

use std::{fmt::Debug, sync::Arc};

use log::{error, info, warn};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    config::SceneConfig, context::Context, rotation::Control, scene_manager::SceneManager,
};

/// Maps a pressed key to a user toggle.
pub fn control_for_key(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::KeyR | KeyCode::Space => Some(Control::ToggleRotation),
        KeyCode::KeyM | KeyCode::Tab => Some(Control::ToggleMode),
        _ => None,
    }
}

pub(crate) enum FlowEvent {
    /// The context finished its async setup. Only sent on the web.
    #[allow(dead_code)]
    Initialized(anyhow::Result<Context>),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(Ok(_)) => f.write_str("Initialized(Ok(Context))"),
            Self::Initialized(Err(e)) => f.debug_tuple("Initialized").field(e).finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    window: Option<Arc<Window>>,
    manager: SceneManager<Context>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            window: None,
            manager: SceneManager::new(config),
        })
    }

    fn mount(&mut self, ctx: anyhow::Result<Context>, event_loop: &ActiveEventLoop) {
        let mounted = ctx.and_then(|ctx| self.manager.mount(ctx));
        if let Err(e) = mounted {
            error!("App initialization failed. Cannot create the main context: {e:#}");
            event_loop.exit();
        }
    }

    fn on_key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if let Some(control) = control_for_key(code) {
            if let Err(e) = self.manager.handle(control) {
                error!("Cannot apply {control:?}: {e:#}");
            }
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes =
            Window::default_attributes().with_title(self.manager.config().title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use winit::{dpi::LogicalSize, platform::web::WindowAttributesExtWebSys};

            // Keeps Tab and Space on the canvas instead of moving focus or scrolling
            window_attributes = window_attributes
                .with_focusable(true)
                .with_prevent_default(true);
            if let Some(window) = web_sys::window() {
                let width = window.inner_width().ok().and_then(|w| w.as_f64());
                let height = window.inner_height().ok().and_then(|h| h.as_f64());
                if let (Some(width), Some(height)) = (width, height) {
                    window_attributes =
                        window_attributes.with_inner_size(LogicalSize::new(width, height));
                }
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Cannot create a window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        let clear_colour = self.manager.config().clear_colour;
        let init_future = Context::new(window, clear_colour);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let ctx = self.async_runtime.block_on(init_future);
            self.mount(ctx, event_loop);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = init_future.await;
                if proxy.send_event(FlowEvent::Initialized(ctx)).is_err() {
                    warn!("The event loop closed before the context was ready.");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // This is the message from our wasm `spawn_local`
            FlowEvent::Initialized(ctx) => self.mount(ctx, event_loop),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.manager.unmount();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.manager.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                self.manager.frame();
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.manager.unmount().is_some() {
            info!("Unmounted on exit");
        }
    }
}

pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info)?;
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    event_loop.run_app(&mut app)?;
    if app.manager.is_mounted() {
        warn!("Event loop ended while still mounted");
        app.manager.unmount();
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run(SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
