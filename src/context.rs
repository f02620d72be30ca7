use std::sync::Arc;

use anyhow::Context as _;
use log::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    camera::{CameraResources, Projection},
    data_structures::{
        model::{self, DrawModel, Model},
        scene_graph::{NodeId, Shading},
        texture::Texture,
    },
    pipelines::{
        self, Pipelines,
        light::{LightResources, LightUniform},
    },
    render::{Batches, Instanced, Render, Renderer},
    resources,
    scene::Scene,
};

/// Id of the element the canvas is appended to on the web.
#[cfg(target_arch = "wasm32")]
pub const MOUNT_POINT_ID: &str = "rotation-canvas";

/// GPU buffers of one model node. Freed as a whole on every rebuild.
struct NodeResources {
    node: NodeId,
    shading: Shading,
    model: Model,
    instance_buffer: wgpu::Buffer,
}

impl<'a> From<&'a NodeResources> for Render<'a> {
    fn from(resources: &'a NodeResources) -> Self {
        let instanced = Instanced {
            instance: &resources.instance_buffer,
            model: &resources.model,
            amount: 1,
        };
        match resources.shading {
            Shading::Lit => Render::Lit(instanced),
            Shading::Unlit => Render::Unlit(instanced),
            Shading::Lines => Render::Lines(instanced),
        }
    }
}

pub struct Context {
    pub(crate) window: Arc<Window>,
    instance: wgpu::Instance,
    surface: Option<wgpu::Surface<'static>>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    depth_texture: Option<Texture>,
    msaa_target: Option<Texture>,
    camera: CameraResources,
    light: LightResources,
    material_layout: wgpu::BindGroupLayout,
    pipelines: Pipelines,
    clear_colour: wgpu::Color,
    resources: Vec<NodeResources>,
    is_surface_configured: bool,
    disposed: bool,
}

impl Context {
    pub async fn new(window: Arc<Window>, clear_colour: wgpu::Color) -> anyhow::Result<Self> {
        let size = window.inner_size();

        info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        #[cfg(target_arch = "wasm32")]
        web::append_canvas(&window)?;

        let surface = instance
            .create_surface(window.clone())
            .context("Cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No adapter can render to the window")?;
        debug!("Using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Shaders assume an sRGB surface, anything else comes out too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface supports no texture format")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        let sample_count = pipelines::sample_count(
            adapter.get_texture_format_features(surface_format).flags,
            adapter
                .get_texture_format_features(Texture::DEPTH_FORMAT)
                .flags,
        );
        debug!("Rendering with {sample_count} samples per pixel");

        let camera = CameraResources::new(&device);
        let light = LightResources::new(LightUniform::default(), &device);
        let material_layout = model::material_bind_group_layout(&device);
        let pipelines = Pipelines::new(
            &device,
            &config,
            sample_count,
            &material_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );

        let mut ctx = Self {
            window,
            instance,
            surface: Some(surface),
            device,
            queue,
            config,
            sample_count,
            depth_texture: None,
            msaa_target: None,
            camera,
            light,
            material_layout,
            pipelines,
            clear_colour,
            resources: Vec::new(),
            is_surface_configured: false,
            disposed: false,
        };
        ctx.configure_surface();
        Ok(ctx)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn configure_surface(&mut self) {
        if self.config.width == 0 || self.config.height == 0 {
            return;
        }
        let Some(surface) = &self.surface else {
            return;
        };
        surface.configure(&self.device, &self.config);
        if let Some(old) = self.depth_texture.take() {
            old.destroy();
        }
        self.depth_texture = Some(Texture::create_depth_texture(
            &self.device,
            [self.config.width, self.config.height],
            self.sample_count,
            "depth_texture",
        ));
        if let Some(old) = self.msaa_target.take() {
            old.destroy();
        }
        if self.sample_count > 1 {
            self.msaa_target = Some(Texture::create_multisampled_target(
                &self.device,
                &self.config,
                self.sample_count,
            ));
        }
        self.is_surface_configured = true;
    }

    fn write_instances(&self, scene: &Scene) {
        for resources in &self.resources {
            if let Some(world) = scene.graph.get_world_transform(resources.node) {
                self.queue.write_buffer(
                    &resources.instance_buffer,
                    0,
                    bytemuck::cast_slice(&[world.to_raw()]),
                );
            }
        }
    }

    fn batches<'a>(&'a self, scene: &Scene) -> Batches<'a> {
        let render = Render::Composed(
            self.resources
                .iter()
                .filter(|resources| scene.graph.is_attached(resources.node))
                .map(Render::from)
                .collect(),
        );
        let mut batches = Batches::default();
        render.set_pipelines(&mut batches);
        batches
    }
}

impl Renderer for Context {
    fn surface_size(&self) -> Option<(u32, u32)> {
        let size = self.window.inner_size();
        self.surface
            .as_ref()
            .map(|_| (size.width, size.height))
            .filter(|&(w, h)| w > 0 && h > 0)
    }

    fn attach(&mut self) -> anyhow::Result<()> {
        if self.surface.is_some() {
            return Ok(());
        }
        #[cfg(target_arch = "wasm32")]
        web::append_canvas(&self.window)?;
        let surface = self
            .instance
            .create_surface(self.window.clone())
            .context("Cannot recreate the surface")?;
        self.surface = Some(surface);
        self.configure_surface();
        Ok(())
    }

    fn detach(&mut self) {
        self.is_surface_configured = false;
        if self.surface.take().is_none() {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        web::remove_canvas(&self.window);
        debug!("Surface detached");
    }

    fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    fn upload(&mut self, scene: &Scene) -> anyhow::Result<()> {
        if !self.resources.is_empty() {
            warn!("Uploading over live resources, releasing them first.");
            self.release();
        }
        for (node, desc) in scene.graph.all_models() {
            let model = resources::load_model(desc, &self.device, &self.material_layout)?;
            let world = scene.graph.get_world_transform(node).unwrap_or_default();
            let instance_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Instance Buffer"),
                    contents: bytemuck::cast_slice(&[world.to_raw()]),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
            self.resources.push(NodeResources {
                node,
                shading: desc.shading,
                model,
                instance_buffer,
            });
        }
        debug!("Uploaded {} models", self.resources.len());
        Ok(())
    }

    fn release(&mut self) {
        let count = self.resources.len();
        for resources in self.resources.drain(..) {
            resources.model.destroy();
            resources.instance_buffer.destroy();
        }
        if count > 0 {
            debug!("Released {} models", count);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.configure_surface();
        }
    }

    fn render(&mut self, scene: &Scene, projection: &Projection) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if self.disposed || !self.is_surface_configured {
            return Ok(());
        }
        let Some(surface) = &self.surface else {
            warn!("Rendering while no surface is attached");
            return Ok(());
        };
        let Some(depth_texture) = &self.depth_texture else {
            return Ok(());
        };

        self.camera.write(&self.queue, &scene.camera, projection);
        let lights = scene.graph.lights().map(|(id, light)| {
            let position = scene.graph.get_world_transform(id).unwrap_or_default().position;
            (light, position)
        });
        self.light.write(&self.queue, LightUniform::from_lights(lights));
        self.write_instances(scene);

        let output = surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            // Draw into the multisampled buffer and resolve it onto the frame
            let (target, resolve_target, store) = match &self.msaa_target {
                Some(msaa) => (&msaa.view, Some(&view), wgpu::StoreOp::Discard),
                None => (&view, None, wgpu::StoreOp::Store),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let batches = self.batches(scene);
            for (pipeline, drawables) in [
                (&self.pipelines.basic, &batches.lit),
                (&self.pipelines.unlit, &batches.unlit),
                (&self.pipelines.lines, &batches.lines),
            ] {
                if drawables.is_empty() {
                    continue;
                }
                render_pass.set_pipeline(pipeline);
                for instanced in drawables {
                    render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                    render_pass.draw_model_instanced(
                        instanced.model,
                        0..instanced.amount as u32,
                        &self.camera.bind_group,
                        &self.light.bind_group,
                    );
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn request_frame(&self) {
        self.window.request_redraw();
    }

    fn show_status(&mut self, status: &str) {
        self.window.set_title(status);
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.release();
        if let Some(depth_texture) = self.depth_texture.take() {
            depth_texture.destroy();
        }
        if let Some(msaa_target) = self.msaa_target.take() {
            msaa_target.destroy();
        }
        self.camera.buffer.destroy();
        self.light.buffer.destroy();
        self.disposed = true;
        debug!("Renderer disposed");
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsValue;
    use winit::{platform::web::WindowExtWebSys, window::Window};

    fn mount_point(document: &web_sys::Document) -> Option<web_sys::Element> {
        document
            .get_element_by_id(super::MOUNT_POINT_ID)
            .or_else(|| document.body().map(Into::into))
    }

    pub fn append_canvas(window: &Window) -> anyhow::Result<()> {
        let canvas = window
            .canvas()
            .ok_or_else(|| anyhow::anyhow!("The window has no canvas"))?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| anyhow::anyhow!("No document to mount into"))?;
        let mount = mount_point(&document)
            .ok_or_else(|| anyhow::anyhow!("Neither #{} nor a body exists", super::MOUNT_POINT_ID))?;
        if canvas.parent_node().is_none() {
            mount
                .append_child(&canvas)
                .map_err(|e: JsValue| anyhow::anyhow!("Cannot append the canvas: {e:?}"))?;
        }
        Ok(())
    }

    pub fn remove_canvas(window: &Window) {
        let Some(canvas) = window.canvas() else {
            return;
        };
        // The page may have removed the mount point already.
        if let Some(parent) = canvas.parent_node() {
            if let Err(e) = parent.remove_child(&canvas) {
                log::warn!("Cannot remove the canvas: {e:?}");
            }
        }
    }
}
