use cgmath::{InnerSpace, Vector3, Zero};
use wgpu::util::DeviceExt;

use crate::data_structures::scene_graph::Light;

pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl std::fmt::Debug for LightResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightResources")
            .field("uniform", &self.uniform)
            .finish_non_exhaustive()
    }
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, uniform: LightUniform) {
        self.uniform = uniform;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

/// The light set of a scene, flattened for the shader: one ambient term and
/// one directional light.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    /// Unit vector pointing from the surface towards the light.
    pub direction: [f32; 3],
    _padding2: u32,
    /// Colour already multiplied by the intensity.
    pub colour: [f32; 3],
    _padding3: u32,
}

impl Default for LightUniform {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl LightUniform {
    /// Folds scene lights into a uniform.
    ///
    /// Ambient lights add up. Only the first directional light is kept; the
    /// shader has a single slot for it.
    pub fn from_lights<I>(lights: I) -> Self
    where
        I: IntoIterator<Item = (Light, Vector3<f32>)>,
    {
        let mut uniform = Self::default();
        let mut has_directional = false;
        for (light, position) in lights {
            match light {
                Light::Ambient { colour } => {
                    uniform.ambient = (Vector3::from(uniform.ambient) + Vector3::from(colour)).into();
                }
                Light::Directional { colour, intensity } if !has_directional => {
                    if position.is_zero() {
                        log::warn!("directional light sits at the origin and has no direction");
                        continue;
                    }
                    uniform.direction = position.normalize().into();
                    uniform.colour = (Vector3::from(colour) * intensity).into();
                    has_directional = true;
                }
                Light::Directional { .. } => {
                    log::debug!("ignoring additional directional light");
                }
            }
        }
        uniform
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
