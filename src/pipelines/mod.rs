//! Render pipelines.
//!
//! - `basic` draws the lit object
//! - `unlit` draws the origin marker and the axes helpers
//! - `light` holds the light uniform shared by all pipelines

pub mod basic;
pub mod light;
pub mod unlit;

/// Samples per pixel when the adapter can resolve them, matching a browser
/// canvas with antialiasing on.
pub const MSAA_SAMPLES: u32 = 4;

/// Picks [`MSAA_SAMPLES`] if both the colour and the depth format support it,
/// single sampling otherwise.
pub fn sample_count(
    colour: wgpu::TextureFormatFeatureFlags,
    depth: wgpu::TextureFormatFeatureFlags,
) -> u32 {
    let resolvable = colour.contains(wgpu::TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE);
    if resolvable
        && colour.sample_count_supported(MSAA_SAMPLES)
        && depth.sample_count_supported(MSAA_SAMPLES)
    {
        MSAA_SAMPLES
    } else {
        1
    }
}

#[derive(Debug)]
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub unlit: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
        material_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
        light_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let layout = basic::mk_pipeline_layout(
            device,
            material_bind_group_layout,
            camera_bind_group_layout,
            light_bind_group_layout,
        );
        Self {
            basic: basic::mk_basic_pipeline(device, config, sample_count, &layout),
            unlit: unlit::mk_unlit_pipeline(
                device,
                config,
                sample_count,
                &layout,
                wgpu::PrimitiveTopology::TriangleList,
            ),
            lines: unlit::mk_unlit_pipeline(
                device,
                config,
                sample_count,
                &layout,
                wgpu::PrimitiveTopology::LineList,
            ),
        }
    }
}
