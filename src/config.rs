//! Tunables of the rotation demo.
//!
//! Every constant the scene depends on lives in [`SceneConfig`]. The defaults
//! reproduce the reference scene: a flat green board hovering at `(3, 1, 0)`,
//! a camera looking at it from `(0, 3, 8)` and a red marker at world origin.

use crate::rotation::Mode;

/// Converts a `0xRRGGBB` integer into `[r, g, b]` floats in `0..=1`.
pub fn rgb(hex: u32) -> [f32; 3] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [r, g, b]
}

/// Same as [`rgb`] but as a fully opaque [`wgpu::Color`].
pub fn clear_colour(hex: u32) -> wgpu::Color {
    let [r, g, b] = rgb(hex);
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub title: String,
    pub initial_mode: Mode,
    pub start_rotating: bool,
    /// Angle in radians applied to the active node every rotating frame.
    pub rotation_step: f32,

    pub object_offset: [f32; 3],
    pub object_size: [f32; 3],
    pub object_colour: [f32; 3],
    pub object_shininess: f32,

    pub camera_eye: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,

    pub world_axes_size: f32,
    pub local_axes_size: f32,
    pub origin_marker_radius: f32,
    pub origin_marker_colour: [f32; 3],

    pub ambient_colour: [f32; 3],
    pub directional_colour: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],

    pub clear_colour: wgpu::Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "PCB Rotation Modes".to_string(),
            initial_mode: Mode::Broken,
            start_rotating: false,
            rotation_step: 0.02,
            object_offset: [3.0, 1.0, 0.0],
            object_size: [2.0, 0.3, 1.0],
            object_colour: rgb(0x00ff00),
            object_shininess: 100.0,
            camera_eye: [0.0, 3.0, 8.0],
            fovy: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            world_axes_size: 2.0,
            local_axes_size: 1.5,
            origin_marker_radius: 0.1,
            origin_marker_colour: rgb(0xff0000),
            ambient_colour: rgb(0x404040),
            directional_colour: rgb(0xffffff),
            directional_intensity: 0.8,
            directional_position: [5.0, 5.0, 5.0],
            clear_colour: clear_colour(0x1f2937),
        }
    }
}

impl SceneConfig {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.initial_mode = mode;
        self
    }

    pub fn with_rotating(mut self, rotating: bool) -> Self {
        self.start_rotating = rotating;
        self
    }

    pub fn with_rotation_step(mut self, radians: f32) -> Self {
        self.rotation_step = radians;
        self
    }

    pub fn with_object_offset(mut self, offset: [f32; 3]) -> Self {
        self.object_offset = offset;
        self
    }

    pub fn with_camera_eye(mut self, eye: [f32; 3]) -> Self {
        self.camera_eye = eye;
        self
    }

    pub fn with_clear_colour(mut self, hex: u32) -> Self {
        self.clear_colour = clear_colour(hex);
        self
    }
}
