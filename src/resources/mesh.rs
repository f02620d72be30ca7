use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::model::{self, ModelVertex};

/// CPU side geometry, indexed. Lives in the scene graph until it's uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/**
 * An axis aligned box centred on the origin with one flat shaded quad per face.
 *
 * Every face gets its own four vertices so normals don't get averaged across edges.
 */
pub fn box_geometry(width: f32, height: f32, depth: f32, colour: [f32; 3]) -> Geometry {
    let half = Vector3::new(width, height, depth) * 0.5;
    // (normal, u, v) with u x v == normal so that the quads wind counter-clockwise
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let extent = |axis: Vector3<f32>| {
        axis.x.abs() * half.x + axis.y.abs() * half.y + axis.z.abs() * half.z
    };

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let (normal, u, v): (Vector3<f32>, Vector3<f32>, Vector3<f32>) =
            (normal.into(), u.into(), v.into());
        let centre = normal * extent(normal);
        let u = u * extent(u);
        let v = v * extent(v);
        let base = vertices.len() as u32;
        for corner in [centre - u - v, centre + u - v, centre + u + v, centre - u + v] {
            vertices.push(ModelVertex {
                position: corner.into(),
                normal: normal.into(),
                colour,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Geometry {
        name: "box".to_string(),
        vertices,
        indices,
    }
}

/**
 * UV sphere centred on the origin.
 *
 * The poles are rings of coincident vertices; the degenerate triangles at the
 * poles are skipped.
 */
pub fn sphere_geometry(
    radius: f32,
    width_segments: u32,
    height_segments: u32,
    colour: [f32; 3],
) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::new();
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * std::f32::consts::PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * std::f32::consts::TAU;
            let direction = Vector3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            vertices.push(ModelVertex {
                position: (direction * radius).into(),
                normal: direction.normalize().into(),
                colour,
            });
        }
    }

    let row = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry {
        name: "sphere".to_string(),
        vertices,
        indices,
    }
}

/// Three lines from the origin along +X (red), +Y (green) and +Z (blue).
pub fn axes_geometry(size: f32) -> Geometry {
    let axes = [
        ([size, 0.0, 0.0], [1.0, 0.0, 0.0]),
        ([0.0, size, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, size], [0.0, 0.0, 1.0]),
    ];
    let vertices = axes
        .into_iter()
        .flat_map(|(tip, colour)| {
            [
                ModelVertex {
                    position: [0.0; 3],
                    normal: [0.0; 3],
                    colour,
                },
                ModelVertex {
                    position: tip,
                    normal: [0.0; 3],
                    colour,
                },
            ]
        })
        .collect::<Vec<_>>();
    let indices = (0..vertices.len() as u32).collect();

    Geometry {
        name: "axes".to_string(),
        vertices,
        indices,
    }
}

pub fn upload_mesh(geometry: &Geometry, material: usize, device: &wgpu::Device) -> model::Mesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", geometry.name)),
        contents: bytemuck::cast_slice(&geometry.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Index Buffer", geometry.name)),
        contents: bytemuck::cast_slice(&geometry.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    model::Mesh {
        name: geometry.name.clone(),
        vertex_buffer,
        index_buffer,
        num_elements: geometry.indices.len() as u32,
        material,
    }
}
