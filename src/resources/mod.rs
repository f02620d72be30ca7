/**
 * Builds GPU resources for the scene. There are no external assets: every mesh
 * is generated procedurally from a handful of dimensions.
 */
pub mod mesh;

use crate::data_structures::{
    model::{self, Material},
    scene_graph::ModelDesc,
};

pub fn load_model(
    desc: &ModelDesc,
    device: &wgpu::Device,
    material_layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<model::Model> {
    if desc.geometry.indices.is_empty() {
        anyhow::bail!("geometry {} has no indices", desc.geometry.name);
    }
    let material = Material::new(
        device,
        &format!("{} material", desc.geometry.name),
        desc.material,
        material_layout,
    );
    let mesh = mesh::upload_mesh(&desc.geometry, 0, device);
    Ok(model::Model {
        meshes: vec![mesh],
        materials: vec![material],
    })
}
