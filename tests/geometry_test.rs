use approx::assert_relative_eq;
use cgmath::{InnerSpace, Vector3};
use pcb_pivot::resources::mesh::{axes_geometry, box_geometry, sphere_geometry};

fn triangle_normal(positions: [[f32; 3]; 3]) -> Vector3<f32> {
    let [a, b, c] = positions.map(Vector3::from);
    (b - a).cross(c - a)
}

#[test]
fn box_has_flat_faces_wound_counter_clockwise() {
    let geometry = box_geometry(2.0, 0.3, 1.0, [0.0, 1.0, 0.0]);
    assert_eq!(geometry.vertices.len(), 24);
    assert_eq!(geometry.indices.len(), 36);

    for triangle in geometry.indices.chunks(3) {
        let vertices = [0, 1, 2].map(|i| geometry.vertices[triangle[i] as usize]);
        let face = Vector3::from(vertices[0].normal);
        assert!(vertices.iter().all(|v| v.normal == vertices[0].normal));
        let winding = triangle_normal(vertices.map(|v| v.position));
        assert!(winding.dot(face) > 0.0, "triangle {triangle:?} faces inwards");
    }
}

#[test]
fn box_spans_its_dimensions() {
    let geometry = box_geometry(2.0, 0.3, 1.0, [0.0, 1.0, 0.0]);
    let max = geometry.vertices.iter().fold([f32::MIN; 3], |acc, v| {
        [
            acc[0].max(v.position[0]),
            acc[1].max(v.position[1]),
            acc[2].max(v.position[2]),
        ]
    });
    assert_relative_eq!(max[0], 1.0);
    assert_relative_eq!(max[1], 0.15);
    assert_relative_eq!(max[2], 0.5);
    assert!(geometry.vertices.iter().all(|v| v.colour == [0.0, 1.0, 0.0]));
}

#[test]
fn sphere_vertices_lie_on_the_radius() {
    let geometry = sphere_geometry(0.1, 32, 16, [1.0, 0.0, 0.0]);
    assert_eq!(geometry.vertices.len(), 33 * 17);
    // every band contributes two triangles per segment, the pole bands one
    assert_eq!(geometry.indices.len(), 6 * 32 * 15);

    for vertex in &geometry.vertices {
        assert_relative_eq!(Vector3::from(vertex.position).magnitude(), 0.1, epsilon = 1e-5);
        assert_relative_eq!(Vector3::from(vertex.normal).magnitude(), 1.0, epsilon = 1e-5);
    }
    let count = geometry.vertices.len() as u32;
    assert!(geometry.indices.iter().all(|&i| i < count));
}

#[test]
fn sphere_clamps_degenerate_segment_counts() {
    let geometry = sphere_geometry(1.0, 0, 0, [1.0, 1.0, 1.0]);
    assert_eq!(geometry.vertices.len(), 4 * 3);
    assert!(!geometry.indices.is_empty());
}

#[test]
fn axes_are_three_coloured_lines() {
    let geometry = axes_geometry(1.5);
    assert_eq!(geometry.vertices.len(), 6);
    assert_eq!(geometry.indices, vec![0, 1, 2, 3, 4, 5]);

    let tips: Vec<_> = geometry.vertices.iter().skip(1).step_by(2).collect();
    assert_eq!(tips[0].position, [1.5, 0.0, 0.0]);
    assert_eq!(tips[0].colour, [1.0, 0.0, 0.0]);
    assert_eq!(tips[1].position, [0.0, 1.5, 0.0]);
    assert_eq!(tips[1].colour, [0.0, 1.0, 0.0]);
    assert_eq!(tips[2].position, [0.0, 0.0, 1.5]);
    assert_eq!(tips[2].colour, [0.0, 0.0, 1.0]);
    assert!(
        geometry
            .vertices
            .iter()
            .step_by(2)
            .all(|v| v.position == [0.0; 3])
    );
}
