//! The demo scene: a board, an optional pivot, helpers and lights.
//!
//! A [`Scene`] is built from scratch for one [`Mode`] and thrown away on the
//! next mode change. How the board hangs in the graph, and which node turns
//! every frame, is decided by its [`Attachment`].

use cgmath::{Rad, Vector3};
use log::debug;

use crate::{
    camera::Camera,
    config::SceneConfig,
    data_structures::{
        instance::Instance,
        model::MaterialUniform,
        scene_graph::{Light, ModelDesc, NodeId, NodeKind, SceneGraph, Shading},
    },
    resources::mesh,
    rotation::Mode,
};

/// How the board is connected to the scene root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attachment {
    /// `root -> object`. The object is placed at the offset and rotated in
    /// world space. The pivot exists but is not part of the scene.
    Direct,
    /// `root -> pivot -> object`. The pivot sits at the offset, the object at
    /// the pivot's origin, and the pivot is rotated in its own space.
    Pivoted,
}

impl From<Mode> for Attachment {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Broken => Attachment::Direct,
            Mode::Fixed => Attachment::Pivoted,
        }
    }
}

impl Attachment {
    pub fn mode(self) -> Mode {
        match self {
            Attachment::Direct => Mode::Broken,
            Attachment::Pivoted => Mode::Fixed,
        }
    }

    fn wire(self, graph: &mut SceneGraph, handles: &Handles, offset: Vector3<f32>) {
        let root = graph.root();
        match self {
            Attachment::Direct => {
                graph.set_local_transform(handles.object, Instance::from(offset));
                graph.add_child(root, handles.object);
            }
            Attachment::Pivoted => {
                graph.add_child(root, handles.pivot);
                graph.add_child(handles.pivot, handles.object);
                graph.set_local_transform(handles.object, Instance::new());
            }
        }
    }

    /// The node that receives the per-frame rotation.
    pub fn rotated_node(self, handles: &Handles) -> NodeId {
        match self {
            Attachment::Direct => handles.object,
            Attachment::Pivoted => handles.pivot,
        }
    }

    fn rotate(self, graph: &mut SceneGraph, handles: &Handles, angle: Rad<f32>) {
        let node = self.rotated_node(handles);
        match self {
            Attachment::Direct => {
                graph.set_local_transform_with(node, &mut |local| local.rotate_parent_y(angle))
            }
            Attachment::Pivoted => {
                graph.set_local_transform_with(node, &mut |local| local.rotate_local_y(angle))
            }
        }
    }
}

/// Handles of every node the demo creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handles {
    pub object: NodeId,
    pub pivot: NodeId,
    pub local_axes: NodeId,
    pub world_axes: NodeId,
    pub origin_marker: NodeId,
    pub ambient_light: NodeId,
    pub directional_light: NodeId,
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub graph: SceneGraph,
    pub handles: Handles,
    pub attachment: Attachment,
    pub camera: Camera,
    step: Rad<f32>,
}

impl Scene {
    pub fn build(config: &SceneConfig, mode: Mode) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let offset = Vector3::from(config.object_offset);

        let [width, height, depth] = config.object_size;
        let object = graph.add_node(
            "pcb",
            NodeKind::Model(ModelDesc {
                geometry: mesh::box_geometry(width, height, depth, config.object_colour),
                material: MaterialUniform {
                    colour: config.object_colour,
                    shininess: config.object_shininess,
                },
                shading: Shading::Lit,
            }),
            Instance::new(),
        );
        let pivot = graph.add_node("pivot", NodeKind::Container, Instance::from(offset));

        let local_axes = graph.add_node(
            "local axes",
            helper(mesh::axes_geometry(config.local_axes_size), Shading::Lines),
            Instance::new(),
        );
        graph.add_child(object, local_axes);

        let world_axes = graph.add_node(
            "world axes",
            helper(mesh::axes_geometry(config.world_axes_size), Shading::Lines),
            Instance::new(),
        );
        graph.add_child(root, world_axes);

        let origin_marker = graph.add_node(
            "origin",
            helper(
                mesh::sphere_geometry(
                    config.origin_marker_radius,
                    32,
                    16,
                    config.origin_marker_colour,
                ),
                Shading::Unlit,
            ),
            Instance::new(),
        );
        graph.add_child(root, origin_marker);

        let ambient_light = graph.add_node(
            "ambient light",
            NodeKind::Light(Light::Ambient {
                colour: config.ambient_colour,
            }),
            Instance::new(),
        );
        graph.add_child(root, ambient_light);

        let directional_light = graph.add_node(
            "directional light",
            NodeKind::Light(Light::Directional {
                colour: config.directional_colour,
                intensity: config.directional_intensity,
            }),
            Instance::from(Vector3::from(config.directional_position)),
        );
        graph.add_child(root, directional_light);

        let handles = Handles {
            object,
            pivot,
            local_axes,
            world_axes,
            origin_marker,
            ambient_light,
            directional_light,
        };
        let attachment = Attachment::from(mode);
        attachment.wire(&mut graph, &handles, offset);
        graph.update_world_transforms();

        let camera = Camera::new(config.camera_eye, config.object_offset);

        debug!("built {} scene with {} nodes", mode, graph.len());

        Self {
            graph,
            handles,
            attachment,
            camera,
            step: Rad(config.rotation_step),
        }
    }

    pub fn mode(&self) -> Mode {
        self.attachment.mode()
    }

    /// One animation step: rotate the active node if `rotating`, then bring
    /// every world transform up to date.
    pub fn advance(&mut self, rotating: bool) {
        if rotating {
            self.attachment
                .rotate(&mut self.graph, &self.handles, self.step);
        }
        self.graph.update_world_transforms();
    }

    pub fn rotated_node(&self) -> NodeId {
        self.attachment.rotated_node(&self.handles)
    }

    pub fn object_world(&self) -> Instance {
        self.world(self.handles.object)
    }

    pub fn pivot_world(&self) -> Instance {
        self.world(self.handles.pivot)
    }

    fn world(&self, id: NodeId) -> Instance {
        self.graph.get_world_transform(id).unwrap_or_default()
    }
}

fn helper(geometry: mesh::Geometry, shading: Shading) -> NodeKind {
    NodeKind::Model(ModelDesc {
        geometry,
        material: MaterialUniform {
            colour: [1.0, 1.0, 1.0],
            shininess: 1.0,
        },
        shading,
    })
}
