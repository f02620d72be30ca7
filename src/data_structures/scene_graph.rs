//! Scene graph and hierarchical scene organization.
//!
//! The graph is an arena: every node lives in one `Vec` owned by the
//! [`SceneGraph`] and is addressed through a [`NodeId`]. Parent/child links are
//! stored as ids, so callers can hold on to handles of deeply nested nodes
//! (the rotated object, its pivot) and mutate them every frame without
//! walking the tree. Dropping the graph drops every node at once.
//!
//! Only nodes reachable from the root are part of the rendered scene. Nodes
//! can be created detached and attached later; attaching a node that already
//! has a parent moves it, the way `Object3D::add` does in most scene graphs.

use log::warn;

use crate::{
    data_structures::{instance::Instance, model::MaterialUniform},
    resources::mesh::Geometry,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a model node is shaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shading {
    /// Phong lighting using the node's material.
    Lit,
    /// Vertex colours, no lighting. Triangles.
    Unlit,
    /// Vertex colours, no lighting. Line list.
    Lines,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelDesc {
    pub geometry: Geometry,
    pub material: MaterialUniform,
    pub shading: Shading,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Ambient {
        colour: [f32; 3],
    },
    /// Shines from the node's world position towards the world origin.
    Directional {
        colour: [f32; 3],
        intensity: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Pure transform node: the scene root or a pivot.
    Container,
    Model(ModelDesc),
    Light(Light),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Instance,
    world: Instance,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = Node {
            name: "scene".to_string(),
            kind: NodeKind::Container,
            parent: None,
            children: Vec::new(),
            local: Instance::default(),
            world: Instance::default(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a detached node. Use [`SceneGraph::add_child`] to hook it up.
    pub fn add_node(&mut self, name: &str, kind: NodeKind, local: Instance) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name: name.to_string(),
            kind,
            parent: None,
            children: Vec::new(),
            local,
            world: local,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Moves `child` under `parent`, detaching it from its previous parent.
    ///
    /// Unknown ids, the root and moves that would create a cycle are refused
    /// with a warning and leave the graph unchanged.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.get(parent).is_none() || self.get(child).is_none() {
            warn!(
                "You tried to attach node {} to node {}, but the graph only has {} nodes.",
                child.0,
                parent.0,
                self.nodes.len()
            );
            return false;
        }
        if child == self.root || self.ancestors(parent).any(|id| id == child) {
            warn!(
                "Attaching {} below {} would create a cycle.",
                self.nodes[child.0].name, self.nodes[parent.0].name
            );
            return false;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        true
    }

    /// Unhooks `id` from its parent. Detaching a detached node does nothing.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(Node::parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != id);
        self.nodes[id.0].parent = None;
    }

    pub fn get_children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.children.as_slice())
    }

    /// `id` itself followed by its parent, grandparent, ... up to a detached
    /// node or the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |&current| {
            self.nodes[current.0].parent
        })
    }

    /// Whether `id` is reachable from the root, i.e. part of the rendered scene.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).any(|ancestor| ancestor == self.root)
    }

    pub fn get_local_transform(&self, id: NodeId) -> Option<Instance> {
        self.get(id).map(|node| node.local)
    }

    /// The transform computed by the last [`SceneGraph::update_world_transforms`].
    pub fn get_world_transform(&self, id: NodeId) -> Option<Instance> {
        self.get(id).map(|node| node.world)
    }

    pub fn set_local_transform(&mut self, id: NodeId, instance: Instance) {
        self.set_local_transform_with(id, &mut |local| *local = instance);
    }

    pub fn set_local_transform_with(&mut self, id: NodeId, mutation: &mut dyn FnMut(&mut Instance)) {
        match self.nodes.get_mut(id.0) {
            Some(node) => mutation(&mut node.local),
            None => warn!(
                "You tried to transform node {}, but the graph only has {} nodes.",
                id.0,
                self.nodes.len()
            ),
        }
    }

    /// Recomputes `world = parent.world * local` for every attached node.
    ///
    /// Detached subtrees keep their previous world transforms; they are not
    /// part of the scene until attached again.
    pub fn update_world_transforms(&mut self) {
        let root = self.root;
        let root_local = self.nodes[root.0].local;
        self.nodes[root.0].world = root_local;
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let parent_world = self.nodes[parent.0].world;
            for i in 0..self.nodes[parent.0].children.len() {
                let child = self.nodes[parent.0].children[i];
                let node = &mut self.nodes[child.0];
                let local = node.local;
                node.world = parent_world * local;
                stack.push(child);
            }
        }
    }

    /// All attached nodes in depth-first order, starting with the root.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    pub fn models(&self) -> impl Iterator<Item = (NodeId, &ModelDesc)> + '_ {
        self.traverse().into_iter().filter_map(move |id| match &self.nodes[id.0].kind {
            NodeKind::Model(model) => Some((id, model)),
            _ => None,
        })
    }

    pub fn lights(&self) -> impl Iterator<Item = (NodeId, Light)> + '_ {
        self.traverse().into_iter().filter_map(move |id| match self.nodes[id.0].kind {
            NodeKind::Light(light) => Some((id, light)),
            _ => None,
        })
    }

    /// Every model node, attached or not. GPU resources are allocated for
    /// these so that re-attaching a node never needs an upload.
    pub fn all_models(&self) -> impl Iterator<Item = (NodeId, &ModelDesc)> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, node)| match &node.kind {
            NodeKind::Model(model) => Some((NodeId(i), model)),
            _ => None,
        })
    }
}
