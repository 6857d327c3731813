//! Arena-backed scene graph.
//!
//! Nodes are stored in a `Vec` and linked by [`NodeId`]. Ownership flows from the
//! graph to the nodes; parent links are plain indices used for traversal.
//!
//! Cache invalidation is pushed eagerly: a transform change marks the node's local
//! and world caches stale and the world cache of every descendant. Matrices are
//! recomputed lazily by [`SceneGraph::update_modelview`].

use std::collections::HashMap;

use super::node::{CacheState, Node, NodeId};
use crate::error::PipelineError;
use crate::math::{Mat4, Vec3};
use crate::model::Model;
use crate::transform::{TransformKind, TransformOp};

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    names: HashMap<String, NodeId>,
    render_order: Vec<NodeId>,
    interactive: Option<NodeId>,
    light: Option<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Construction ============

    /// Add a node below `parent` (or at the root) and append it to the render list.
    ///
    /// The first visible node created becomes the interactive node.
    pub fn create_node(
        &mut self,
        name: impl Into<String>,
        model: Option<Model>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, PipelineError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(PipelineError::DuplicateNode(name));
        }
        if let Some(parent) = parent {
            if parent.0 >= self.nodes.len() {
                return Err(PipelineError::UnknownNode(format!("#{}", parent.0)));
            }
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name.clone(), model, parent));
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.names.insert(name, id);
        self.render_order.push(id);
        if self.interactive.is_none() {
            self.interactive = Some(id);
        }
        Ok(id)
    }

    /// Add the node that marks the point light. It starts invisible.
    pub fn create_light_node(
        &mut self,
        name: impl Into<String>,
        model: Option<Model>,
        position: Vec3,
    ) -> Result<NodeId, PipelineError> {
        let id = self.create_node(name, model, None)?;
        let node = &mut self.nodes[id.0];
        node.light = true;
        node.visible = false;
        node.transform.set_translation(position);
        if self.interactive == Some(id) {
            self.interactive = None;
        }
        self.light = Some(id);
        Ok(id)
    }

    // ============ Lookup ============

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    /// Panics if `id` was not created by this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// # Panics
    /// Panics if `id` was not created by this graph.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Like [`SceneGraph::find`], logging and returning an error for unknown names.
    pub fn lookup(&self, name: &str) -> Result<NodeId, PipelineError> {
        self.find(name).ok_or_else(|| {
            log::error!("no node named '{name}'");
            PipelineError::UnknownNode(name.to_string())
        })
    }

    /// Nodes in the order they are rendered.
    pub fn render_order(&self) -> &[NodeId] {
        &self.render_order
    }

    /// Node that receives interactive transforms: the one set explicitly, or the
    /// first visible node.
    pub fn interactive_node(&self) -> Option<NodeId> {
        self.interactive
            .filter(|id| self.nodes[id.0].visible)
            .or_else(|| self.render_order.iter().copied().find(|id| self.nodes[id.0].visible))
    }

    pub fn set_interactive_node(&mut self, id: NodeId) {
        self.interactive = Some(id);
    }

    pub fn light_node(&self) -> Option<NodeId> {
        self.light
    }

    pub fn is_light_node(&self, id: NodeId) -> bool {
        self.light == Some(id)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.nodes[id.0].visible = visible;
    }

    pub fn set_animated(&mut self, id: NodeId, animated: bool) {
        self.nodes[id.0].animated = animated;
    }

    // ============ Traversal ============

    /// Apply `f` to `id` and then to all its descendants, depth first in child order.
    pub fn for_each_descendant(&mut self, id: NodeId, mut f: impl FnMut(&mut Node)) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &mut self.nodes[current.0];
            f(node);
            stack.extend(node.children.iter().rev());
        }
    }

    /// Toggle the polygon representation of every model.
    pub fn toggle_triangulation(&mut self) {
        for node in &mut self.nodes {
            if let Some(model) = &mut node.model {
                model.toggle_triangulation();
            }
        }
    }

    /// Merge duplicate vertices in every model. Returns the total merged.
    pub fn clean(&mut self) -> usize {
        self.nodes
            .iter_mut()
            .filter_map(|node| node.model.as_mut())
            .map(Model::clean)
            .sum()
    }

    // ============ Transforms ============

    /// Change one component of a node's local transform.
    ///
    /// Marks the node's local and world caches stale and the world cache of every
    /// descendant. Descendants keep their local caches.
    pub fn transform(&mut self, id: NodeId, kind: TransformKind, value: Vec3, op: TransformOp) {
        let node = &mut self.nodes[id.0];
        node.transform.apply(kind, value, op);
        node.local_state = CacheState::Stale;

        self.for_each_descendant(id, |node| node.world_state = CacheState::Stale);
    }

    pub fn translate(&mut self, id: NodeId, value: Vec3, op: TransformOp) {
        self.transform(id, TransformKind::Translate, value, op);
    }

    pub fn rotate(&mut self, id: NodeId, value: Vec3, op: TransformOp) {
        self.transform(id, TransformKind::Rotate, value, op);
    }

    pub fn scale(&mut self, id: NodeId, value: Vec3, op: TransformOp) {
        self.transform(id, TransformKind::Scale, value, op);
    }

    pub fn shear(&mut self, id: NodeId, value: Vec3, op: TransformOp) {
        self.transform(id, TransformKind::Shear, value, op);
    }

    /// Return the world modelview of `id`, recomputing stale caches on the way up
    /// to the root. Cheap when everything is fresh.
    pub fn update_modelview(&mut self, id: NodeId) -> Mat4 {
        self.nodes[id.0].refresh_local();

        if self.nodes[id.0].world_state == CacheState::Stale {
            let (world, rotation) = match self.nodes[id.0].parent {
                Some(parent) => {
                    let parent_world = self.update_modelview(parent);
                    let parent_rotation = self.nodes[parent.0].world_rotation;
                    let node = &self.nodes[id.0];
                    (
                        parent_world * node.local_modelview,
                        parent_rotation * node.local_rotation,
                    )
                }
                None => {
                    let node = &self.nodes[id.0];
                    (node.local_modelview, node.local_rotation)
                }
            };
            let node = &mut self.nodes[id.0];
            node.world_modelview = world;
            node.world_rotation = rotation;
            node.world_state = CacheState::Fresh;
        }

        self.nodes[id.0].world_modelview
    }
}
