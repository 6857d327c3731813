//! Scene-graph node.
//!
//! Nodes live in the [`SceneGraph`](super::SceneGraph) arena and refer to each
//! other through [`NodeId`] indices. Each node caches its local and world
//! modelview matrices behind two independent [`CacheState`] flags.

use crate::math::Mat4;
use crate::model::Model;
use crate::transform::Transform;

/// Index of a node in its scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// State of a cached matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Stale,
    Fresh,
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    pub(crate) model: Option<Model>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) visible: bool,
    pub(crate) animated: bool,
    pub(crate) light: bool,
    pub(crate) transform: Transform,

    pub(crate) local_modelview: Mat4,
    pub(crate) local_rotation: Mat4,
    pub(crate) world_modelview: Mat4,
    pub(crate) world_rotation: Mat4,
    pub(crate) local_state: CacheState,
    pub(crate) world_state: CacheState,
}

impl Node {
    pub(crate) fn new(name: String, model: Option<Model>, parent: Option<NodeId>) -> Self {
        Self {
            name,
            model,
            parent,
            children: Vec::new(),
            visible: true,
            animated: false,
            light: false,
            transform: Transform::default(),
            local_modelview: Mat4::identity(),
            local_rotation: Mat4::identity(),
            world_modelview: Mat4::identity(),
            world_rotation: Mat4::identity(),
            local_state: CacheState::Stale,
            world_state: CacheState::Stale,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` for group-only nodes.
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Whether this node marks the point light.
    pub fn is_light(&self) -> bool {
        self.light
    }

    /// Group nodes count as ready; model nodes defer to their model.
    pub fn is_ready(&self) -> bool {
        self.model.as_ref().map_or(true, Model::is_ready)
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn local_state(&self) -> CacheState {
        self.local_state
    }

    pub fn world_state(&self) -> CacheState {
        self.world_state
    }

    /// Last computed local modelview; only meaningful while fresh.
    pub fn local_modelview(&self) -> Mat4 {
        self.local_modelview
    }

    /// Last computed world modelview; only meaningful while fresh.
    pub fn world_modelview(&self) -> Mat4 {
        self.world_modelview
    }

    pub fn local_rotation(&self) -> Mat4 {
        self.local_rotation
    }

    pub fn world_rotation(&self) -> Mat4 {
        self.world_rotation
    }

    /// Recompute the local matrices if stale. A recompute makes the world stale.
    pub(crate) fn refresh_local(&mut self) {
        if self.local_state == CacheState::Fresh {
            return;
        }
        self.local_rotation = self.transform.rotation_matrix();
        self.local_modelview = self.transform.to_matrix(&self.local_rotation);
        self.local_state = CacheState::Fresh;
        self.world_state = CacheState::Stale;
    }
}
