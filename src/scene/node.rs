use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{MeshKey, NodeHandle};

/// A scene node.
///
/// # Hierarchy
///
/// Nodes form a tree through parent-child handles stored in the owning
/// [`SceneGraph`](crate::scene::SceneGraph). A parent owns its children:
/// removing a node removes its whole subtree.
///
/// # Components
///
/// - `mesh`: optional mesh instance, stored in the graph's mesh pool
/// - `source_index`: index of the document node this was built from
///   (`None` for synthetic nodes such as the scene root)
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    pub(crate) mesh: Option<MeshKey>,
    pub(crate) source_index: Option<usize>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            mesh: None,
            source_index: None,
        }
    }

    #[must_use]
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<MeshKey> {
        self.mesh
    }

    /// Document node index this node was instantiated from.
    #[inline]
    #[must_use]
    pub fn source_index(&self) -> Option<usize> {
        self.source_index
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
