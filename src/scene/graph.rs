use glam::{Affine3A, Mat4};
use slotmap::SlotMap;

use crate::scene::mesh::MeshInstance;
use crate::scene::node::Node;
use crate::scene::skeleton::Skeleton;
use crate::scene::transform_system;
use crate::scene::{MeshKey, NodeHandle, SkeletonKey};

/// Owned scene graph built from one document.
///
/// Nodes, mesh instances and skeletons live in slotmap pools. Handles are
/// generational, so a handle to a removed node stops resolving instead of
/// aliasing a new one; that is what makes skeleton joints and animation
/// targets safe weak references.
#[derive(Debug, Default)]
pub struct SceneGraph {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub(crate) meshes: SlotMap<MeshKey, MeshInstance>,
    pub(crate) skeletons: SlotMap<SkeletonKey, Skeleton>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    pub fn create_node(&mut self, node: Node) -> NodeHandle {
        self.nodes.insert(node)
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Makes `child` the last child of `parent`, detaching it from any previous parent.
    ///
    /// Refuses (and returns false) when either handle is stale or when
    /// `parent` lies inside `child`'s subtree.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> bool {
        if child == parent || !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::error!("Refusing to attach {child:?} under its own descendant {parent:?}");
            return false;
        }

        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[child].transform.mark_dirty();
        true
    }

    /// Unlinks `child` from its parent; the node stays in the graph.
    pub fn detach(&mut self, child: NodeHandle) {
        let Some(parent) = self.nodes.get(child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent)
            && let Some(pos) = p.children.iter().position(|&c| c == child)
        {
            p.children.remove(pos);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
    }

    fn is_ancestor(&self, ancestor: NodeHandle, mut node: NodeHandle) -> bool {
        while let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    /// Removes `handle` and its whole subtree, with their mesh instances.
    ///
    /// Skeletons are left in place; joints that pointed into the subtree
    /// simply stop resolving.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach(handle);

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                if let Some(mesh) = node.mesh {
                    self.meshes.remove(mesh);
                }
                stack.extend(node.children);
            }
        }
    }

    /// Visits `root` and its descendants depth-first, parents before children.
    pub fn traverse(&self, root: NodeHandle, mut visit: impl FnMut(NodeHandle, &Node)) {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if let Some(node) = self.nodes.get(handle) {
                visit(handle, node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut found = None;
        self.traverse(root, |handle, node| {
            if found.is_none() && node.name.as_deref() == Some(name) {
                found = Some(handle);
            }
        });
        found
    }

    // ========================================================================
    // Meshes
    // ========================================================================

    /// Attaches `mesh` to its node, replacing any previous mesh instance.
    pub fn set_mesh(&mut self, mesh: MeshInstance) -> Option<MeshKey> {
        let node = mesh.node;
        if !self.nodes.contains_key(node) {
            return None;
        }
        let key = self.meshes.insert(mesh);
        if let Some(old) = self.nodes[node].mesh.replace(key) {
            self.meshes.remove(old);
        }
        Some(key)
    }

    #[must_use]
    pub fn get_mesh(&self, key: MeshKey) -> Option<&MeshInstance> {
        self.meshes.get(key)
    }

    pub fn get_mesh_mut(&mut self, key: MeshKey) -> Option<&mut MeshInstance> {
        self.meshes.get_mut(key)
    }

    /// Mesh instance attached to `node`, if both still exist.
    #[must_use]
    pub fn mesh_of(&self, node: NodeHandle) -> Option<&MeshInstance> {
        self.nodes.get(node)?.mesh.and_then(|key| self.meshes.get(key))
    }

    pub fn mesh_of_mut(&mut self, node: NodeHandle) -> Option<&mut MeshInstance> {
        let key = self.nodes.get(node)?.mesh?;
        self.meshes.get_mut(key)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshKey, &MeshInstance)> {
        self.meshes.iter()
    }

    // ========================================================================
    // Skeletons
    // ========================================================================

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    #[must_use]
    pub fn get_skeleton(&self, key: SkeletonKey) -> Option<&Skeleton> {
        self.skeletons.get(key)
    }

    pub fn skeletons(&self) -> impl Iterator<Item = (SkeletonKey, &Skeleton)> {
        self.skeletons.iter()
    }

    /// Binds a skeleton to a mesh instance. Both must exist.
    pub fn bind_skeleton(&mut self, mesh: MeshKey, skeleton: SkeletonKey) -> bool {
        if !self.skeletons.contains_key(skeleton) {
            return false;
        }
        match self.meshes.get_mut(mesh) {
            Some(instance) => {
                instance.skeleton = Some(skeleton);
                true
            }
            None => false,
        }
    }

    /// Joint matrices for a skinned mesh, relative to the mesh's node.
    #[must_use]
    pub fn joint_matrices(&self, mesh: MeshKey) -> Option<Vec<Mat4>> {
        let instance = self.meshes.get(mesh)?;
        let skeleton = self.skeletons.get(instance.skeleton?)?;
        let mesh_world_inv = self
            .nodes
            .get(instance.node)
            .map_or(Affine3A::IDENTITY, |n| n.transform.world_matrix.inverse());

        let mut out = Vec::with_capacity(skeleton.joints.len());
        skeleton.compute_joint_matrices(&self.nodes, mesh_world_inv, &mut out);
        Some(out)
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    pub fn update_world_matrices(&mut self, root: NodeHandle) {
        transform_system::update_hierarchy(&mut self.nodes, &[root]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_refuses_cycles() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(Node::new());
        let b = graph.create_node(Node::new());
        assert!(graph.attach(b, a));
        assert!(!graph.attach(a, b));
        assert_eq!(graph.get_node(a).and_then(Node::parent), None);
    }

    #[test]
    fn reattach_moves_child() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(Node::new());
        let b = graph.create_node(Node::new());
        let c = graph.create_node(Node::new());
        graph.attach(c, a);
        graph.attach(c, b);
        assert!(graph.get_node(a).is_some_and(|n| n.children().is_empty()));
        assert_eq!(graph.get_node(b).map(|n| n.children().to_vec()), Some(vec![c]));
    }
}
