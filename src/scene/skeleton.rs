use glam::{Affine3A, Mat4};
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle};

/// Runtime skeleton resolved from a document skin.
///
/// `joints[i]` is joint `i` of the per-vertex joint attributes. Joints are
/// weak: the skeleton does not own the nodes, and a joint whose node has been
/// removed from the graph contributes an identity matrix.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,
    pub(crate) source_skin: usize,

    pub(crate) joints: Vec<NodeHandle>,
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,
    pub(crate) root_joint_index: usize,
}

impl Skeleton {
    #[must_use]
    pub fn new(
        name: &str,
        source_skin: usize,
        joints: Vec<NodeHandle>,
        inverse_bind_matrices: Vec<Affine3A>,
        root_joint_index: usize,
    ) -> Self {
        debug_assert_eq!(joints.len(), inverse_bind_matrices.len());
        Self {
            name: name.to_string(),
            source_skin,
            joints,
            inverse_bind_matrices,
            root_joint_index,
        }
    }

    #[inline]
    #[must_use]
    pub fn joints(&self) -> &[NodeHandle] {
        &self.joints
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrices(&self) -> &[Affine3A] {
        &self.inverse_bind_matrices
    }

    #[inline]
    #[must_use]
    pub fn source_skin(&self) -> usize {
        self.source_skin
    }

    #[inline]
    #[must_use]
    pub fn root_joint(&self) -> Option<NodeHandle> {
        self.joints.get(self.root_joint_index).copied()
    }

    /// Computes `mesh_world_inv * joint_world * inverse_bind` for every joint.
    ///
    /// Reads world matrices, so run the transform update first.
    pub fn compute_joint_matrices(
        &self,
        nodes: &SlotMap<NodeHandle, Node>,
        mesh_world_inv: Affine3A,
        out: &mut Vec<Mat4>,
    ) {
        out.clear();
        out.extend(self.joints.iter().zip(&self.inverse_bind_matrices).map(
            |(&joint, ibm)| match nodes.get(joint) {
                Some(node) => Mat4::from(mesh_world_inv * node.transform.world_matrix * *ibm),
                None => Mat4::IDENTITY,
            },
        ));
    }
}
