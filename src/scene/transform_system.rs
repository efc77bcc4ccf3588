//! Transform System
//!
//! Propagates local matrices down the node hierarchy. Only borrows the node
//! pool, so it can run while other parts of the graph are borrowed.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle};

/// Updates world matrices below `roots`.
///
/// Uses an explicit stack so deep hierarchies cannot overflow. A node's world
/// matrix is recomputed when its local TRS changed or its parent's world
/// matrix changed in this pass.
pub fn update_hierarchy(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root in roots.iter().rev() {
        let parent_world = nodes
            .get(root)
            .and_then(|n| n.parent)
            .and_then(|p| nodes.get(p))
            .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);
        stack.push((root, parent_world, false));
    }

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_changed = local_changed || parent_changed;

        if world_changed {
            let world = parent_world * node.transform.local_matrix;
            node.transform.set_world_matrix(world);
        }

        let world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, world, world_changed));
        }
    }
}
