use glam::Affine3A;
use rustc_hash::FxHashSet;

use crate::document::{AccessorData, Document, SkinDesc};
use crate::errors::PartialBindError;
use crate::loader::{BuiltScene, LoadReport, NodeMap};
use crate::scene::{MeshInstance, Node, Skeleton};

/// Binds every skin of `document` into `built`.
///
/// A skin binds completely or not at all. Its meshes stay rigid when it
/// fails, and the failure goes into `report`. Returns the number of skins bound.
pub fn bind_skins(document: &Document, built: &mut BuiltScene, report: &mut LoadReport) -> usize {
    let mut bound = 0;

    for (skin_index, skin) in document.skins.iter().enumerate() {
        let skeleton = match build_skeleton(document, skin_index, skin, &built.node_map) {
            Ok(skeleton) => skeleton,
            Err(err) => {
                report.push(err);
                continue;
            }
        };

        let key = built.graph.add_skeleton(skeleton);
        bound += 1;

        for (node_index, node_desc) in document.nodes.iter().enumerate() {
            if node_desc.skin != Some(skin_index) {
                continue;
            }
            let Some(handle) = built.node_map.get(node_index) else {
                continue;
            };
            let Some(mesh_key) = built.graph.get_node(handle).and_then(Node::mesh) else {
                continue;
            };

            if built
                .graph
                .get_mesh(mesh_key)
                .is_some_and(MeshInstance::is_skinned)
            {
                built.graph.bind_skeleton(mesh_key, key);
            } else {
                log::warn!(
                    "Node {node_index} references skin {skin_index} but its mesh has no joint attributes"
                );
            }
        }
    }

    bound
}

fn build_skeleton(
    document: &Document,
    skin_index: usize,
    skin: &SkinDesc,
    node_map: &NodeMap,
) -> Result<Skeleton, PartialBindError> {
    let joint_count = skin.joints.len();

    // Declared order is the vertex joint-index space; keep it.
    let mut joints = Vec::with_capacity(joint_count);
    let mut seen = FxHashSet::default();
    for (joint, &node) in skin.joints.iter().enumerate() {
        let handle = node_map.get(node).ok_or(PartialBindError::UnresolvedJoint {
            skin: skin_index,
            joint,
            node,
        })?;
        if !seen.insert(node) {
            return Err(PartialBindError::DuplicateJoint {
                skin: skin_index,
                node,
            });
        }
        joints.push(handle);
    }

    let inverse_bind_matrices = match skin.inverse_bind_matrices {
        None => vec![Affine3A::IDENTITY; joint_count],
        Some(accessor) => match document.accessors.get(accessor).map(|a| &a.data) {
            Some(AccessorData::Mat4(matrices)) if matrices.len() == joint_count => {
                matrices.iter().map(|m| Affine3A::from_mat4(*m)).collect()
            }
            Some(data) => {
                return Err(PartialBindError::InverseBindMatrices {
                    skin: skin_index,
                    expected: joint_count,
                    found: if matches!(data, AccessorData::Mat4(_)) { data.len() } else { 0 },
                });
            }
            None => {
                return Err(PartialBindError::InverseBindMatrices {
                    skin: skin_index,
                    expected: joint_count,
                    found: 0,
                });
            }
        },
    };

    let root_joint_index = find_root_joint(document, skin);
    let name = skin.name.as_deref().unwrap_or("Skeleton");

    Ok(Skeleton::new(
        name,
        skin_index,
        joints,
        inverse_bind_matrices,
        root_joint_index,
    ))
}

/// Explicit skeleton root if it is a joint, else the first joint whose
/// parent is not a joint, else 0.
fn find_root_joint(document: &Document, skin: &SkinDesc) -> usize {
    if let Some(root) = skin.skeleton
        && let Some(index) = skin.joints.iter().position(|&j| j == root)
    {
        return index;
    }

    let joint_set: FxHashSet<usize> = skin.joints.iter().copied().collect();
    let child_joints: FxHashSet<usize> = skin
        .joints
        .iter()
        .filter_map(|&j| document.nodes.get(j))
        .flat_map(|n| n.children.iter().copied())
        .filter(|c| joint_set.contains(c))
        .collect();

    skin.joints
        .iter()
        .position(|j| !child_joints.contains(j))
        .unwrap_or(0)
}
