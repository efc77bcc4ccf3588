//! Morph Blend Controller
//!
//! Collects the morphable meshes of a built scene and exposes one weight
//! slot per morph target. Mesh instances built from the same document mesh
//! form one group and always carry identical weights.

use crate::errors::{Result, ViewerError};
use crate::scene::{MeshKey, NodeHandle, SceneGraph};

/// One shared morph target set.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphGroup {
    /// Document mesh the instances were built from.
    pub source_mesh: usize,
    pub name: String,
    /// Per-target labels; may be shorter than `weights`.
    pub target_names: Vec<String>,
    pub(crate) weights: Vec<f32>,
    pub(crate) meshes: Vec<MeshKey>,
}

impl MorphGroup {
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[must_use]
    pub fn meshes(&self) -> &[MeshKey] {
        &self.meshes
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.weights.len()
    }

    /// `targetNames` entry, or the target index.
    #[must_use]
    pub fn target_label(&self, target: usize) -> String {
        self.target_names
            .get(target)
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| target.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MorphBlendController {
    groups: Vec<MorphGroup>,
}

impl MorphBlendController {
    /// Walks the graph below `root` and groups every mesh with morph targets
    /// by its source mesh, in traversal order.
    ///
    /// Each group starts from the weights of its first instance.
    #[must_use]
    pub fn discover(graph: &SceneGraph, root: NodeHandle, target_names: impl Fn(usize) -> Vec<String>) -> Self {
        let mut groups: Vec<MorphGroup> = Vec::new();

        graph.traverse(root, |_, node| {
            let Some(mesh_key) = node.mesh() else {
                return;
            };
            let Some(mesh) = graph.get_mesh(mesh_key) else {
                return;
            };
            let Some(weights) = mesh.morph_weights() else {
                return;
            };

            if let Some(group) = groups.iter_mut().find(|g| g.source_mesh == mesh.source_mesh()) {
                group.meshes.push(mesh_key);
            } else {
                groups.push(MorphGroup {
                    source_mesh: mesh.source_mesh(),
                    name: mesh.name.clone(),
                    target_names: target_names(mesh.source_mesh()),
                    weights: weights.to_vec(),
                    meshes: vec![mesh_key],
                });
            }
        });

        log::debug!("Discovered {} morph target groups", groups.len());
        Self { groups }
    }

    #[must_use]
    pub fn groups(&self) -> &[MorphGroup] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, index: usize) -> Option<&MorphGroup> {
        self.groups.get(index)
    }

    #[must_use]
    pub fn weights(&self, group: usize) -> Option<&[f32]> {
        self.groups.get(group).map(MorphGroup::weights)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sets slot `target` of `group` to `value` and writes the full vector
    /// to every mesh of the group.
    ///
    /// Any finite value is accepted; no range clamp.
    pub fn set_weight(
        &mut self,
        group: usize,
        target: usize,
        value: f32,
        graph: &mut SceneGraph,
    ) -> Result<()> {
        if !value.is_finite() {
            return Err(ViewerError::NonFiniteWeight(value));
        }
        let set = self
            .groups
            .get_mut(group)
            .ok_or(ViewerError::MorphSlotOutOfRange { group, target })?;
        let slot = set
            .weights
            .get_mut(target)
            .ok_or(ViewerError::MorphSlotOutOfRange { group, target })?;

        *slot = value;
        Self::apply_group(set, graph);
        Ok(())
    }

    /// Replaces the whole vector of `group`; extra values are ignored.
    pub fn set_weights(&mut self, group: usize, values: &[f32], graph: &mut SceneGraph) -> Result<()> {
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ViewerError::NonFiniteWeight(bad));
        }
        let set = self
            .groups
            .get_mut(group)
            .ok_or(ViewerError::MorphSlotOutOfRange { group, target: 0 })?;

        let count = values.len().min(set.weights.len());
        set.weights[..count].copy_from_slice(&values[..count]);
        Self::apply_group(set, graph);
        Ok(())
    }

    /// Writes every group's vector again, e.g. after an animation touched the meshes.
    pub fn reapply(&self, graph: &mut SceneGraph) {
        for group in &self.groups {
            Self::apply_group(group, graph);
        }
    }

    fn apply_group(group: &MorphGroup, graph: &mut SceneGraph) {
        // Released meshes are skipped.
        for &key in &group.meshes {
            if let Some(mesh) = graph.get_mesh_mut(key) {
                mesh.set_morph_weights(&group.weights);
            }
        }
    }
}
