use crate::document::TargetProperty;
use crate::scene::NodeHandle;

/// Animated property of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation, // transform.position
    Rotation,    // transform.rotation
    Scale,       // transform.scale
    Weights,     // morph weights of the node's mesh
}

impl From<TargetProperty> for TargetPath {
    fn from(value: TargetProperty) -> Self {
        match value {
            TargetProperty::Translation => Self::Translation,
            TargetProperty::Rotation => Self::Rotation,
            TargetProperty::Scale => Self::Scale,
            TargetProperty::Weights => Self::Weights,
        }
    }
}

/// Maps track `track_index` of a clip to a property of `node_handle`.
///
/// The handle is weak: if the node is removed from the graph the binding
/// stops resolving and evaluation skips it.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}
