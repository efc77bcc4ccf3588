//! Scene graph.
//!
//! - [`SceneGraph`]: slotmap-backed owner of nodes, mesh instances and skeletons
//! - [`Node`]: hierarchy + transform
//! - [`Transform`]: TRS with cached local/world matrices
//! - [`MeshInstance`]: resolved primitives, morph weights, bound skeleton
//! - [`Skeleton`]: weak joint handles + inverse bind matrices

pub mod graph;
pub mod mesh;
pub mod node;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use graph::SceneGraph;
pub use mesh::{MeshInstance, MorphWeights, Primitive};
pub use node::Node;
pub use skeleton::Skeleton;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct SkeletonKey;
}
