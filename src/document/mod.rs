//! Document Model
//!
//! An immutable, index-referencing description of a 3D asset, as handed over
//! by a [`DocumentDecoder`]. Nodes reference meshes and skins by index,
//! meshes reference accessors, skins reference joint nodes, and animation
//! channels reference a target node plus a sampler.
//!
//! The viewer never mutates a `Document`; the scene builder turns it into an
//! owned [`SceneGraph`](crate::scene::SceneGraph).

mod source;
mod validate;

#[cfg(feature = "gltf")]
pub mod gltf;

use glam::{Mat4, Quat, Vec3, Vec4};

pub use source::{DocumentDecoder, SourceKind};

#[cfg(feature = "gltf")]
pub use self::gltf::GltfDecoder;

/// Attribute names that mark a primitive as skinned.
pub const JOINTS_ATTRIBUTE: &str = "JOINTS_0";
pub const WEIGHTS_ATTRIBUTE: &str = "WEIGHTS_0";
pub const POSITION_ATTRIBUTE: &str = "POSITION";

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub nodes: Vec<NodeDesc>,
    pub meshes: Vec<MeshDesc>,
    pub materials: Vec<MaterialDesc>,
    pub accessors: Vec<AccessorDesc>,
    pub skins: Vec<SkinDesc>,
    pub animations: Vec<AnimationDesc>,
    pub scenes: Vec<SceneDesc>,
    pub default_scene: Option<usize>,
}

impl Document {
    /// The scene index used when the caller does not pick one.
    #[must_use]
    pub fn default_scene_index(&self) -> usize {
        self.default_scene.unwrap_or(0)
    }

    /// Nodes that are nobody's child, in document order.
    #[must_use]
    pub fn parentless_nodes(&self) -> Vec<usize> {
        let mut has_parent = vec![false; self.nodes.len()];
        for node in &self.nodes {
            for &child in &node.children {
                if let Some(flag) = has_parent.get_mut(child) {
                    *flag = true;
                }
            }
        }
        has_parent
            .iter()
            .enumerate()
            .filter_map(|(i, &p)| (!p).then_some(i))
            .collect()
    }
}

// ============================================================================
// Nodes & Scenes
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SceneDesc {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeTransform {
    Trs {
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
    Matrix(Mat4),
}

impl Default for NodeTransform {
    fn default() -> Self {
        NodeTransform::Trs {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl NodeTransform {
    /// Splits the transform into (scale, rotation, translation).
    #[must_use]
    pub fn decomposed(&self) -> (Vec3, Quat, Vec3) {
        match *self {
            NodeTransform::Trs {
                translation,
                rotation,
                scale,
            } => (scale, rotation, translation),
            NodeTransform::Matrix(m) => m.to_scale_rotation_translation(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeDesc {
    pub name: Option<String>,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    pub transform: NodeTransform,
    /// Per-node override of the mesh's default morph weights.
    pub weights: Option<Vec<f32>>,
}

// ============================================================================
// Meshes & Materials
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MeshDesc {
    pub name: Option<String>,
    pub primitives: Vec<PrimitiveDesc>,
    /// Default morph weights.
    pub weights: Vec<f32>,
    pub target_names: Vec<String>,
}

impl MeshDesc {
    /// Number of morph targets. All primitives of a mesh share the same count;
    /// the largest one wins if a document disagrees.
    #[must_use]
    pub fn morph_target_count(&self) -> usize {
        self.primitives
            .iter()
            .map(|p| p.targets.len())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrimitiveDesc {
    /// (semantic, accessor index) pairs, e.g. `("POSITION", 0)`.
    pub attributes: Vec<(String, usize)>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    pub targets: Vec<MorphTargetDesc>,
}

impl PrimitiveDesc {
    #[must_use]
    pub fn attribute(&self, semantic: &str) -> Option<usize> {
        self.attributes
            .iter()
            .find_map(|(name, index)| (name == semantic).then_some(*index))
    }

    /// A primitive is skinned when it carries both joint indices and weights.
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.attribute(JOINTS_ATTRIBUTE).is_some() && self.attribute(WEIGHTS_ATTRIBUTE).is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MorphTargetDesc {
    pub attributes: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct MaterialDesc {
    pub name: Option<String>,
    pub base_color_factor: Vec4,
    pub double_sided: bool,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: Vec4::ONE,
            double_sided: false,
        }
    }
}

// ============================================================================
// Accessors
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AccessorDesc {
    pub name: Option<String>,
    pub count: usize,
    pub data: AccessorData,
}

impl AccessorDesc {
    #[must_use]
    pub fn new(data: AccessorData) -> Self {
        Self {
            name: None,
            count: data.len(),
            data,
        }
    }

    /// An accessor whose contents only the geometry resolver understands.
    #[must_use]
    pub fn opaque(count: usize) -> Self {
        Self {
            name: None,
            count,
            data: AccessorData::Opaque,
        }
    }
}

/// Decoded accessor contents.
///
/// Only the accessors the viewer interprets itself (keyframe times and
/// values, inverse bind matrices) are decoded. Vertex data is left
/// [`Opaque`](AccessorData::Opaque) for the geometry resolver.
#[derive(Debug, Clone, Default)]
pub enum AccessorData {
    Scalar(Vec<f32>),
    Vec3(Vec<Vec3>),
    Vec4(Vec<Vec4>),
    Mat4(Vec<Mat4>),
    #[default]
    Opaque,
}

impl AccessorData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            AccessorData::Scalar(v) => v.len(),
            AccessorData::Vec3(v) => v.len(),
            AccessorData::Vec4(v) => v.len(),
            AccessorData::Mat4(v) => v.len(),
            AccessorData::Opaque => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AccessorData::Scalar(_) => "SCALAR",
            AccessorData::Vec3(_) => "VEC3",
            AccessorData::Vec4(_) => "VEC4",
            AccessorData::Mat4(_) => "MAT4",
            AccessorData::Opaque => "opaque",
        }
    }
}

// ============================================================================
// Skins
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SkinDesc {
    pub name: Option<String>,
    /// Joint node indices. The order is the joint index space used by
    /// per-vertex joint attributes.
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Option<usize>,
    /// Optional explicit skeleton root node.
    pub skeleton: Option<usize>,
}

// ============================================================================
// Animations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetProperty {
    Translation,
    Rotation,
    Scale,
    Weights,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

#[derive(Debug, Clone, Default)]
pub struct SamplerDesc {
    /// Accessor of keyframe times (SCALAR).
    pub input: usize,
    /// Accessor of keyframe values.
    pub output: usize,
    pub interpolation: Interpolation,
}

#[derive(Debug, Clone)]
pub struct ChannelDesc {
    pub sampler: usize,
    pub target_node: usize,
    pub property: TargetProperty,
}

#[derive(Debug, Clone, Default)]
pub struct AnimationDesc {
    pub name: Option<String>,
    pub channels: Vec<ChannelDesc>,
    pub samplers: Vec<SamplerDesc>,
}
