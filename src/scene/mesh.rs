use crate::assets::{GeometryHandle, MaterialHandle};
use crate::scene::{NodeHandle, SkeletonKey};

/// One drawable part of a mesh. The handles are opaque resolver output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    /// Carries joint indices and weights.
    pub skinned: bool,
}

/// Morph weight vector of a mesh instance.
///
/// The length is fixed to the number of morph targets at construction.
/// Values are not range-clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphWeights {
    weights: Vec<f32>,
}

impl MorphWeights {
    #[must_use]
    pub fn new(target_count: usize) -> Self {
        Self {
            weights: vec![0.0; target_count],
        }
    }

    /// Starts from `initial`, padded with zeros or truncated to `target_count`.
    #[must_use]
    pub fn with_initial(target_count: usize, initial: &[f32]) -> Self {
        let mut weights = Self::new(target_count);
        weights.write(initial);
        weights
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    /// Overwrites the leading weights with `values`; extra values are ignored
    /// and trailing weights keep their value.
    pub fn write(&mut self, values: &[f32]) {
        let count = values.len().min(self.weights.len());
        self.weights[..count].copy_from_slice(&values[..count]);
    }
}

/// A mesh attached to a scene node.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub name: String,

    pub(crate) node: NodeHandle,
    /// Document mesh this instance was built from. Instances sharing a
    /// source mesh share one morph target set.
    pub(crate) source_mesh: usize,

    pub primitives: Vec<Primitive>,

    pub(crate) morph: Option<MorphWeights>,
    pub(crate) skeleton: Option<SkeletonKey>,
}

impl MeshInstance {
    #[must_use]
    pub fn new(name: impl Into<String>, node: NodeHandle, source_mesh: usize, primitives: Vec<Primitive>) -> Self {
        Self {
            name: name.into(),
            node,
            source_mesh,
            primitives,
            morph: None,
            skeleton: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeHandle {
        self.node
    }

    #[inline]
    #[must_use]
    pub fn source_mesh(&self) -> usize {
        self.source_mesh
    }

    /// Whether any primitive declares skinning attributes.
    #[must_use]
    pub fn is_skinned(&self) -> bool {
        self.primitives.iter().any(|p| p.skinned)
    }

    /// The bound skeleton, if skinning succeeded.
    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> Option<SkeletonKey> {
        self.skeleton
    }

    #[must_use]
    pub fn morph_target_count(&self) -> usize {
        self.morph.as_ref().map_or(0, MorphWeights::len)
    }

    #[must_use]
    pub fn morph_weights(&self) -> Option<&[f32]> {
        self.morph.as_ref().map(MorphWeights::as_slice)
    }

    pub fn init_morph_targets(&mut self, target_count: usize, initial: &[f32]) {
        self.morph = (target_count > 0).then(|| MorphWeights::with_initial(target_count, initial));
    }

    /// Writes morph weights. No-op on meshes without morph targets.
    pub fn set_morph_weights(&mut self, values: &[f32]) {
        if let Some(morph) = self.morph.as_mut() {
            morph.write(values);
        }
    }
}
