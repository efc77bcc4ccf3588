//! Geometry / material resolution.
//!
//! The scene builder never parses vertex data. For every primitive it asks a
//! [`GeometryResolver`] for renderer-ready handles and stores them opaquely
//! in the built [`MeshInstance`](crate::scene::MeshInstance). The lifecycle
//! manager hands every handle back to the resolver when the scene is released.

mod store;

use slotmap::new_key_type;

use crate::document::{Document, MaterialDesc, PrimitiveDesc};
use crate::errors::StructuralError;

pub use store::{AssetStore, GeometryRecord, MaterialRecord};

new_key_type! {
    pub struct GeometryHandle;
    pub struct MaterialHandle;
}

/// External collaborator producing geometry and material handles.
pub trait GeometryResolver {
    /// Resolves primitive `primitive_index` of mesh `mesh_index`.
    fn resolve_geometry(
        &mut self,
        document: &Document,
        mesh_index: usize,
        primitive_index: usize,
        primitive: &PrimitiveDesc,
    ) -> Result<GeometryHandle, StructuralError>;

    /// Resolves a material. `None` requests the default material.
    fn resolve_material(
        &mut self,
        document: &Document,
        material: Option<(usize, &MaterialDesc)>,
    ) -> Result<MaterialHandle, StructuralError>;

    fn release_geometry(&mut self, handle: GeometryHandle);

    fn release_material(&mut self, handle: MaterialHandle);
}

/// Handles produced for one load. Each handle appears once.
#[derive(Debug, Default, Clone)]
pub struct ResolvedResources {
    pub geometries: Vec<GeometryHandle>,
    pub materials: Vec<MaterialHandle>,
}

impl ResolvedResources {
    /// Returns every handle to `resolver`, leaving `self` empty.
    pub fn release_into<R: GeometryResolver + ?Sized>(&mut self, resolver: &mut R) {
        for handle in self.geometries.drain(..) {
            resolver.release_geometry(handle);
        }
        for handle in self.materials.drain(..) {
            resolver.release_material(handle);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty() && self.materials.is_empty()
    }
}
