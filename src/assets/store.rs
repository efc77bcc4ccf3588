use glam::Vec4;
use slotmap::SlotMap;

use crate::assets::{GeometryHandle, GeometryResolver, MaterialHandle};
use crate::document::{Document, MaterialDesc, POSITION_ATTRIBUTE, PrimitiveDesc};
use crate::errors::StructuralError;

/// What the store remembers about a resolved primitive.
#[derive(Debug, Clone)]
pub struct GeometryRecord {
    pub mesh_index: usize,
    pub primitive_index: usize,
    pub vertex_count: usize,
    pub morph_target_count: usize,
    pub skinned: bool,
}

#[derive(Debug, Clone)]
pub struct MaterialRecord {
    /// `None` for the default material.
    pub material_index: Option<usize>,
    pub name: Option<String>,
    pub base_color_factor: Vec4,
    pub double_sided: bool,
}

/// In-memory [`GeometryResolver`].
///
/// Stands in for a GPU resource manager: it records descriptors under
/// slotmap handles and drops them on release, so a leaked handle shows up
/// as a non-empty store.
#[derive(Debug, Default)]
pub struct AssetStore {
    geometries: SlotMap<GeometryHandle, GeometryRecord>,
    materials: SlotMap<MaterialHandle, MaterialRecord>,
}

impl AssetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn geometry(&self, handle: GeometryHandle) -> Option<&GeometryRecord> {
        self.geometries.get(handle)
    }

    #[must_use]
    pub fn material(&self, handle: MaterialHandle) -> Option<&MaterialRecord> {
        self.materials.get(handle)
    }

    #[must_use]
    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

impl GeometryResolver for AssetStore {
    fn resolve_geometry(
        &mut self,
        document: &Document,
        mesh_index: usize,
        primitive_index: usize,
        primitive: &PrimitiveDesc,
    ) -> Result<GeometryHandle, StructuralError> {
        let vertex_count = match primitive.attribute(POSITION_ATTRIBUTE) {
            Some(index) => {
                document
                    .accessors
                    .get(index)
                    .ok_or_else(|| StructuralError::IndexOutOfBounds {
                        context: format!("Mesh {mesh_index} primitive {primitive_index} POSITION accessor"),
                        index,
                        len: document.accessors.len(),
                    })?
                    .count
            }
            None => 0,
        };

        Ok(self.geometries.insert(GeometryRecord {
            mesh_index,
            primitive_index,
            vertex_count,
            morph_target_count: primitive.targets.len(),
            skinned: primitive.is_skinned(),
        }))
    }

    fn resolve_material(
        &mut self,
        _document: &Document,
        material: Option<(usize, &MaterialDesc)>,
    ) -> Result<MaterialHandle, StructuralError> {
        let record = match material {
            Some((index, desc)) => MaterialRecord {
                material_index: Some(index),
                name: desc.name.clone(),
                base_color_factor: desc.base_color_factor,
                double_sided: desc.double_sided,
            },
            None => MaterialRecord {
                material_index: None,
                name: Some("default".to_string()),
                base_color_factor: Vec4::ONE,
                double_sided: false,
            },
        };
        Ok(self.materials.insert(record))
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        if self.geometries.remove(handle).is_none() {
            log::warn!("Released unknown geometry {handle:?}");
        }
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        if self.materials.remove(handle).is_none() {
            log::warn!("Released unknown material {handle:?}");
        }
    }
}
