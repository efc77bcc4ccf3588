//! [`DocumentDecoder`] backed by the `gltf` crate.
//!
//! Decodes `.gltf` / `.glb` files into a [`Document`]. Keyframe and
//! inverse-bind-matrix accessors are read eagerly; vertex accessors are kept
//! opaque and left to the geometry resolver.

use std::path::Path;

use ::gltf::animation::util::ReadOutputs;
use glam::{Mat4, Quat, Vec3, Vec4};
use serde::Deserialize;

use crate::document::{
    AccessorData, AccessorDesc, AnimationDesc, ChannelDesc, Document, DocumentDecoder,
    Interpolation, MaterialDesc, MeshDesc, MorphTargetDesc, NodeDesc, NodeTransform,
    PrimitiveDesc, SamplerDesc, SceneDesc, SkinDesc, SourceKind, TargetProperty,
};
use crate::errors::DecodeError;

const GLB_MAGIC: &[u8; 4] = b"glTF";

#[derive(Debug, Default, Clone, Copy)]
pub struct GltfDecoder;

impl GltfDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentDecoder for GltfDecoder {
    fn decode(&mut self, path: &Path, kind: SourceKind) -> Result<Document, DecodeError> {
        let bytes = std::fs::read(path)?;

        let is_binary = bytes.starts_with(GLB_MAGIC);
        match (kind, is_binary) {
            (SourceKind::Binary, false) => {
                return Err(DecodeError::Malformed(format!(
                    "{} has no binary container header",
                    path.display()
                )));
            }
            (SourceKind::Text, true) => {
                return Err(DecodeError::Malformed(format!(
                    "{} is a binary container, expected text",
                    path.display()
                )));
            }
            _ => {}
        }

        let gltf = ::gltf::Gltf::from_slice(&bytes)?;

        let version = &gltf.document.as_json().asset.version;
        if !version.starts_with("2.") {
            return Err(DecodeError::UnsupportedVersion(version.clone()));
        }

        let buffers = ::gltf::import_buffers(&gltf.document, path.parent(), gltf.blob.clone())?;
        let document = convert(&gltf.document, &buffers);

        log::debug!(
            "Decoded {}: {} nodes, {} meshes, {} skins, {} animations",
            path.display(),
            document.nodes.len(),
            document.meshes.len(),
            document.skins.len(),
            document.animations.len()
        );

        Ok(document)
    }
}

fn convert(doc: &::gltf::Document, buffers: &[::gltf::buffer::Data]) -> Document {
    let mut accessors: Vec<AccessorDesc> = doc
        .accessors()
        .map(|a| AccessorDesc {
            name: a.name().map(String::from),
            count: a.count(),
            data: AccessorData::Opaque,
        })
        .collect();

    let nodes = doc
        .nodes()
        .map(|node| NodeDesc {
            name: node.name().map(String::from),
            children: node.children().map(|c| c.index()).collect(),
            mesh: node.mesh().map(|m| m.index()),
            skin: node.skin().map(|s| s.index()),
            transform: match node.transform() {
                ::gltf::scene::Transform::Matrix { matrix } => {
                    NodeTransform::Matrix(Mat4::from_cols_array_2d(&matrix))
                }
                ::gltf::scene::Transform::Decomposed {
                    translation,
                    rotation,
                    scale,
                } => NodeTransform::Trs {
                    translation: Vec3::from_array(translation),
                    rotation: Quat::from_array(rotation),
                    scale: Vec3::from_array(scale),
                },
            },
            weights: node.weights().map(<[f32]>::to_vec),
        })
        .collect();

    let meshes = doc.meshes().map(|mesh| convert_mesh(&mesh)).collect();

    let materials = doc
        .materials()
        .map(|m| MaterialDesc {
            name: m.name().map(String::from),
            base_color_factor: Vec4::from_array(m.pbr_metallic_roughness().base_color_factor()),
            double_sided: m.double_sided(),
        })
        .collect();

    let mut skins = Vec::new();
    for skin in doc.skins() {
        let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
        if let (Some(accessor), Some(iter)) =
            (skin.inverse_bind_matrices(), reader.read_inverse_bind_matrices())
        {
            accessors[accessor.index()].data =
                AccessorData::Mat4(iter.map(|m| Mat4::from_cols_array_2d(&m)).collect());
        }

        skins.push(SkinDesc {
            name: skin.name().map(String::from),
            joints: skin.joints().map(|j| j.index()).collect(),
            inverse_bind_matrices: skin.inverse_bind_matrices().map(|a| a.index()),
            skeleton: skin.skeleton().map(|n| n.index()),
        });
    }

    let mut animations = Vec::new();
    for anim in doc.animations() {
        let samplers = anim
            .samplers()
            .map(|sampler| SamplerDesc {
                input: sampler.input().index(),
                output: sampler.output().index(),
                interpolation: match sampler.interpolation() {
                    ::gltf::animation::Interpolation::Linear => Interpolation::Linear,
                    ::gltf::animation::Interpolation::Step => Interpolation::Step,
                    ::gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
                },
            })
            .collect();

        let mut channels = Vec::new();
        for channel in anim.channels() {
            let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
            let sampler = channel.sampler();

            if let Some(times) = reader.read_inputs() {
                accessors[sampler.input().index()].data = AccessorData::Scalar(times.collect());
            }
            if let Some(outputs) = reader.read_outputs() {
                accessors[sampler.output().index()].data = match outputs {
                    ReadOutputs::Translations(iter) | ReadOutputs::Scales(iter) => {
                        AccessorData::Vec3(iter.map(Vec3::from_array).collect())
                    }
                    ReadOutputs::Rotations(iter) => {
                        AccessorData::Vec4(iter.into_f32().map(Vec4::from_array).collect())
                    }
                    ReadOutputs::MorphTargetWeights(iter) => {
                        AccessorData::Scalar(iter.into_f32().collect())
                    }
                };
            }

            let target = channel.target();
            channels.push(ChannelDesc {
                sampler: sampler.index(),
                target_node: target.node().index(),
                property: match target.property() {
                    ::gltf::animation::Property::Translation => TargetProperty::Translation,
                    ::gltf::animation::Property::Rotation => TargetProperty::Rotation,
                    ::gltf::animation::Property::Scale => TargetProperty::Scale,
                    ::gltf::animation::Property::MorphTargetWeights => TargetProperty::Weights,
                },
            });
        }

        animations.push(AnimationDesc {
            name: anim.name().map(String::from),
            channels,
            samplers,
        });
    }

    let scenes = doc
        .scenes()
        .map(|scene| SceneDesc {
            name: scene.name().map(String::from),
            nodes: scene.nodes().map(|n| n.index()).collect(),
        })
        .collect();

    Document {
        nodes,
        meshes,
        materials,
        accessors,
        skins,
        animations,
        scenes,
        default_scene: doc.default_scene().map(|s| s.index()),
    }
}

fn convert_mesh(mesh: &::gltf::Mesh) -> MeshDesc {
    let primitives = mesh
        .primitives()
        .map(|primitive| PrimitiveDesc {
            attributes: primitive
                .attributes()
                .map(|(semantic, accessor)| (semantic_name(&semantic), accessor.index()))
                .collect(),
            indices: primitive.indices().map(|a| a.index()),
            material: primitive.material().index(),
            targets: primitive
                .morph_targets()
                .map(|target| MorphTargetDesc {
                    attributes: [
                        ("POSITION", target.positions()),
                        ("NORMAL", target.normals()),
                        ("TANGENT", target.tangents()),
                    ]
                    .into_iter()
                    .filter_map(|(name, accessor)| accessor.map(|a| (name.to_string(), a.index())))
                    .collect(),
                })
                .collect(),
        })
        .collect();

    MeshDesc {
        name: mesh.name().map(String::from),
        primitives,
        weights: mesh.weights().map(<[f32]>::to_vec).unwrap_or_default(),
        target_names: target_names(mesh),
    }
}

#[allow(unreachable_patterns)]
fn semantic_name(semantic: &::gltf::Semantic) -> String {
    match semantic {
        ::gltf::Semantic::Positions => "POSITION".to_string(),
        ::gltf::Semantic::Normals => "NORMAL".to_string(),
        ::gltf::Semantic::Tangents => "TANGENT".to_string(),
        ::gltf::Semantic::Colors(n) => format!("COLOR_{n}"),
        ::gltf::Semantic::TexCoords(n) => format!("TEXCOORD_{n}"),
        ::gltf::Semantic::Joints(n) => format!("JOINTS_{n}"),
        ::gltf::Semantic::Weights(n) => format!("WEIGHTS_{n}"),
        other => format!("{other:?}"),
    }
}

/// Morph target names live in `mesh.extras.targetNames` by convention.
fn target_names(mesh: &::gltf::Mesh) -> Vec<String> {
    #[derive(Deserialize)]
    struct MeshExtras {
        #[serde(rename = "targetNames", default)]
        target_names: Vec<String>,
    }

    mesh.extras()
        .as_ref()
        .and_then(|raw| serde_json::from_str::<MeshExtras>(raw.get()).ok())
        .map(|extras| extras.target_names)
        .unwrap_or_default()
}
