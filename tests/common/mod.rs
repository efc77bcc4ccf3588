//! Shared fixtures: hand-built documents, an in-memory decoder and a host
//! that records attach/detach calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec3, Vec4};

use myth_viewer::document::{
    AccessorData, AccessorDesc, AnimationDesc, ChannelDesc, Document, DocumentDecoder, MeshDesc,
    MorphTargetDesc, NodeDesc, NodeTransform, PrimitiveDesc, SamplerDesc, SceneDesc, SkinDesc,
    SourceKind, TargetProperty,
};
use myth_viewer::errors::DecodeError;
use myth_viewer::manager::{HostScene, SceneId};
use myth_viewer::scene::{NodeHandle, SceneGraph};
use myth_viewer::{AssetStore, LoaderSettings, SceneManager};

pub const EPSILON: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Document node indices of document A
// ============================================================================

pub const FACE: usize = 0;
pub const BODY: usize = 1;
pub const HIPS: usize = 2;
pub const SPINE: usize = 3;
pub const FACE_COPY: usize = 4;
pub const ARM: usize = 5;
pub const BROW: usize = 6;

/// Keyframe end time of clip 0 ("Walk").
pub const WALK_DURATION: f32 = 1.0;
/// Keyframe end time of clip 1 ("Wave").
pub const WAVE_DURATION: f32 = 2.0;

fn trs(translation: Vec3) -> NodeTransform {
    NodeTransform::Trs {
        translation,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    }
}

fn positions(accessor: usize) -> Vec<(String, usize)> {
    vec![("POSITION".to_string(), accessor)]
}

fn morph_targets(accessors: std::ops::RangeInclusive<usize>) -> Vec<MorphTargetDesc> {
    accessors
        .map(|a| MorphTargetDesc {
            attributes: positions(a),
        })
        .collect()
}

/// Document A.
///
/// - 2 animations: "Walk" (Hips translation + Spine rotation, T = 1s) and
///   "Wave" (Arm scale, T = 2s)
/// - 1 skin: joints [Hips, Spine] bound to the "Body" mesh
/// - mesh "Face" with 4 morph targets, instanced by `FACE` and `FACE_COPY`
/// - mesh "Brow" with 2 morph targets and default weights [0.25, 0.5]
pub fn document_a() -> Document {
    let accessors = vec![
        AccessorDesc::opaque(4), // 0: Face POSITION
        AccessorDesc::opaque(4), // 1-4: Face targets
        AccessorDesc::opaque(4),
        AccessorDesc::opaque(4),
        AccessorDesc::opaque(4),
        AccessorDesc::opaque(8), // 5: Body POSITION
        AccessorDesc::opaque(8), // 6: JOINTS_0
        AccessorDesc::opaque(8), // 7: WEIGHTS_0
        AccessorDesc::new(AccessorData::Mat4(vec![
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
        ])), // 8: inverse bind matrices
        AccessorDesc::new(AccessorData::Scalar(vec![0.0, WALK_DURATION])), // 9
        AccessorDesc::new(AccessorData::Vec3(vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)])), // 10
        AccessorDesc::new(AccessorData::Vec4(vec![
            Vec4::from(Quat::IDENTITY),
            Vec4::from(Quat::from_rotation_y(FRAC_PI_2)),
        ])), // 11
        AccessorDesc::new(AccessorData::Scalar(vec![0.0, WAVE_DURATION])), // 12
        AccessorDesc::new(AccessorData::Vec3(vec![Vec3::ONE, Vec3::splat(3.0)])), // 13
        AccessorDesc::opaque(3), // 14: Brow POSITION
        AccessorDesc::opaque(3), // 15-16: Brow targets
        AccessorDesc::opaque(3),
    ];

    let meshes = vec![
        MeshDesc {
            name: Some("Face".into()),
            primitives: vec![PrimitiveDesc {
                attributes: positions(0),
                targets: morph_targets(1..=4),
                ..Default::default()
            }],
            weights: vec![],
            target_names: vec!["smile".into(), "frown".into(), "blink".into(), "angry".into()],
        },
        MeshDesc {
            name: Some("Body".into()),
            primitives: vec![PrimitiveDesc {
                attributes: vec![
                    ("POSITION".into(), 5),
                    ("JOINTS_0".into(), 6),
                    ("WEIGHTS_0".into(), 7),
                ],
                ..Default::default()
            }],
            ..Default::default()
        },
        MeshDesc {
            name: Some("Brow".into()),
            primitives: vec![PrimitiveDesc {
                attributes: positions(14),
                targets: morph_targets(15..=16),
                ..Default::default()
            }],
            weights: vec![0.25, 0.5],
            target_names: vec![],
        },
    ];

    let nodes = vec![
        NodeDesc {
            name: Some("Face".into()),
            mesh: Some(0),
            ..Default::default()
        },
        NodeDesc {
            name: Some("Body".into()),
            mesh: Some(1),
            skin: Some(0),
            ..Default::default()
        },
        NodeDesc {
            name: Some("Hips".into()),
            children: vec![SPINE],
            transform: trs(Vec3::new(0.0, 1.0, 0.0)),
            ..Default::default()
        },
        NodeDesc {
            name: Some("Spine".into()),
            children: vec![ARM],
            ..Default::default()
        },
        NodeDesc {
            name: Some("FaceCopy".into()),
            mesh: Some(0),
            transform: trs(Vec3::new(1.0, 0.0, 0.0)),
            ..Default::default()
        },
        NodeDesc {
            name: Some("Arm".into()),
            ..Default::default()
        },
        NodeDesc {
            name: Some("Brow".into()),
            mesh: Some(2),
            ..Default::default()
        },
    ];

    let skins = vec![SkinDesc {
        name: Some("Armature".into()),
        joints: vec![HIPS, SPINE],
        inverse_bind_matrices: Some(8),
        skeleton: Some(HIPS),
    }];

    let animations = vec![
        AnimationDesc {
            name: Some("Walk".into()),
            samplers: vec![
                SamplerDesc {
                    input: 9,
                    output: 10,
                    ..Default::default()
                },
                SamplerDesc {
                    input: 9,
                    output: 11,
                    ..Default::default()
                },
            ],
            channels: vec![
                ChannelDesc {
                    sampler: 0,
                    target_node: HIPS,
                    property: TargetProperty::Translation,
                },
                ChannelDesc {
                    sampler: 1,
                    target_node: SPINE,
                    property: TargetProperty::Rotation,
                },
            ],
        },
        AnimationDesc {
            name: Some("Wave".into()),
            samplers: vec![SamplerDesc {
                input: 12,
                output: 13,
                ..Default::default()
            }],
            channels: vec![ChannelDesc {
                sampler: 0,
                target_node: ARM,
                property: TargetProperty::Scale,
            }],
        },
    ];

    Document {
        nodes,
        meshes,
        materials: vec![],
        accessors,
        skins,
        animations,
        scenes: vec![SceneDesc {
            name: Some("Scene".into()),
            nodes: vec![FACE, BODY, HIPS, FACE_COPY, BROW],
        }],
        default_scene: Some(0),
    }
}

/// Document B: document A whose "Walk" animation gains a third channel
/// targeting node 42, which does not exist.
pub fn document_b() -> Document {
    let mut doc = document_a();
    doc.animations[0].channels.push(ChannelDesc {
        sampler: 0,
        target_node: 42,
        property: TargetProperty::Translation,
    });
    doc
}

/// A document whose scene references a mesh that does not exist.
pub fn broken_document() -> Document {
    let mut doc = document_a();
    doc.nodes[FACE].mesh = Some(9);
    doc
}

// ============================================================================
// Collaborators
// ============================================================================

/// Serves documents registered by path. Unknown paths fail with an I/O error.
#[derive(Default)]
pub struct MemoryDecoder {
    documents: HashMap<PathBuf, Document>,
    pub calls: usize,
}

impl MemoryDecoder {
    pub fn with(mut self, path: &str, document: Document) -> Self {
        self.documents.insert(PathBuf::from(path), document);
        self
    }
}

impl DocumentDecoder for MemoryDecoder {
    fn decode(&mut self, path: &Path, _kind: SourceKind) -> Result<Document, DecodeError> {
        self.calls += 1;
        self.documents.get(path).cloned().ok_or_else(|| {
            DecodeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Attach(SceneId),
    Detach(SceneId),
}

/// Host that logs every call and tracks which root is attached.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
    pub attached: Vec<(SceneId, NodeHandle)>,
}

impl HostScene for RecordingHost {
    fn attach(&mut self, id: SceneId, graph: &SceneGraph, root: NodeHandle) {
        assert!(graph.contains(root), "attached root must exist in its graph");
        self.events.push(HostEvent::Attach(id));
        self.attached.push((id, root));
    }

    fn detach(&mut self, id: SceneId, _root: NodeHandle) {
        self.events.push(HostEvent::Detach(id));
        self.attached.retain(|(attached, _)| *attached != id);
    }
}

pub type TestManager = SceneManager<MemoryDecoder, AssetStore, RecordingHost>;

/// Manager serving document A at `a.glb`, document B at `b.gltf` and the
/// broken document at `broken.glb`.
pub fn manager() -> TestManager {
    init_logger();
    let decoder = MemoryDecoder::default()
        .with("a.glb", document_a())
        .with("b.gltf", document_b())
        .with("broken.glb", broken_document());
    SceneManager::new(
        decoder,
        AssetStore::new(),
        RecordingHost::default(),
        LoaderSettings::default(),
    )
}
