//! Morph Blend Controller Tests
//!
//! Tests for:
//! - Group discovery (shared source meshes, traversal order, labels)
//! - Weight writes: full-vector re-apply, idempotence, isolation
//! - Rejected inputs (non-finite values, unknown slots)

mod common;

use common::*;
use myth_viewer::assets::AssetStore;
use myth_viewer::errors::ViewerError;
use myth_viewer::loader::{BuiltScene, SceneBuilder};
use myth_viewer::scene::MeshInstance;
use myth_viewer::{MorphBlendController, NodeHandle};

const FACE_GROUP: usize = 0;
const BROW_GROUP: usize = 1;

fn built_a() -> (BuiltScene, MorphBlendController) {
    let doc = document_a();
    let mut store = AssetStore::new();
    let built = SceneBuilder::build(&doc, None, &mut store).unwrap();
    let morphs = MorphBlendController::discover(&built.graph, built.root, |mesh| {
        doc.meshes[mesh].target_names.clone()
    });
    (built, morphs)
}

fn weights_of(built: &BuiltScene, node: NodeHandle) -> Vec<f32> {
    built
        .graph
        .mesh_of(node)
        .and_then(MeshInstance::morph_weights)
        .map(<[f32]>::to_vec)
        .unwrap_or_default()
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn discover_groups_instances_of_one_mesh() {
    let (built, morphs) = built_a();

    assert_eq!(morphs.groups().len(), 2);

    let face = morphs.group(FACE_GROUP).unwrap();
    assert_eq!(face.name, "Face");
    assert_eq!(face.source_mesh, 0);
    assert_eq!(face.target_count(), 4);
    assert_eq!(face.meshes().len(), 2);

    let face_mesh = built.graph.get_node(built.node_map.get(FACE).unwrap()).unwrap().mesh();
    let copy_mesh = built
        .graph
        .get_node(built.node_map.get(FACE_COPY).unwrap())
        .unwrap()
        .mesh();
    assert_eq!(Some(face.meshes()[0]), face_mesh);
    assert_eq!(Some(face.meshes()[1]), copy_mesh);

    let brow = morphs.group(BROW_GROUP).unwrap();
    assert_eq!(brow.weights(), &[0.25, 0.5]);
}

#[test]
fn target_labels_fall_back_to_index() {
    let (_, morphs) = built_a();
    let face = morphs.group(FACE_GROUP).unwrap();
    let brow = morphs.group(BROW_GROUP).unwrap();

    assert_eq!(face.target_label(2), "blink");
    assert_eq!(brow.target_label(1), "1");
}

#[test]
fn discover_on_scene_without_morphs_is_empty() {
    let mut doc = document_a();
    for node in &mut doc.nodes {
        if node.mesh != Some(1) {
            node.mesh = None;
        }
    }
    let mut store = AssetStore::new();
    let built = SceneBuilder::build(&doc, None, &mut store).unwrap();
    let morphs = MorphBlendController::discover(&built.graph, built.root, |_| Vec::new());
    assert!(morphs.is_empty());
    assert_eq!(morphs.weights(0), None);
}

// ============================================================================
// Weight Writes
// ============================================================================

#[test]
fn set_weight_updates_every_instance() {
    let (mut built, mut morphs) = built_a();

    morphs.set_weight(FACE_GROUP, 2, 0.7, &mut built.graph).unwrap();

    let expected = vec![0.0, 0.0, 0.7, 0.0];
    assert_eq!(weights_of(&built, built.node_map.get(FACE).unwrap()), expected);
    assert_eq!(weights_of(&built, built.node_map.get(FACE_COPY).unwrap()), expected);
    assert_eq!(morphs.weights(FACE_GROUP), Some(expected.as_slice()));
}

#[test]
fn set_weight_leaves_other_groups_alone() {
    let (mut built, mut morphs) = built_a();

    morphs.set_weight(FACE_GROUP, 0, 1.0, &mut built.graph).unwrap();

    assert_eq!(
        weights_of(&built, built.node_map.get(BROW).unwrap()),
        vec![0.25, 0.5]
    );
}

#[test]
fn set_weight_is_idempotent() {
    let (mut built, mut morphs) = built_a();
    let face = built.node_map.get(FACE).unwrap();

    morphs.set_weight(FACE_GROUP, 1, 0.3, &mut built.graph).unwrap();
    let once = weights_of(&built, face);
    morphs.set_weight(FACE_GROUP, 1, 0.3, &mut built.graph).unwrap();
    assert_eq!(weights_of(&built, face), once);
}

#[test]
fn set_weight_rewrites_full_vector() {
    let (mut built, mut morphs) = built_a();
    let face = built.node_map.get(FACE).unwrap();

    morphs.set_weight(FACE_GROUP, 0, 0.5, &mut built.graph).unwrap();

    // An animation or another writer touched the mesh directly.
    built
        .graph
        .mesh_of_mut(face)
        .unwrap()
        .set_morph_weights(&[9.0, 9.0, 9.0, 9.0]);

    morphs.set_weight(FACE_GROUP, 3, 0.25, &mut built.graph).unwrap();
    assert_eq!(weights_of(&built, face), vec![0.5, 0.0, 0.0, 0.25]);
}

#[test]
fn out_of_range_values_are_not_clamped() {
    let (mut built, mut morphs) = built_a();

    morphs.set_weight(BROW_GROUP, 0, -2.5, &mut built.graph).unwrap();
    morphs.set_weight(BROW_GROUP, 1, 4.0, &mut built.graph).unwrap();
    assert_eq!(
        weights_of(&built, built.node_map.get(BROW).unwrap()),
        vec![-2.5, 4.0]
    );
}

#[test]
fn set_weights_replaces_leading_slots() {
    let (mut built, mut morphs) = built_a();

    morphs
        .set_weights(FACE_GROUP, &[0.1, 0.2], &mut built.graph)
        .unwrap();
    assert_eq!(
        weights_of(&built, built.node_map.get(FACE_COPY).unwrap()),
        vec![0.1, 0.2, 0.0, 0.0]
    );
}

#[test]
fn reapply_restores_controller_state() {
    let (mut built, mut morphs) = built_a();
    let copy = built.node_map.get(FACE_COPY).unwrap();

    morphs.set_weight(FACE_GROUP, 2, 0.7, &mut built.graph).unwrap();
    built
        .graph
        .mesh_of_mut(copy)
        .unwrap()
        .set_morph_weights(&[1.0; 4]);

    morphs.reapply(&mut built.graph);
    assert_eq!(weights_of(&built, copy), vec![0.0, 0.0, 0.7, 0.0]);
}

#[test]
fn removed_mesh_is_skipped() {
    let (mut built, mut morphs) = built_a();
    let copy = built.node_map.get(FACE_COPY).unwrap();
    built.graph.remove_node(copy);

    morphs.set_weight(FACE_GROUP, 0, 1.0, &mut built.graph).unwrap();
    assert_eq!(
        weights_of(&built, built.node_map.get(FACE).unwrap()),
        vec![1.0, 0.0, 0.0, 0.0]
    );
}

// ============================================================================
// Rejected Inputs
// ============================================================================

#[test]
fn non_finite_weight_is_rejected_without_side_effects() {
    let (mut built, mut morphs) = built_a();
    let face = built.node_map.get(FACE).unwrap();
    morphs.set_weight(FACE_GROUP, 0, 0.4, &mut built.graph).unwrap();

    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
        let err = morphs
            .set_weight(FACE_GROUP, 0, bad, &mut built.graph)
            .unwrap_err();
        assert!(matches!(err, ViewerError::NonFiniteWeight(_)));
    }
    assert!(
        morphs
            .set_weights(FACE_GROUP, &[0.0, f32::NAN], &mut built.graph)
            .is_err()
    );

    assert_eq!(weights_of(&built, face), vec![0.4, 0.0, 0.0, 0.0]);
    assert_eq!(morphs.weights(FACE_GROUP), Some([0.4, 0.0, 0.0, 0.0].as_slice()));
}

#[test]
fn unknown_slot_is_rejected() {
    let (mut built, mut morphs) = built_a();

    assert!(matches!(
        morphs.set_weight(FACE_GROUP, 4, 1.0, &mut built.graph),
        Err(ViewerError::MorphSlotOutOfRange { group: 0, target: 4 })
    ));
    assert!(matches!(
        morphs.set_weight(7, 0, 1.0, &mut built.graph),
        Err(ViewerError::MorphSlotOutOfRange { group: 7, target: 0 })
    ));
}
