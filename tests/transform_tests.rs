//! Transform and SceneGraph tests
//!
//! Tests for:
//! - Transform TRS operations and dirty checking
//! - Document transforms (TRS and matrix) decomposition
//! - Hierarchical matrix propagation through the scene graph
//! - Graph editing: attach, detach, subtree removal, traversal order

use glam::{Affine3A, Mat4, Quat, Vec3};
use myth_viewer::assets::{GeometryHandle, MaterialHandle};
use myth_viewer::document::NodeTransform;
use myth_viewer::scene::{MeshInstance, Node, NodeHandle, Primitive, SceneGraph, Transform};
use slotmap::KeyData;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

fn world_position(graph: &SceneGraph, handle: NodeHandle) -> Vec3 {
    graph.get_node(handle).unwrap().world_matrix().translation.into()
}

/// Chain root → n1 → … each offset by +1 on X.
fn create_chain(length: usize) -> (SceneGraph, Vec<NodeHandle>) {
    let mut graph = SceneGraph::new();
    let mut handles = Vec::with_capacity(length);
    for i in 0..length {
        let mut node = Node::with_name(format!("n{i}"));
        node.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let handle = graph.create_node(node);
        if let Some(&parent) = handles.last() {
            assert!(graph.attach(handle, parent));
        }
        handles.push(handle);
    }
    (graph, handles)
}

// ============================================================================
// Transform Unit Tests
// ============================================================================

#[test]
fn transform_default_is_identity() {
    let t = Transform::new();
    assert_eq!(t.position, Vec3::ZERO);
    assert_eq!(t.rotation, Quat::IDENTITY);
    assert_eq!(t.scale, Vec3::ONE);
}

#[test]
fn transform_update_local_matrix_dirty_check() {
    let mut t = Transform::new();

    // First call always rebuilds.
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    t.position = Vec3::new(1.0, 2.0, 3.0);
    assert!(t.update_local_matrix());
    assert!(!t.update_local_matrix());

    t.rotation = Quat::from_rotation_z(FRAC_PI_2);
    assert!(t.update_local_matrix());
}

#[test]
fn transform_local_matrix_reflects_trs() {
    let mut t = Transform::new();
    t.position = Vec3::new(1.0, 2.0, 3.0);
    t.scale = Vec3::splat(2.0);
    t.update_local_matrix();

    let p = t.local_matrix().transform_point3(Vec3::ONE);
    assert!(vec3_approx(p, Vec3::new(3.0, 4.0, 5.0)));
}

#[test]
fn transform_apply_local_matrix_decomposition() {
    let original_pos = Vec3::new(5.0, -3.0, 7.0);
    let original_rot = Quat::from_rotation_y(FRAC_PI_4);
    let original_scale = Vec3::new(2.0, 3.0, 1.5);

    let mat = Affine3A::from_scale_rotation_translation(original_scale, original_rot, original_pos);

    let mut t = Transform::new();
    t.apply_local_matrix(mat);

    assert!(vec3_approx(t.position, original_pos));
    assert!(vec3_approx(t.scale, original_scale));
    // Quaternion may differ in sign, but represent the same rotation
    assert!(t.rotation.angle_between(original_rot) < 1e-4);
}

#[test]
fn transform_mark_dirty_forces_update() {
    let mut t = Transform::new();
    t.update_local_matrix();
    assert!(!t.update_local_matrix());

    t.mark_dirty();
    assert!(t.update_local_matrix());
}

#[test]
fn transform_from_document_trs_normalises_rotation() {
    let t = Transform::from_node_transform(&NodeTransform::Trs {
        translation: Vec3::X,
        rotation: Quat::from_xyzw(0.0, 0.0, 0.0, 2.0),
        scale: Vec3::splat(0.5),
    });
    assert_eq!(t.position, Vec3::X);
    assert!(t.rotation.is_normalized());
    assert_eq!(t.scale, Vec3::splat(0.5));
}

#[test]
fn transform_from_document_matrix_decomposes() {
    let m = Mat4::from_scale_rotation_translation(
        Vec3::new(1.0, 2.0, 1.0),
        Quat::from_rotation_x(FRAC_PI_2),
        Vec3::new(0.0, 0.0, -4.0),
    );
    let t = Transform::from_node_transform(&NodeTransform::Matrix(m));
    assert!(vec3_approx(t.position, Vec3::new(0.0, 0.0, -4.0)));
    assert!(vec3_approx(t.scale, Vec3::new(1.0, 2.0, 1.0)));
    assert!(t.rotation.angle_between(Quat::from_rotation_x(FRAC_PI_2)) < 1e-4);
}

// ============================================================================
// Hierarchy Propagation
// ============================================================================

#[test]
fn hierarchy_chain_world_positions() {
    let (mut graph, handles) = create_chain(5);
    graph.update_world_matrices(handles[0]);

    for (i, &h) in handles.iter().enumerate() {
        let expected = Vec3::new((i + 1) as f32, 0.0, 0.0);
        assert!(vec3_approx(world_position(&graph, h), expected));
    }
}

#[test]
fn hierarchy_with_rotation_and_scale() {
    let mut graph = SceneGraph::new();

    let mut parent = Node::new();
    parent.transform.rotation = Quat::from_rotation_z(FRAC_PI_2);
    parent.transform.scale = Vec3::splat(2.0);
    let parent = graph.create_node(parent);

    let mut child = Node::new();
    child.transform.position = Vec3::X;
    let child = graph.create_node(child);
    graph.attach(child, parent);

    graph.update_world_matrices(parent);
    // X rotated onto Y, then scaled by 2.
    assert!(vec3_approx(world_position(&graph, child), Vec3::new(0.0, 2.0, 0.0)));
}

#[test]
fn hierarchy_parent_change_propagates_to_unchanged_children() {
    let (mut graph, handles) = create_chain(3);
    graph.update_world_matrices(handles[0]);

    graph.get_node_mut(handles[0]).unwrap().transform.position = Vec3::new(0.0, 5.0, 0.0);
    graph.update_world_matrices(handles[0]);

    assert!(vec3_approx(
        world_position(&graph, handles[2]),
        Vec3::new(2.0, 5.0, 0.0)
    ));
}

#[test]
fn hierarchy_subtree_update_uses_parent_world() {
    let (mut graph, handles) = create_chain(4);
    graph.update_world_matrices(handles[0]);

    graph.get_node_mut(handles[2]).unwrap().transform.position = Vec3::new(0.0, 1.0, 0.0);
    graph.update_world_matrices(handles[2]);

    assert!(vec3_approx(
        world_position(&graph, handles[2]),
        Vec3::new(2.0, 1.0, 0.0)
    ));
    assert!(vec3_approx(
        world_position(&graph, handles[3]),
        Vec3::new(3.0, 1.0, 0.0)
    ));
}

#[test]
fn hierarchy_reattach_moves_world_position() {
    let (mut graph, handles) = create_chain(3);
    let mut other = Node::new();
    other.transform.position = Vec3::new(0.0, 0.0, 10.0);
    let other = graph.create_node(other);
    graph.attach(other, handles[0]);

    graph.attach(handles[2], other);
    graph.update_world_matrices(handles[0]);

    assert!(vec3_approx(
        world_position(&graph, handles[2]),
        Vec3::new(2.0, 0.0, 10.0)
    ));
}

// ============================================================================
// Graph Editing
// ============================================================================

#[test]
fn attach_refuses_stale_and_cyclic_handles() {
    let (mut graph, handles) = create_chain(3);
    assert!(!graph.attach(handles[0], handles[2]));
    assert!(!graph.attach(handles[1], handles[1]));

    graph.remove_node(handles[2]);
    assert!(!graph.attach(handles[2], handles[0]));
}

#[test]
fn remove_node_removes_subtree_and_meshes() {
    let (mut graph, handles) = create_chain(4);
    let dummy = Primitive {
        geometry: GeometryHandle::from(KeyData::from_ffi(1)),
        material: MaterialHandle::from(KeyData::from_ffi(1)),
        skinned: false,
    };
    let key = graph
        .set_mesh(MeshInstance::new("leaf", handles[3], 0, vec![dummy]))
        .unwrap();

    graph.remove_node(handles[1]);

    assert_eq!(graph.node_count(), 1);
    assert!(graph.get_mesh(key).is_none());
    assert!(graph.get_node(handles[0]).unwrap().children().is_empty());
    assert!(!graph.contains(handles[3]));
}

#[test]
fn set_mesh_replaces_previous_instance() {
    let (mut graph, handles) = create_chain(1);
    let first = graph
        .set_mesh(MeshInstance::new("a", handles[0], 0, Vec::new()))
        .unwrap();
    let second = graph
        .set_mesh(MeshInstance::new("b", handles[0], 1, Vec::new()))
        .unwrap();

    assert!(graph.get_mesh(first).is_none());
    assert_eq!(graph.mesh_of(handles[0]).map(|m| m.name.as_str()), Some("b"));
    assert_eq!(graph.get_node(handles[0]).unwrap().mesh(), Some(second));
    assert_eq!(graph.meshes().count(), 1);
}

#[test]
fn traverse_visits_parents_before_children() {
    let (mut graph, handles) = create_chain(3);
    let sibling = graph.create_node(Node::with_name("sibling"));
    graph.attach(sibling, handles[0]);

    let mut order = Vec::new();
    graph.traverse(handles[0], |_, node| order.push(node.name.clone().unwrap()));
    assert_eq!(order, vec!["n0", "n1", "n2", "sibling"]);

    assert_eq!(graph.find_node_by_name(handles[0], "sibling"), Some(sibling));
    assert_eq!(graph.find_node_by_name(handles[1], "sibling"), None);
}
