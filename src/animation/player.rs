use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binding::TargetPath;
use crate::errors::{Result, ViewerError};
use crate::scene::SceneGraph;

/// Owns the compiled clips of one loaded scene and drives them per frame.
#[derive(Debug, Default)]
pub struct AnimationPlayer {
    actions: Vec<AnimationAction>,
}

impl AnimationPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: AnimationAction) -> usize {
        self.actions.push(action);
        self.actions.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions in compile order.
    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    #[must_use]
    pub fn action(&self, index: usize) -> Option<&AnimationAction> {
        self.actions.get(index)
    }

    /// Flips clip `index` between Paused and Playing; returns the new playing state.
    pub fn toggle(&mut self, index: usize) -> Result<bool> {
        let count = self.actions.len();
        self.actions
            .get_mut(index)
            .map(AnimationAction::toggle_paused)
            .ok_or(ViewerError::ClipOutOfRange { index, count })
    }

    pub fn set_loop_all(&mut self, looping: bool) {
        for action in &mut self.actions {
            action.set_loop(looping);
        }
    }

    /// Pauses every clip and rewinds it.
    pub fn stop_all(&mut self) {
        for action in &mut self.actions {
            action.pause();
            action.reset();
        }
    }

    /// Advances every playing clip by `dt` and writes the sampled values into `graph`.
    ///
    /// Clips are evaluated in compile order; later clips overwrite earlier ones
    /// on shared targets. Targets whose node or mesh no longer exists are skipped.
    pub fn update(&mut self, dt: f32, graph: &mut SceneGraph) {
        for action in &mut self.actions {
            if action.update(dt) {
                Self::apply(action, graph);
            }
        }
    }

    fn apply(action: &mut AnimationAction, graph: &mut SceneGraph) {
        for i in 0..action.bindings.len() {
            let binding = &action.bindings[i];
            let (node_handle, target, track_index) =
                (binding.node_handle, binding.target, binding.track_index);

            // Weak target: released nodes are skipped before sampling.
            if !graph.contains(node_handle) {
                continue;
            }
            let Some(value) = action.sample_track(track_index) else {
                continue;
            };

            match (value, target) {
                (TrackValue::Vector3(v), TargetPath::Translation) => {
                    if let Some(node) = graph.get_node_mut(node_handle) {
                        node.transform.position = v;
                    }
                }
                (TrackValue::Vector3(v), TargetPath::Scale) => {
                    if let Some(node) = graph.get_node_mut(node_handle) {
                        node.transform.scale = v;
                    }
                }
                (TrackValue::Quaternion(q), TargetPath::Rotation) => {
                    if let Some(node) = graph.get_node_mut(node_handle) {
                        node.transform.rotation = q;
                    }
                }
                (TrackValue::MorphWeights(w), TargetPath::Weights) => {
                    if let Some(mesh) = graph.mesh_of_mut(node_handle) {
                        mesh.set_morph_weights(&w.weights);
                    }
                }
                (value, target) => {
                    log::debug!("Track value {value:?} does not fit target {target:?}");
                }
            }
        }
    }
}
