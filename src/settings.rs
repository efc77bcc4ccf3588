use serde::Deserialize;

use crate::errors::Result;

/// Loader and viewer configuration.
///
/// ```json
/// { "scene_index": 0, "loop_clips": true, "start_paused": true }
/// ```
///
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Scene to instantiate. `None` uses the document's default scene.
    pub scene_index: Option<usize>,
    /// Loop flag applied to every clip after a load.
    pub loop_clips: bool,
    /// Clips stay paused until toggled.
    pub start_paused: bool,
    /// Slider range advertised to the control surface. The blend itself
    /// accepts any finite value.
    pub weight_range: [f32; 2],
    /// Recompute world matrices after each tick.
    pub update_world_matrices: bool,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            scene_index: None,
            loop_clips: true,
            start_paused: true,
            weight_range: [0.0, 1.0],
            update_world_matrices: true,
        }
    }
}

impl LoaderSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
