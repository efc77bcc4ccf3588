//! Control-surface bindings.
//!
//! The viewer does not own widgets. It describes the controls a UI should
//! show for the loaded scene; every descriptor carries the single action its
//! handler fires, capturing only a clip index or a (group, target) slot.

use crate::manager::LoadedScene;
use crate::settings::LoaderSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ToggleClip(usize),
    SetMorphWeight { group: usize, target: usize },
}

impl ControlAction {
    /// Event fired by the control's handler. `value` is ignored by toggles.
    #[must_use]
    pub fn fire(self, value: f32) -> ControlEvent {
        match self {
            ControlAction::ToggleClip(clip) => ControlEvent::ToggleClip { clip },
            ControlAction::SetMorphWeight { group, target } => ControlEvent::SetMorphWeight {
                group,
                target,
                value,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    ToggleClip { clip: usize },
    SetMorphWeight { group: usize, target: usize, value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlKind {
    Toggle { checked: bool },
    Slider { min: f32, max: f32, value: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec {
    pub label: String,
    pub kind: ControlKind,
    pub action: ControlAction,
}

/// One toggle per clip (checked when playing), then one slider per morph slot.
///
/// Slider labels are the target names, prefixed with the mesh name when the
/// scene has more than one morph group.
#[must_use]
pub fn build_controls(scene: &LoadedScene, settings: &LoaderSettings) -> Vec<ControlSpec> {
    let mut controls = Vec::new();

    for (index, action) in scene.player.actions().iter().enumerate() {
        controls.push(ControlSpec {
            label: action.name().to_string(),
            kind: ControlKind::Toggle {
                checked: action.is_playing(),
            },
            action: ControlAction::ToggleClip(index),
        });
    }

    let [min, max] = settings.weight_range;
    let groups = scene.morphs.groups();
    for (group_index, group) in groups.iter().enumerate() {
        for (target, &value) in group.weights().iter().enumerate() {
            let label = if groups.len() > 1 {
                format!("{}/{}", group.name, group.target_label(target))
            } else {
                group.target_label(target)
            };
            controls.push(ControlSpec {
                label,
                kind: ControlKind::Slider { min, max, value },
                action: ControlAction::SetMorphWeight {
                    group: group_index,
                    target,
                },
            });
        }
    }

    controls
}
