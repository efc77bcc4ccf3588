use std::sync::Arc;

use crate::animation::{
    binding::PropertyBinding,
    clip::{AnimationClip, TrackData},
    tracks::KeyframeCursor,
    values::MorphWeightData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Clamp at the end and pause.
    #[default]
    Once,
    /// Wrap into `[0, duration)`.
    Loop,
    PingPong,
}

/// Play state of one clip: time, loop mode, pause flag, and the clip's
/// tracks bound to scene nodes.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    /// New actions start paused and non-looping.
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            loop_mode: LoopMode::Once,
            paused: true,
            enabled: true,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn with_bindings(mut self, bindings: Vec<PropertyBinding>) -> Self {
        self.bindings = bindings;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.clip.name
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.enabled && !self.paused
    }

    #[must_use]
    pub fn is_looping(&self) -> bool {
        self.loop_mode == LoopMode::Loop
    }

    /// `true` maps to [`LoopMode::Loop`], `false` to [`LoopMode::Once`].
    pub fn set_loop(&mut self, looping: bool) {
        self.loop_mode = if looping { LoopMode::Loop } else { LoopMode::Once };
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Flips Paused/Playing and returns the new playing state.
    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        !self.paused
    }

    /// Rewinds to the start without changing the pause flag.
    pub fn reset(&mut self) {
        self.time = if self.time_scale < 0.0 { self.clip.duration } else { 0.0 };
        for cursor in &mut self.track_cursors {
            cursor.last_index = 0;
        }
    }

    /// Advances time by `dt * time_scale`.
    ///
    /// Returns `true` when the clip moved and must be evaluated this frame.
    /// Paused clips, zero or non-finite deltas leave the state untouched.
    /// A `Once` clip that runs past its end lands exactly on the end time,
    /// reports `true` for that final evaluation, and pauses itself.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.paused || !self.enabled {
            return false;
        }

        let delta = dt * self.time_scale;
        if !delta.is_finite() || delta == 0.0 {
            return false;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            // Single-keyframe clip: one evaluation is enough.
            self.time = 0.0;
            if self.loop_mode == LoopMode::Once {
                self.paused = true;
            }
            return true;
        }

        self.time += delta;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time <= 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                // rem_euclid keeps reverse playback in range too.
                self.time = self.time.rem_euclid(duration);
                if self.time >= duration {
                    self.time = 0.0;
                }
            }
            LoopMode::PingPong => {
                let double_duration = duration * 2.0;
                let mut t = self.time.rem_euclid(double_duration);
                if t > duration {
                    t = double_duration - t;
                }
                self.time = t;
            }
        }

        true
    }

    /// Samples track `track_index` at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        Some(match &track.data {
            TrackData::Vector3(t) => TrackValue::Vector3(t.sample_with_cursor(self.time, cursor)),
            TrackData::Quaternion(t) => {
                TrackValue::Quaternion(t.sample_with_cursor(self.time, cursor))
            }
            TrackData::MorphWeights(t) => {
                TrackValue::MorphWeights(t.sample_with_cursor(self.time, cursor))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackValue {
    Vector3(glam::Vec3),
    Quaternion(glam::Quat),
    MorphWeights(MorphWeightData),
}
