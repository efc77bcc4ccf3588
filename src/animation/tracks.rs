use crate::animation::values::Interpolatable;
use crate::document::Interpolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl From<Interpolation> for InterpolationMode {
    fn from(value: Interpolation) -> Self {
        match value {
            Interpolation::Linear => Self::Linear,
            Interpolation::Step => Self::Step,
            Interpolation::CubicSpline => Self::CubicSpline,
        }
    }
}

const MAX_SCAN_OFFSET: usize = 3;

/// Last keyframe interval hit by a track; sequential playback resolves the
/// next sample with a short linear scan instead of a binary search.
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Keyframes of one animated property.
///
/// `times` is strictly increasing. For `CubicSpline`, `values` holds
/// `[in_tangent, value, out_tangent]` per keyframe.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    /// Time of the last keyframe, or 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Stateless sampling (binary search).
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        if self.times.is_empty() {
            return T::default();
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        self.sample_at_frame(next_idx.saturating_sub(1), time)
    }

    /// Sampling with a cursor cache, updated in place.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.times.len();
        if len == 0 {
            return T::default();
        }
        if len == 1 {
            return self.value_at(0).cloned().unwrap_or_default();
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        let found = if time >= t_curr {
            // Forward: check [idx, idx + 1) for the next few intervals.
            let mut res = None;
            for idx in i..=i + MAX_SCAN_OFFSET {
                if idx >= len - 1 {
                    res = Some(len - 1);
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward: time < times[i], so the interval is left of i.
            (1..=MAX_SCAN_OFFSET)
                .take_while(|&offset| offset <= i)
                .map(|offset| i - offset)
                .find(|&idx| time >= self.times[idx])
        };

        let index = found.unwrap_or_else(|| {
            // Large jump (scrub or loop wrap): binary search.
            self.times.partition_point(|&t| t <= time).saturating_sub(1)
        });
        cursor.last_index = index;

        self.sample_at_frame(index, time)
    }

    /// Keyframe value, skipping cubic tangents.
    fn value_at(&self, index: usize) -> Option<&T> {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values.get(index * 3 + 1),
            _ => self.values.get(index),
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();

        if index >= len - 1 {
            return self.value_at(len - 1).cloned().unwrap_or_default();
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index).cloned().unwrap_or_default(),
            InterpolationMode::Linear => match (self.value_at(index), self.value_at(next_idx)) {
                (Some(v0), Some(v1)) => T::interpolate_linear(v0, v1, t),
                _ => T::default(),
            },
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = next_idx * 3;
                match (
                    self.values.get(i_prev + 1),
                    self.values.get(i_prev + 2),
                    self.values.get(i_next),
                    self.values.get(i_next + 1),
                ) {
                    (Some(v0), Some(out_tangent0), Some(in_tangent1), Some(v1)) => {
                        T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt)
                    }
                    _ => T::default(),
                }
            }
        }
    }
}
