use std::sync::Arc;

use glam::Quat;

use crate::animation::{
    AnimationAction, AnimationClip, InterpolationMode, KeyframeTrack, MorphWeightData,
    PropertyBinding, TargetPath, Track, TrackData, TrackMeta,
};
use crate::document::{AccessorData, AnimationDesc, ChannelDesc, Document, TargetProperty};
use crate::errors::PartialBindError;
use crate::loader::{BuiltScene, LoadReport};
use crate::scene::{MeshInstance, NodeHandle};

/// Compiles every animation of `document` against the built scene.
///
/// Channels that fail are skipped and reported; an animation keeps its
/// remaining channels. An animation left with no channel produces no clip.
/// Returned actions are paused and non-looping, in document order.
pub fn compile_animations(
    document: &Document,
    built: &BuiltScene,
    report: &mut LoadReport,
) -> Vec<AnimationAction> {
    let mut actions = Vec::with_capacity(document.animations.len());

    for (animation_index, animation) in document.animations.iter().enumerate() {
        let mut tracks = Vec::with_capacity(animation.channels.len());
        let mut bindings = Vec::with_capacity(animation.channels.len());

        for (channel_index, channel) in animation.channels.iter().enumerate() {
            let ctx = ChannelContext {
                document,
                built,
                animation,
                animation_index,
                channel_index,
            };
            match ctx.compile(channel) {
                Ok((track, node_handle)) => {
                    bindings.push(PropertyBinding {
                        track_index: tracks.len(),
                        node_handle,
                        target: track.meta.target,
                    });
                    tracks.push(track);
                }
                Err(err) => report.push(err),
            }
        }

        if tracks.is_empty() {
            report.push(PartialBindError::EmptyAnimation {
                animation: animation_index,
            });
            continue;
        }

        let name = animation
            .name
            .clone()
            .unwrap_or_else(|| format!("anim_{animation_index}"));
        let clip = AnimationClip::new(name, tracks);
        log::debug!(
            "Compiled clip '{}': {} tracks, {:.3}s",
            clip.name,
            clip.tracks.len(),
            clip.duration
        );

        actions.push(AnimationAction::new(Arc::new(clip)).with_bindings(bindings));
    }

    actions
}

struct ChannelContext<'a> {
    document: &'a Document,
    built: &'a BuiltScene,
    animation: &'a AnimationDesc,
    animation_index: usize,
    channel_index: usize,
}

impl ChannelContext<'_> {
    fn error(&self, reason: impl Into<String>) -> PartialBindError {
        PartialBindError::ChannelData {
            animation: self.animation_index,
            channel: self.channel_index,
            reason: reason.into(),
        }
    }

    fn accessor(&self, index: usize) -> Result<&AccessorData, PartialBindError> {
        self.document
            .accessors
            .get(index)
            .map(|a| &a.data)
            .ok_or_else(|| self.error(format!("accessor {index} out of range")))
    }

    fn compile(&self, channel: &ChannelDesc) -> Result<(Track, NodeHandle), PartialBindError> {
        let node_handle = self.built.node_map.get(channel.target_node).ok_or(
            PartialBindError::UnresolvedChannelTarget {
                animation: self.animation_index,
                channel: self.channel_index,
                node: channel.target_node,
            },
        )?;

        let sampler = self
            .animation
            .samplers
            .get(channel.sampler)
            .ok_or_else(|| self.error(format!("sampler {} out of range", channel.sampler)))?;

        let times = match self.accessor(sampler.input)? {
            AccessorData::Scalar(times) => times.clone(),
            other => {
                return Err(self.error(format!(
                    "keyframe times must be SCALAR, found {}",
                    other.kind()
                )));
            }
        };
        if times.is_empty() {
            return Err(self.error("no keyframes"));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(self.error("non-finite keyframe time"));
        }

        let interpolation = InterpolationMode::from(sampler.interpolation);
        let stride = if interpolation == InterpolationMode::CubicSpline {
            3
        } else {
            1
        };
        let expected = times.len() * stride;
        let output = self.accessor(sampler.output)?;

        let data = match (channel.property, output) {
            (TargetProperty::Translation | TargetProperty::Scale, AccessorData::Vec3(values)) => {
                self.check_len(values.len(), expected)?;
                let (times, values) = sort_keyframes(times, values.clone(), stride);
                TrackData::Vector3(KeyframeTrack::new(times, values, interpolation))
            }
            (TargetProperty::Rotation, AccessorData::Vec4(values)) => {
                self.check_len(values.len(), expected)?;
                let values = values
                    .iter()
                    .map(|v| {
                        let q = Quat::from_vec4(*v);
                        // Cubic tangents are not unit quaternions.
                        if stride == 1 { q.normalize() } else { q }
                    })
                    .collect();
                let (times, values) = sort_keyframes(times, values, stride);
                TrackData::Quaternion(KeyframeTrack::new(times, values, interpolation))
            }
            (TargetProperty::Weights, AccessorData::Scalar(values)) => {
                let target_count = self
                    .built
                    .graph
                    .mesh_of(node_handle)
                    .map_or(0, MeshInstance::morph_target_count);
                if target_count == 0 {
                    return Err(self.error("target node has no morph targets"));
                }
                self.check_len(values.len(), expected * target_count)?;
                let values = values
                    .chunks_exact(target_count)
                    .map(MorphWeightData::from_slice)
                    .collect();
                let (times, values) = sort_keyframes(times, values, stride);
                TrackData::MorphWeights(KeyframeTrack::new(times, values, interpolation))
            }
            (property, other) => {
                return Err(self.error(format!(
                    "{property:?} channel cannot use {} output",
                    other.kind()
                )));
            }
        };

        let track = Track {
            meta: TrackMeta {
                node_index: channel.target_node,
                target: TargetPath::from(channel.property),
            },
            data,
        };
        Ok((track, node_handle))
    }

    fn check_len(&self, found: usize, expected: usize) -> Result<(), PartialBindError> {
        if found == expected {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {expected} output values, found {found}"
            )))
        }
    }
}

/// Orders keyframes by time, keeping the first of equal times.
///
/// `stride` values belong to each keyframe (3 for cubic splines).
fn sort_keyframes<T: Clone>(times: Vec<f32>, values: Vec<T>, stride: usize) -> (Vec<f32>, Vec<T>) {
    if times.windows(2).all(|w| w[0] < w[1]) {
        return (times, values);
    }
    log::warn!("Keyframe times are not strictly increasing, re-sorting");

    let mut order: Vec<usize> = (0..times.len()).collect();
    order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));
    order.dedup_by(|later, earlier| times[*later].total_cmp(&times[*earlier]).is_eq());

    let sorted_times = order.iter().map(|&i| times[i]).collect();
    let sorted_values = order
        .iter()
        .flat_map(|&i| values[i * stride..(i + 1) * stride].iter().cloned())
        .collect();
    (sorted_times, sorted_values)
}
