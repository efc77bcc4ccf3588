use glam::{Quat, Vec3, Vec4};
use smallvec::SmallVec;

/// Values a keyframe track can interpolate.
///
/// Takes operands by reference so heap-backed values (morph weight vectors)
/// do not have to be cloned per sample.
pub trait Interpolatable: Clone + Default {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;

    /// Cubic Hermite spline; tangents are scaled by the keyframe delta `dt`.
    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self;
}

/// Hermite basis `(s0, s1, s2, s3)` for `p0, m0, p1, m1`.
#[inline]
fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;
    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;
    (s0, s1, s2, s3)
}

/// One keyframe of a morph-weight track: a weight per morph target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MorphWeightData {
    pub weights: SmallVec<[f32; 8]>,
}

impl MorphWeightData {
    /// Zeroed weights for `target_count` targets.
    #[must_use]
    pub fn allocate(target_count: usize) -> Self {
        Self {
            weights: SmallVec::from_elem(0.0, target_count),
        }
    }

    #[must_use]
    pub fn from_slice(weights: &[f32]) -> Self {
        Self {
            weights: SmallVec::from_slice(weights),
        }
    }
}

impl Interpolatable for MorphWeightData {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        Self {
            weights: start
                .weights
                .iter()
                .zip(&end.weights)
                .map(|(a, b)| a + (b - a) * t)
                .collect(),
        }
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        let weights = (0..v0.weights.len().min(v1.weights.len()))
            .map(|i| {
                let m0 = out_tangent0.weights.get(i).copied().unwrap_or(0.0) * dt;
                let m1 = in_tangent1.weights.get(i).copied().unwrap_or(0.0) * dt;
                s0 * v0.weights[i] + s1 * m0 + s2 * v1.weights[i] + s3 * m1
            })
            .collect();
        Self { weights }
    }
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        s0 * v0 + s1 * out_tangent0 * dt + s2 * v1 + s3 * in_tangent1 * dt
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.lerp(*end, t)
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        *v0 * s0 + *out_tangent0 * (s1 * dt) + *v1 * s2 + *in_tangent1 * (s3 * dt)
    }
}

impl Interpolatable for Quat {
    /// Shortest-path slerp (glam flips the end quaternion when the dot is negative).
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.slerp(*end, t)
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        let result = Vec4::from(*v0) * s0
            + Vec4::from(*out_tangent0) * (s1 * dt)
            + Vec4::from(*v1) * s2
            + Vec4::from(*in_tangent1) * (s3 * dt);

        Quat::from_vec4(result).normalize()
    }
}
