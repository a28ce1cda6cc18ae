//! Cascade split distances and light-space helpers

use crate::foundation::math::{Mat4, Vec3};

use super::{LightBasis, MAX_CASCADES};

/// Slack subtracted before rounding up so an already snapped center stays put
const SNAP_TOLERANCE: f32 = 1e-3;

/// Split distances of `cascade_count` cascades over `[near, far]`
///
/// Entry `i` in `0..=cascade_count` blends the uniform split
/// `near + (far - near) * i / n` with the logarithmic split `near * (far / near)^(i / n)`
/// as `uniform * ratio + log * (1 - ratio)`. Entries past `cascade_count` are zero.
///
/// `cascade_count` is clamped into `1..=MAX_CASCADES`.
pub fn compute_split_distances(near: f32, far: f32, cascade_count: usize, ratio: f32) -> [f32; MAX_CASCADES + 1] {
    let count = cascade_count.clamp(1, MAX_CASCADES);
    let mut splits = [0.0; MAX_CASCADES + 1];

    for (i, split) in splits.iter_mut().enumerate().take(count + 1) {
        let t = i as f32 / count as f32;
        let uniform = near + (far - near) * t;
        let logarithmic = near * (far / near).powf(t);
        *split = uniform * ratio + logarithmic * (1.0 - ratio);
    }

    // Pin the ends against powf rounding
    splits[0] = near;
    splits[count] = far;
    splits
}

/// Snap `center` to the shadow-map texel grid of a sphere of `radius`
///
/// The up and side coordinates are rounded up to multiples of
/// `radius / resolution`; the coordinate along the light direction is kept.
pub fn snap_to_texel_grid(center: Vec3, basis: &LightBasis, radius: f32, resolution: u32) -> Vec3 {
    let texel = radius / resolution.max(1) as f32;
    if texel.is_nan() || texel <= f32::EPSILON {
        return center;
    }

    let snap = |length: f32| (length / texel - SNAP_TOLERANCE).ceil() * texel;
    let up = snap(center.dot(&basis.up));
    let side = snap(center.dot(&basis.side));
    let along = center.dot(&basis.direction);

    basis.up * up + basis.side * side + basis.direction * along
}

/// Maps clip space `[-1, 1]²` to texture space `[0, 1]²`, depth unchanged
pub fn texture_bias_matrix() -> Mat4 {
    Mat4::new(
        0.5, 0.0, 0.0, 0.5, //
        0.0, 0.5, 0.0, 0.5, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}
