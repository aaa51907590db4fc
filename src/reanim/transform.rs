//! Transform composition for reanim parts.
//!
//! A part's transform maps the unit image rectangle to screen space. It is
//! built from the merged frame (scale, skew, position), the entity's signed
//! scale (a negative axis mirrors), the entity rotation and an additive
//! parent offset for attached tracks.
//!
//! Matrix convention: columns are the images of the local x and y axes, so
//! `a, b` is the first column and `c, d` the second; a point maps to
//! `(a*x + c*y + tx, b*x + d*y + ty)`.

use glam::{Affine2, Mat2, Vec2};

use super::merge::{MergedFrame, MergedTrack};

/// Entity-level placement of a reanimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityTransform {
    pub position: Vec2,
    /// Signed scale; a negative component mirrors that axis.
    pub scale: Vec2,
    pub rotation_degrees: f32,
}

impl Default for EntityTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation_degrees: 0.0,
        }
    }
}

fn sign(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

/// Linear part of a frame's transform under the entity scale.
///
/// Without skew this is a plain diagonal. With skew the axes are built from
/// absolute scales, the frame's own sign flips the local axis, and entity
/// mirroring is applied last on the screen axis so skew angles never change
/// sign under mirroring.
pub fn linear_matrix(frame: &MergedFrame, entity_scale: Vec2) -> Mat2 {
    if frame.kx == 0.0 && frame.ky == 0.0 {
        return Mat2::from_diagonal(Vec2::new(frame.sx, frame.sy) * entity_scale);
    }
    let (sin_x, cos_x) = frame.kx.to_radians().sin_cos();
    let (sin_y, cos_y) = frame.ky.to_radians().sin_cos();
    let magnitude = Vec2::new(frame.sx.abs(), frame.sy.abs()) * entity_scale.abs();
    let skewed = Mat2::from_cols(
        Vec2::new(cos_x, sin_x) * magnitude.x,
        Vec2::new(-sin_y, cos_y) * magnitude.y,
    );
    let local_flip = Mat2::from_diagonal(Vec2::new(sign(frame.sx), sign(frame.sy)));
    let mirror = Mat2::from_diagonal(Vec2::new(sign(entity_scale.x), sign(entity_scale.y)));
    mirror * skewed * local_flip
}

/// Full transform of one part.
///
/// The local position (frame position plus `parent_offset`) is scaled by
/// the entity scale. Entity rotation is applied to the position first and
/// then folded into the linear matrix, so parts pivot about the entity
/// origin.
pub fn compose(frame: &MergedFrame, entity: &EntityTransform, parent_offset: Vec2) -> Affine2 {
    let mut linear = linear_matrix(frame, entity.scale);
    let mut offset = (Vec2::new(frame.x, frame.y) + parent_offset) * entity.scale;
    if entity.rotation_degrees != 0.0 {
        let rotation = Mat2::from_angle(entity.rotation_degrees.to_radians());
        offset = rotation * offset;
        linear = rotation * linear;
    }
    Affine2::from_mat2_translation(linear, entity.position + offset)
}

/// Corners of an image of `size` under `transform`: top-left, top-right,
/// bottom-left, bottom-right.
pub fn quad(transform: &Affine2, size: Vec2) -> [Vec2; 4] {
    let origin = transform.translation;
    let m = transform.matrix2;
    [
        origin,
        origin + m * Vec2::new(size.x, 0.0),
        origin + m * Vec2::new(0.0, size.y),
        origin + m * size,
    ]
}

/// The `a, b, c, d` entries of the linear part.
pub fn matrix_entries(transform: &Affine2) -> [f32; 4] {
    let m = transform.matrix2;
    [m.x_axis.x, m.x_axis.y, m.y_axis.x, m.y_axis.y]
}

/// Displacement of `parent` at `frame` from its position at `anchor_frame`.
pub fn attachment_offset(parent: &MergedTrack, frame: usize, anchor_frame: usize) -> Vec2 {
    match (parent.frame(frame), parent.frame(anchor_frame)) {
        (Some(current), Some(anchor)) => {
            Vec2::new(current.x - anchor.x, current.y - anchor.y)
        }
        _ => Vec2::ZERO,
    }
}
