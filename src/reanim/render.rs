//! Render data assembly.
//!
//! [`assemble`] reads a [`Reanimation`] and produces the ordered list of
//! [`RenderPart`]s an external rasterizer draws: one per visible track with a
//! resolvable image, in declaration order. It never mutates anything.

use std::sync::Arc;

use arrayvec::ArrayVec;
use glam::{Affine2, Vec2};
use log::debug;
use serde::Serialize;

use super::definition::{TrackId, TrackRole};
use super::transform::{EntityTransform, compose, quad};
use crate::components::reanimation::Reanimation;
use crate::components::renderfx::{MAX_GLOW_LAYERS, RenderEffects, Rgba};
use crate::resources::imageregistry::{ImageHandle, ImageRegistry};
use crate::resources::reanimconfig::EffectSettings;

/// One drawable image of a reanimated entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPart {
    pub track: TrackId,
    pub track_name: Arc<str>,
    /// Image reference after overrides.
    pub image: Arc<str>,
    pub handle: ImageHandle,
    /// Maps the unit image rectangle (in pixels) to screen space.
    pub transform: Affine2,
    /// Top-left, top-right, bottom-left, bottom-right.
    pub quad: [Vec2; 4],
    pub opacity: f32,
    /// Track index; larger draws later.
    pub z_order: usize,
    /// Color multiplier.
    pub color: Rgba,
    /// Additive brightness.
    pub brightness: f32,
    pub glow_layers: ArrayVec<Rgba, MAX_GLOW_LAYERS>,
}

/// Color fields shared by every part of one entity.
struct PartStyle {
    color: Rgba,
    alpha: f32,
    brightness: f32,
    glow_layers: ArrayVec<Rgba, MAX_GLOW_LAYERS>,
}

impl PartStyle {
    fn new(effects: Option<&RenderEffects>, highlighted: bool, settings: &EffectSettings) -> Self {
        let Some(fx) = effects else {
            return Self {
                color: Rgba::WHITE,
                alpha: 1.0,
                brightness: if highlighted {
                    settings.highlight_brightness
                } else {
                    0.0
                },
                glow_layers: ArrayVec::new(),
            };
        };
        let flash = fx.flash * settings.flash_scale;
        let highlight = if highlighted || fx.hovered {
            settings.highlight_brightness
        } else {
            0.0
        };
        let color = if fx.hazard {
            fx.tint.multiply(settings.hazard_tint)
        } else {
            fx.tint
        };
        Self {
            color,
            alpha: fx.alpha,
            brightness: flash.max(highlight),
            glow_layers: fx.glow_layers.clone(),
        }
    }
}

/// Build the render parts of one entity.
///
/// `highlighted` is whether the entity is the current hover target. Tracks
/// are skipped, never reordered, when they are definition tracks, hidden per
/// entity, on a hidden frame, image-less, or reference an image `images`
/// does not know yet.
pub fn assemble(
    state: &Reanimation,
    images: &ImageRegistry,
    entity: &EntityTransform,
    effects: Option<&RenderEffects>,
    highlighted: bool,
    settings: &EffectSettings,
) -> Vec<RenderPart> {
    let definition = state.definition();
    let style = PartStyle::new(effects, highlighted, settings);
    let mut parts = Vec::new();

    for (index, track) in definition.tracks().iter().enumerate() {
        let id = TrackId(index);
        if definition.track_role(id) == TrackRole::Definition || state.is_track_hidden(id) {
            continue;
        }
        let Some(frame) = state.track_frame(id).and_then(|f| track.frame(f)) else {
            continue;
        };
        if frame.hidden {
            continue;
        }
        let Some(image) = state.image_override(id).or(frame.image.as_ref()) else {
            continue;
        };
        let Some(handle) = images.get(image) else {
            debug!(
                "Reanim '{}': no image '{}' for track '{}'",
                state.reanim_key, image, track.name
            );
            continue;
        };

        let transform = compose(frame, entity, state.parent_offset(id));
        parts.push(RenderPart {
            track: id,
            track_name: track.name.clone(),
            image: image.clone(),
            handle,
            quad: quad(&transform, handle.size()),
            transform,
            opacity: frame.alpha * style.alpha,
            z_order: index,
            color: style.color,
            brightness: style.brightness,
            glow_layers: style.glow_layers.clone(),
        });
    }
    parts
}

/// Offset from `origin` to the center of the parts' bounding box.
pub fn center_offset(parts: &[RenderPart], origin: Vec2) -> Vec2 {
    let mut corners = parts.iter().flat_map(|p| p.quad);
    let Some(first) = corners.next() else {
        return Vec2::ZERO;
    };
    let (min, max) = corners.fold((first, first), |(min, max), c| (min.min(c), max.max(c)));
    (min + max) * 0.5 - origin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reanim::definition::ReanimDefinition;
    use crate::reanim::format::{FRAME_HIDDEN, FrameSource, ReanimSource, TrackSource};

    fn reanimation() -> Reanimation {
        let source = ReanimSource {
            fps: 10.0,
            tracks: vec![
                TrackSource::new("anim_idle")
                    .with_frame(FrameSource::marker(0))
                    .with_empty_frames(1),
                TrackSource::new("backleaf")
                    .with_frame(FrameSource::at(0.0, 0.0).with_image("IMAGE_LEAF")),
                TrackSource::new("stem").with_frame(FrameSource::at(5.0, 5.0)),
                TrackSource::new("head")
                    .with_frame(FrameSource::at(10.0, 0.0).with_image("IMAGE_HEAD"))
                    .with_frame(FrameSource::marker(FRAME_HIDDEN)),
                TrackSource::new("eye")
                    .with_frame(FrameSource::at(12.0, 2.0).with_image("IMAGE_EYE").with_alpha(0.5)),
            ],
        };
        let definition = ReanimDefinition::from_source(&source).unwrap();
        let mut r = Reanimation::new("plant", std::sync::Arc::new(definition));
        r.play("idle").unwrap();
        r
    }

    fn images() -> ImageRegistry {
        ImageRegistry::new()
            .with_image("IMAGE_LEAF", ImageHandle::new(1, 20.0, 10.0))
            .with_image("IMAGE_HEAD", ImageHandle::new(2, 8.0, 8.0))
            .with_image("IMAGE_EYE", ImageHandle::new(3, 2.0, 2.0))
    }

    fn names(parts: &[RenderPart]) -> Vec<&str> {
        parts.iter().map(|p| p.track_name.as_ref()).collect()
    }

    #[test]
    fn test_parts_in_declaration_order() {
        let r = reanimation();
        let parts = assemble(
            &r,
            &images(),
            &EntityTransform::default(),
            None,
            false,
            &EffectSettings::default(),
        );
        // definition and image-less tracks never render
        assert_eq!(names(&parts), vec!["backleaf", "head", "eye"]);
        assert_eq!(
            parts.iter().map(|p| p.z_order).collect::<Vec<_>>(),
            vec![1, 3, 4]
        );
        assert_eq!(parts[2].opacity, 0.5);
        assert_eq!(parts[1].transform.translation, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_hidden_frame_is_skipped() {
        let mut r = reanimation();
        r.advance(0.1);
        let parts = assemble(
            &r,
            &images(),
            &EntityTransform::default(),
            None,
            false,
            &EffectSettings::default(),
        );
        assert_eq!(names(&parts), vec!["backleaf", "eye"]);
    }

    #[test]
    fn test_missing_image_drops_only_that_part() {
        let r = reanimation();
        let mut registry = images();
        registry.remove("IMAGE_HEAD");
        let parts = assemble(
            &r,
            &registry,
            &EntityTransform::default(),
            None,
            false,
            &EffectSettings::default(),
        );
        assert_eq!(names(&parts), vec!["backleaf", "eye"]);
    }

    #[test]
    fn test_override_and_render_groups() {
        let mut r = reanimation();
        r.set_image_override("head", "IMAGE_EYE").unwrap();
        r.set_track_hidden("backleaf", true).unwrap();
        let parts = assemble(
            &r,
            &images(),
            &EntityTransform::default(),
            None,
            false,
            &EffectSettings::default(),
        );
        assert_eq!(names(&parts), vec!["head", "eye"]);
        assert_eq!(parts[0].image.as_ref(), "IMAGE_EYE");
        assert_eq!(parts[0].handle.id, 3);
    }

    #[test]
    fn test_effects_feed_color_fields() {
        let r = reanimation();
        let settings = EffectSettings::default();
        let mut fx = RenderEffects::default().with_flash(0.6).with_hazard(true);
        fx.alpha = 0.5;
        fx.add_glow(Rgba::new(0, 255, 0, 128));
        let parts = assemble(
            &r,
            &images(),
            &EntityTransform::default(),
            Some(&fx),
            true,
            &settings,
        );
        let eye = &parts[2];
        assert_eq!(eye.brightness, 0.6);
        assert_eq!(eye.color, Rgba::WHITE.multiply(settings.hazard_tint));
        assert_eq!(eye.opacity, 0.25);
        assert_eq!(eye.glow_layers.len(), 1);

        let calm = RenderEffects::default();
        let parts = assemble(
            &r,
            &images(),
            &EntityTransform::default(),
            Some(&calm),
            true,
            &settings,
        );
        assert_eq!(parts[0].brightness, settings.highlight_brightness);
        assert_eq!(parts[0].color, Rgba::WHITE);
    }

    #[test]
    fn test_prefixed_image_track_is_drawn() {
        let source = ReanimSource {
            fps: 10.0,
            tracks: vec![
                TrackSource::new("anim_idle").with_frame(FrameSource::marker(0)),
                TrackSource::new("body")
                    .with_frame(FrameSource::at(0.0, 0.0).with_image("IMAGE_BODY")),
                TrackSource::new("anim_face")
                    .with_frame(FrameSource::at(4.0, -8.0).with_image("IMAGE_FACE")),
            ],
        };
        let definition = ReanimDefinition::from_source(&source).unwrap();
        let mut r = Reanimation::new("zombie", std::sync::Arc::new(definition));
        r.play("idle").unwrap();
        let registry = ImageRegistry::new()
            .with_image("IMAGE_BODY", ImageHandle::new(1, 10.0, 10.0))
            .with_image("IMAGE_FACE", ImageHandle::new(2, 4.0, 4.0));
        let parts = assemble(
            &r,
            &registry,
            &EntityTransform::default(),
            None,
            false,
            &EffectSettings::default(),
        );
        assert_eq!(names(&parts), vec!["body", "anim_face"]);
        assert_eq!(parts[1].transform.translation, Vec2::new(4.0, -8.0));
    }

    #[test]
    fn test_center_offset() {
        let r = reanimation();
        let entity = EntityTransform {
            position: Vec2::new(100.0, 100.0),
            ..EntityTransform::default()
        };
        let parts = assemble(
            &r,
            &images(),
            &entity,
            None,
            false,
            &EffectSettings::default(),
        );
        // leaf spans (100..120, 100..110), head (110..118, 100..108), eye
        // (112..114, 102..104)
        assert_eq!(center_offset(&parts, entity.position), Vec2::new(10.0, 5.0));
        assert_eq!(center_offset(&[], entity.position), Vec2::ZERO);
    }
}
