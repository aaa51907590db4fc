//! Loaded, immutable reanim definitions.
//!
//! A [`ReanimDefinition`] is built once from a [`ReanimSource`]: tracks are
//! merged, classified by [`TrackRole`], and every definition track becomes a
//! named animation with its [`VisibilityMap`] and primary [`Window`]. Names
//! are interned to [`TrackId`] / [`AnimationId`] so playback never dispatches
//! on strings.
//!
//! Definitions are shared behind an `Arc` by every entity that plays them.

use std::sync::Arc;

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::format::ReanimSource;
use super::merge::{MergedTrack, merge_tracks};
use super::window::{VisibilityMap, Window};
use crate::error::{ReanimError, Result};

/// Name prefix of tracks that only describe animation windows.
pub const DEFAULT_DEFINITION_PREFIX: &str = "anim_";

/// Index of a track in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TrackId(pub usize);

/// Index of a named animation in a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(pub usize);

/// What a track is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackRole {
    /// Frame markers only; describes an animation window. Never rendered.
    Definition,
    /// Resolves an image on at least one frame. Rendered.
    Visual,
    /// Geometry without images, e.g. a stem other parts hang from.
    Anchor,
}

impl TrackRole {
    /// Tracks that are sampled against an animation's timeline.
    pub fn is_sampled(self) -> bool {
        !matches!(self, TrackRole::Definition)
    }
}

/// A named sub-animation.
#[derive(Debug, Clone)]
pub struct AnimationInfo {
    pub name: Arc<str>,
    pub track: TrackId,
    pub visibility: VisibilityMap,
    /// `None` when every frame of the definition track is hidden.
    pub window: Option<Window>,
}

/// A child track following a parent track's motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub parent: TrackId,
    pub child: TrackId,
}

/// Immutable, merged animation definition.
#[derive(Debug, Clone)]
pub struct ReanimDefinition {
    fps: f32,
    frame_count: usize,
    prefix: String,
    tracks: Vec<MergedTrack>,
    roles: Vec<TrackRole>,
    animations: Vec<AnimationInfo>,
    track_lookup: FxHashMap<Arc<str>, TrackId>,
    animation_lookup: FxHashMap<Arc<str>, AnimationId>,
    attachments: Vec<Attachment>,
}

impl ReanimDefinition {
    /// Build a definition using the default `anim_` prefix.
    pub fn from_source(source: &ReanimSource) -> Result<Self> {
        Self::from_source_with_prefix(source, DEFAULT_DEFINITION_PREFIX)
    }

    /// Build a definition, classifying tracks that start with `prefix` and
    /// carry nothing but frame markers as definition tracks.
    ///
    /// A prefixed track with images or geometry is a drawn part like any
    /// other and does not name an animation.
    pub fn from_source_with_prefix(source: &ReanimSource, prefix: &str) -> Result<Self> {
        let tracks = merge_tracks(&source.tracks);
        let frame_count = tracks.first().map(|t| t.len()).unwrap_or(0);
        if frame_count == 0 {
            return Err(ReanimError::EmptyDefinition);
        }

        let mut roles = Vec::with_capacity(tracks.len());
        let mut animations = Vec::new();
        let mut track_lookup = FxHashMap::default();
        let mut animation_lookup = FxHashMap::default();

        for (index, track) in tracks.iter().enumerate() {
            let id = TrackId(index);
            if track_lookup.contains_key(&track.name) {
                warn!("Duplicate track name '{}', keeping the first one", track.name);
            } else {
                track_lookup.insert(track.name.clone(), id);
            }

            let stripped = track.name.strip_prefix(prefix);
            let marker_only = source.tracks[index].is_marker_only();
            if stripped.is_some() && !marker_only {
                debug!("Track '{}' carries drawing data, not an animation", track.name);
            }
            let role = if let Some(stripped) = stripped.filter(|_| marker_only) {
                let name: Arc<str> = Arc::from(stripped);
                let visibility =
                    VisibilityMap::new(track.frames.iter().map(|f| f.marker()).collect());
                let window = visibility.window(frame_count);
                if window.is_none() {
                    warn!("Animation '{}' has no visible frames", name);
                }
                if animation_lookup.contains_key(&name) {
                    warn!("Duplicate animation '{}', keeping the first one", name);
                } else {
                    animation_lookup.insert(name.clone(), AnimationId(animations.len()));
                }
                animations.push(AnimationInfo {
                    name,
                    track: id,
                    visibility,
                    window,
                });
                TrackRole::Definition
            } else if track.has_image() {
                TrackRole::Visual
            } else {
                TrackRole::Anchor
            };
            roles.push(role);
        }

        Ok(Self {
            fps: source.fps,
            frame_count,
            prefix: prefix.to_string(),
            tracks,
            roles,
            animations,
            track_lookup,
            animation_lookup,
            attachments: Vec::new(),
        })
    }

    /// Make `child` follow `parent`'s motion (builder pattern).
    pub fn with_attachment(mut self, parent: &str, child: &str) -> Result<Self> {
        let parent = self
            .track_id(parent)
            .ok_or_else(|| ReanimError::UnknownTrack(parent.to_string()))?;
        let child = self
            .track_id(child)
            .ok_or_else(|| ReanimError::UnknownTrack(child.to_string()))?;
        self.attachments.retain(|a| a.child != child);
        self.attachments.push(Attachment { parent, child });
        Ok(self)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Number of physical frames of every merged track.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn tracks(&self) -> &[MergedTrack] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> &MergedTrack {
        &self.tracks[id.0]
    }

    pub fn track_role(&self, id: TrackId) -> TrackRole {
        self.roles[id.0]
    }

    pub fn track_id(&self, name: &str) -> Option<TrackId> {
        self.track_lookup.get(name).copied()
    }

    /// Tracks sampled against animation timelines, in declaration order.
    pub fn sampled_tracks(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.roles
            .iter()
            .enumerate()
            .filter(|(_, role)| role.is_sampled())
            .map(|(index, _)| TrackId(index))
    }

    pub fn animations(&self) -> &[AnimationInfo] {
        &self.animations
    }

    pub fn animation(&self, id: AnimationId) -> &AnimationInfo {
        &self.animations[id.0]
    }

    /// Resolve an animation by name, with or without the definition prefix.
    pub fn animation_id(&self, name: &str) -> Option<AnimationId> {
        let stripped = name.strip_prefix(self.prefix.as_str()).unwrap_or(name);
        self.animation_lookup.get(stripped).copied()
    }

    /// Like [`Self::animation_id`] but with a not-found error.
    pub fn require_animation(&self, name: &str) -> Result<AnimationId> {
        self.animation_id(name)
            .ok_or_else(|| ReanimError::AnimationNotFound(name.to_string()))
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reanim::format::{FRAME_HIDDEN, FRAME_VISIBLE, FrameSource, TrackSource};

    fn source() -> ReanimSource {
        ReanimSource {
            fps: 12.0,
            tracks: vec![
                TrackSource::new("anim_shoot")
                    .with_frame(FrameSource::marker(FRAME_VISIBLE))
                    .with_empty_frames(4)
                    .with_frame(FrameSource::marker(FRAME_HIDDEN))
                    .with_empty_frames(2),
                TrackSource::new("anim_idle")
                    .with_frame(FrameSource::marker(FRAME_HIDDEN))
                    .with_empty_frames(4)
                    .with_frame(FrameSource::marker(FRAME_VISIBLE))
                    .with_empty_frames(2),
                TrackSource::new("stem").with_frame(FrameSource::at(0.0, 0.0)),
                TrackSource::new("arm").with_frame(FrameSource::at(1.0, 1.0).with_image("IMAGE_ARM")),
            ],
        }
    }

    #[test]
    fn test_classifies_tracks() {
        let def = ReanimDefinition::from_source(&source()).unwrap();
        assert_eq!(def.frame_count(), 8);
        assert_eq!(def.track_role(TrackId(0)), TrackRole::Definition);
        assert_eq!(def.track_role(TrackId(2)), TrackRole::Anchor);
        assert_eq!(def.track_role(TrackId(3)), TrackRole::Visual);
        let sampled: Vec<TrackId> = def.sampled_tracks().collect();
        assert_eq!(sampled, vec![TrackId(2), TrackId(3)]);
    }

    #[test]
    fn test_animation_windows() {
        let def = ReanimDefinition::from_source(&source()).unwrap();
        let shoot = def.animation(def.animation_id("shoot").unwrap());
        let idle = def.animation(def.animation_id("idle").unwrap());
        assert_eq!(shoot.window, Some(Window::new(0, 4)));
        assert_eq!(idle.window, Some(Window::new(5, 7)));
    }

    #[test]
    fn test_animation_lookup_accepts_prefix() {
        let def = ReanimDefinition::from_source(&source()).unwrap();
        assert_eq!(def.animation_id("anim_idle"), def.animation_id("idle"));
        assert!(def.animation_id("walk").is_none());
        assert!(def.require_animation("walk").unwrap_err().is_not_found());
    }

    #[test]
    fn test_custom_prefix() {
        let mut source = source();
        source.tracks.push(
            TrackSource::new("def_blink")
                .with_frame(FrameSource::marker(FRAME_HIDDEN))
                .with_frame(FrameSource::marker(FRAME_VISIBLE)),
        );
        let def = ReanimDefinition::from_source_with_prefix(&source, "def_").unwrap();
        let blink = def.animation(def.animation_id("blink").unwrap());
        assert_eq!(blink.window, Some(Window::new(1, 7)));
        assert_eq!(def.track_role(TrackId(0)), TrackRole::Anchor);
        assert!(def.animation_id("shoot").is_none());
    }

    #[test]
    fn test_prefixed_track_with_drawing_data_is_a_part() {
        let mut source = source();
        source.tracks.push(
            TrackSource::new("anim_face")
                .with_frame(FrameSource::at(2.0, -6.0).with_image("IMAGE_FACE")),
        );
        source.tracks.push(
            TrackSource::new("anim_stem").with_frame(FrameSource::at(0.0, 4.0)),
        );
        let def = ReanimDefinition::from_source(&source).unwrap();
        let face = def.track_id("anim_face").unwrap();
        let stem = def.track_id("anim_stem").unwrap();
        assert_eq!(def.track_role(face), TrackRole::Visual);
        assert_eq!(def.track_role(stem), TrackRole::Anchor);
        assert!(def.animation_id("face").is_none());
        assert!(def.animation_id("stem").is_none());
        assert_eq!(def.animations().len(), 2);
        assert!(def.sampled_tracks().any(|t| t == face));
    }

    #[test]
    fn test_empty_definition_is_rejected() {
        let empty = ReanimSource {
            fps: 12.0,
            tracks: vec![],
        };
        assert!(matches!(
            ReanimDefinition::from_source(&empty),
            Err(ReanimError::EmptyDefinition)
        ));
    }

    #[test]
    fn test_attachment_requires_known_tracks() {
        let def = ReanimDefinition::from_source(&source()).unwrap();
        let def = def.with_attachment("stem", "arm").unwrap();
        assert_eq!(
            def.attachments(),
            &[Attachment {
                parent: TrackId(2),
                child: TrackId(3)
            }]
        );
        assert!(matches!(
            def.with_attachment("stem", "head"),
            Err(ReanimError::UnknownTrack(name)) if name == "head"
        ));
    }
}
