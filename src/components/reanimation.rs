//! Per-entity reanimation playback state.
//!
//! A [`Reanimation`] points at a shared [`ReanimDefinition`] and tracks
//! which named animations are playing, where each one is in its window,
//! which animation drives which track, and the cosmetic per-entity tweaks
//! (image overrides, hidden tracks).
//!
//! # Playback
//!
//! Every active animation owns a [`Cursor`] over its window. Ticks advance
//! all cursors together at the playback rate. A looping cursor wraps to the
//! window start after its last frame; a non-looping cursor freezes on it.
//! Once every cursor is frozen the phase becomes [`PlaybackPhase::Finished`].
//!
//! All mutation happens in [`Reanimation::advance`] and the `play*` / `set*`
//! methods. Render assembly only reads.
//!
//! # Related
//!
//! - [`crate::systems::reanimation`] – tick system and entity-level API
//! - [`crate::reanim::render`] – turns this state into render parts

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use glam::Vec2;
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::error::{ReanimError, Result};
use crate::reanim::binding::{TrackBindings, infer_bindings};
use crate::reanim::definition::{AnimationId, ReanimDefinition, TrackId};
use crate::reanim::transform::attachment_offset;
use crate::reanim::window::{VisibilityMap, Window};

/// Default cap on frames advanced by a single tick.
pub const DEFAULT_MAX_CATCH_UP_FRAMES: u32 = 8;

/// Playback lifecycle of a reanimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// Nothing has been played yet.
    #[default]
    Idle,
    Playing,
    /// Non-looping playback reached the last frame of every window.
    Finished,
}

/// Position of one active animation within its window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// `None` for raw timeline playback.
    pub animation: Option<AnimationId>,
    /// `None` when the animation has no visible frames.
    pub window: Option<Window>,
    /// Current physical frame.
    pub frame: usize,
    /// Frozen on the last frame of a non-looping window.
    pub done: bool,
}

impl Cursor {
    fn start(animation: Option<AnimationId>, window: Option<Window>) -> Self {
        Self {
            animation,
            window,
            frame: window.map(|w| w.first).unwrap_or(0),
            done: window.is_none(),
        }
    }

    /// Advance one physical frame.
    fn step(&mut self, looping: bool) {
        let Some(window) = self.window else {
            return;
        };
        if self.done {
            return;
        }
        if self.frame < window.last {
            self.frame += 1;
            if !looping && self.frame == window.last {
                self.done = true;
            }
        } else if looping {
            self.frame = window.first;
        } else {
            self.done = true;
        }
    }
}

/// Reanimation playback state component.
#[derive(Component, Debug, Clone)]
pub struct Reanimation {
    /// Key of the definition in [`crate::resources::reanimstore::ReanimStore`].
    pub reanim_key: Arc<str>,
    definition: Arc<ReanimDefinition>,
    phase: PlaybackPhase,
    cursors: SmallVec<[Cursor; 2]>,
    /// Seconds accumulated toward the next frame.
    elapsed_time: f32,
    /// Frames per second.
    rate: f32,
    looping: bool,
    max_catch_up_frames: u32,
    bindings: TrackBindings,
    image_overrides: FxHashMap<TrackId, Arc<str>>,
    hidden_tracks: FxHashSet<TrackId>,
    parent_offsets: Vec<Vec2>,
}

impl Reanimation {
    pub fn new(reanim_key: impl Into<Arc<str>>, definition: Arc<ReanimDefinition>) -> Self {
        let rate = definition.fps();
        let track_count = definition.tracks().len();
        Self {
            reanim_key: reanim_key.into(),
            definition,
            phase: PlaybackPhase::Idle,
            cursors: SmallVec::new(),
            elapsed_time: 0.0,
            rate,
            looping: true,
            max_catch_up_frames: DEFAULT_MAX_CATCH_UP_FRAMES,
            bindings: TrackBindings::default(),
            image_overrides: FxHashMap::default(),
            hidden_tracks: FxHashSet::default(),
            parent_offsets: vec![Vec2::ZERO; track_count],
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_max_catch_up_frames(mut self, frames: u32) -> Self {
        self.max_catch_up_frames = frames.max(1);
        self
    }

    pub fn definition(&self) -> &Arc<ReanimDefinition> {
        &self.definition
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == PlaybackPhase::Finished
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Takes effect from the next tick; a finished playback stays finished.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    /// Physical frame of the first active animation.
    pub fn current_frame(&self) -> Option<usize> {
        self.cursors.first().map(|c| c.frame)
    }

    /// Logical frame of the first active animation, counting only its
    /// visible frames. `None` while the cursor sits on a hidden frame.
    pub fn current_logical_frame(&self) -> Option<usize> {
        let cursor = self.cursors.first()?;
        match cursor.animation {
            Some(id) => self
                .definition
                .animation(id)
                .visibility
                .logical_frame(cursor.frame),
            None => Some(cursor.frame),
        }
    }

    /// Names of the active animations in play order. Raw timeline playback
    /// has no name.
    pub fn active_animations(&self) -> Vec<Option<Arc<str>>> {
        self.cursors
            .iter()
            .map(|c| c.animation.map(|id| self.definition.animation(id).name.clone()))
            .collect()
    }

    /// Play one named animation from its window start.
    ///
    /// Fails with a not-found error, leaving state untouched, when the
    /// definition has no such animation.
    pub fn play(&mut self, name: &str) -> Result<()> {
        let id = self.definition.require_animation(name)?;
        self.start(&[Some(id)]);
        Ok(())
    }

    /// Play several animations at once and infer which one drives each
    /// track. Every name is resolved before anything changes.
    pub fn play_concurrent(&mut self, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return Err(ReanimError::AnimationNotFound(String::new()));
        }
        let ids = names
            .iter()
            .map(|name| self.definition.require_animation(name).map(Some))
            .collect::<Result<SmallVec<[Option<AnimationId>; 2]>>>()?;
        self.start(&ids);
        Ok(())
    }

    /// Play the whole merged timeline, ignoring animation windows.
    pub fn play_timeline(&mut self) {
        self.start(&[None]);
    }

    fn window_of(&self, animation: Option<AnimationId>) -> Option<Window> {
        match animation {
            Some(id) => self.definition.animation(id).window,
            None => VisibilityMap::raw().window(self.definition.frame_count()),
        }
    }

    fn start(&mut self, animations: &[Option<AnimationId>]) {
        self.cursors = animations
            .iter()
            .map(|a| Cursor::start(*a, self.window_of(*a)))
            .collect();
        if self.cursors.iter().all(|c| c.window.is_none()) {
            warn!(
                "Reanim '{}': nothing visible in {:?}",
                self.reanim_key,
                self.active_animations()
            );
        }
        self.elapsed_time = 0.0;
        self.phase = PlaybackPhase::Playing;
        if self.cursors.len() >= 2 {
            let windows: SmallVec<[Option<Window>; 2]> =
                self.cursors.iter().map(|c| c.window).collect();
            self.bindings = infer_bindings(&self.definition, &windows);
        } else {
            self.bindings.clear();
        }
        self.refresh_parent_offsets();
    }

    /// Jump every active animation to `logical` within its window.
    ///
    /// Fails with a not-found error, leaving state untouched, when any
    /// window is shorter than `logical + 1` frames.
    pub fn seek(&mut self, logical: usize) -> Result<()> {
        let mut frames: SmallVec<[usize; 2]> = SmallVec::new();
        for cursor in &self.cursors {
            let physical = match cursor.animation {
                Some(id) => {
                    let info = self.definition.animation(id);
                    info.visibility
                        .physical_frame(logical)
                        .filter(|p| info.window.is_some_and(|w| w.contains(*p)))
                }
                None => (logical < self.definition.frame_count()).then_some(logical),
            };
            let Some(physical) = physical else {
                let animation = cursor
                    .animation
                    .map(|id| self.definition.animation(id).name.to_string())
                    .unwrap_or_default();
                return Err(ReanimError::FrameNotFound {
                    animation,
                    frame: logical,
                });
            };
            frames.push(physical);
        }
        let looping = self.looping;
        for (cursor, frame) in self.cursors.iter_mut().zip(frames) {
            cursor.frame = frame;
            cursor.done = !looping && cursor.window.is_some_and(|w| frame >= w.last);
        }
        self.elapsed_time = 0.0;
        self.phase = PlaybackPhase::Playing;
        self.refresh_parent_offsets();
        Ok(())
    }

    /// Advance playback by `dt` seconds.
    ///
    /// Returns `true` on the tick that finishes a non-looping playback.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.phase != PlaybackPhase::Playing || self.rate <= 0.0 {
            return false;
        }
        let frame_duration = 1.0 / self.rate;
        self.elapsed_time += dt;

        let mut steps = 0;
        while self.elapsed_time >= frame_duration {
            if steps == self.max_catch_up_frames {
                self.elapsed_time %= frame_duration;
                break;
            }
            self.elapsed_time -= frame_duration;
            steps += 1;
            let looping = self.looping;
            for cursor in self.cursors.iter_mut() {
                cursor.step(looping);
            }
            if !looping && self.cursors.iter().all(|c| c.done) {
                self.phase = PlaybackPhase::Finished;
                self.elapsed_time = 0.0;
                break;
            }
        }

        if steps > 0 {
            self.refresh_parent_offsets();
        }
        self.phase == PlaybackPhase::Finished
    }

    fn cursor_for(&self, track: TrackId) -> Option<&Cursor> {
        self.cursors
            .get(self.bindings.slot(track))
            .or_else(|| self.cursors.first())
    }

    /// Physical frame `track` is sampled at, `None` when its animation has
    /// nothing visible or nothing is playing.
    pub fn track_frame(&self, track: TrackId) -> Option<usize> {
        let cursor = self.cursor_for(track)?;
        cursor.window?;
        Some(cursor.frame)
    }

    /// Name of the animation driving `track`, only while several play.
    pub fn binding_for(&self, track: &str) -> Option<Arc<str>> {
        if self.bindings.is_empty() {
            return None;
        }
        let id = self.definition.track_id(track)?;
        let animation = self.cursor_for(id)?.animation?;
        Some(self.definition.animation(animation).name.clone())
    }

    /// Replace inferred bindings for the named tracks.
    ///
    /// The whole map is validated first; any unknown track, unknown
    /// animation or inactive animation rejects it without changes.
    pub fn set_track_bindings_override(
        &mut self,
        overrides: &FxHashMap<String, String>,
    ) -> Result<()> {
        let mut resolved = Vec::with_capacity(overrides.len());
        for (track, animation) in overrides {
            let track_id = self
                .definition
                .track_id(track)
                .ok_or_else(|| ReanimError::UnknownTrack(track.clone()))?;
            let animation_id = self
                .definition
                .animation_id(animation)
                .ok_or_else(|| ReanimError::UnknownAnimation(animation.clone()))?;
            let slot = self
                .cursors
                .iter()
                .position(|c| c.animation == Some(animation_id))
                .ok_or_else(|| ReanimError::InactiveAnimation(animation.clone()))?;
            resolved.push((track_id, slot));
        }
        if self.bindings.is_empty() {
            self.bindings = TrackBindings::uniform(self.definition.tracks().len());
        }
        for (track, slot) in resolved {
            self.bindings.set(track, slot);
        }
        self.refresh_parent_offsets();
        Ok(())
    }

    /// Draw `image` instead of the track's own image.
    pub fn set_image_override(&mut self, track: &str, image: impl Into<Arc<str>>) -> Result<()> {
        let id = self
            .definition
            .track_id(track)
            .ok_or_else(|| ReanimError::UnknownTrack(track.to_string()))?;
        self.image_overrides.insert(id, image.into());
        Ok(())
    }

    /// Returns whether an override was removed.
    pub fn clear_image_override(&mut self, track: &str) -> bool {
        self.definition
            .track_id(track)
            .and_then(|id| self.image_overrides.remove(&id))
            .is_some()
    }

    pub fn image_override(&self, track: TrackId) -> Option<&Arc<str>> {
        self.image_overrides.get(&track)
    }

    /// Hide or show a track for this entity only.
    pub fn set_track_hidden(&mut self, track: &str, hidden: bool) -> Result<()> {
        let id = self
            .definition
            .track_id(track)
            .ok_or_else(|| ReanimError::UnknownTrack(track.to_string()))?;
        if hidden {
            self.hidden_tracks.insert(id);
        } else {
            self.hidden_tracks.remove(&id);
        }
        Ok(())
    }

    pub fn is_track_hidden(&self, track: TrackId) -> bool {
        self.hidden_tracks.contains(&track)
    }

    /// Cached displacement inherited from the track's parent.
    pub fn parent_offset(&self, track: TrackId) -> Vec2 {
        self.parent_offsets.get(track.0).copied().unwrap_or(Vec2::ZERO)
    }

    fn refresh_parent_offsets(&mut self) {
        let mut offsets = vec![Vec2::ZERO; self.definition.tracks().len()];
        for attachment in self.definition.attachments() {
            let Some(cursor) = self.cursor_for(attachment.parent) else {
                continue;
            };
            let Some(window) = cursor.window else {
                continue;
            };
            offsets[attachment.child.0] = attachment_offset(
                self.definition.track(attachment.parent),
                cursor.frame,
                window.first,
            );
        }
        self.parent_offsets = offsets;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reanim::format::{
        FRAME_HIDDEN, FRAME_VISIBLE, FrameSource, ReanimSource, TrackSource,
    };

    /// 10 frames at 10 fps: "walk" 0-3, "explode" 4-6, "idle" 7-9, "empty"
    /// never visible. "stem" sways during "idle"; "head" hangs from it.
    fn definition() -> Arc<ReanimDefinition> {
        let window = |name: &str, first: usize, len: usize| {
            let mut track = TrackSource::new(name);
            for frame in 0..10 {
                let visible = frame >= first && frame < first + len;
                track = track.with_frame(FrameSource::marker(if visible {
                    FRAME_VISIBLE
                } else {
                    FRAME_HIDDEN
                }));
            }
            track
        };
        let mut stem = TrackSource::new("stem").with_empty_frames(7);
        for x in [0.0, 2.0, 4.0] {
            stem = stem.with_frame(FrameSource::at(10.0 + x, 5.0));
        }
        let source = ReanimSource {
            fps: 10.0,
            tracks: vec![
                window("anim_walk", 0, 4),
                window("anim_explode", 4, 3),
                window("anim_idle", 7, 3),
                window("anim_empty", 0, 0),
                stem,
                TrackSource::new("head")
                    .with_frame(FrameSource::at(0.0, -20.0).with_image("IMAGE_HEAD"))
                    .with_empty_frames(9),
            ],
        };
        Arc::new(
            ReanimDefinition::from_source(&source)
                .unwrap()
                .with_attachment("stem", "head")
                .unwrap(),
        )
    }

    fn reanim() -> Reanimation {
        Reanimation::new("plant", definition())
    }

    #[test]
    fn test_starts_idle() {
        let mut r = reanim();
        assert_eq!(r.phase(), PlaybackPhase::Idle);
        assert_eq!(r.current_frame(), None);
        assert!(!r.advance(1.0));
        assert_eq!(r.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_play_resets_to_window_start() {
        let mut r = reanim();
        r.play("explode").unwrap();
        assert_eq!(r.phase(), PlaybackPhase::Playing);
        assert_eq!(r.current_frame(), Some(4));
        r.advance(0.1);
        assert_eq!(r.current_frame(), Some(5));
        r.play("explode").unwrap();
        assert_eq!(r.current_frame(), Some(4));
    }

    #[test]
    fn test_looping_wraps_to_window_start() {
        let mut r = reanim().with_looping(true);
        r.play("walk").unwrap();
        let frames: Vec<usize> = (0..6)
            .map(|_| {
                r.advance(0.1);
                r.current_frame().unwrap()
            })
            .collect();
        assert_eq!(frames, vec![1, 2, 3, 0, 1, 2]);
        assert!(!r.is_finished());
    }

    #[test]
    fn test_non_looping_finishes_and_freezes() {
        let mut r = reanim().with_looping(false);
        r.play("explode").unwrap();
        assert!(!r.advance(0.1));
        assert_eq!(r.current_frame(), Some(5));
        assert!(r.advance(0.1));
        assert_eq!(r.current_frame(), Some(6));
        assert!(r.is_finished());
        assert!(!r.advance(0.1));
        assert!(!r.advance(5.0));
        assert_eq!(r.current_frame(), Some(6));
    }

    #[test]
    fn test_accumulator_carries_sub_frame_time() {
        let mut r = reanim();
        r.play("walk").unwrap();
        r.advance(0.06);
        assert_eq!(r.current_frame(), Some(0));
        r.advance(0.06);
        assert_eq!(r.current_frame(), Some(1));
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut r = reanim().with_max_catch_up_frames(2);
        r.play_timeline();
        r.advance(0.55);
        assert_eq!(r.current_frame(), Some(2));
    }

    #[test]
    fn test_unknown_animation_leaves_state() {
        let mut r = reanim();
        r.play("walk").unwrap();
        r.advance(0.2);
        let err = r.play("nonexistent").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(r.current_frame(), Some(2));
        let err = r.play_concurrent(&["walk", "nonexistent"]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(r.cursors().len(), 1);
    }

    #[test]
    fn test_timeline_playback_covers_all_frames() {
        let mut r = reanim().with_looping(false);
        r.play_timeline();
        assert_eq!(r.current_frame(), Some(0));
        for _ in 0..9 {
            r.advance(0.1);
        }
        assert_eq!(r.current_frame(), Some(9));
        assert_eq!(r.current_logical_frame(), Some(9));
        assert!(r.is_finished());
    }

    #[test]
    fn test_seek_maps_logical_frames() {
        let mut r = reanim();
        r.play("idle").unwrap();
        r.seek(2).unwrap();
        assert_eq!(r.current_frame(), Some(9));
        assert_eq!(r.current_logical_frame(), Some(2));
        let err = r.seek(3).unwrap_err();
        assert!(matches!(err, ReanimError::FrameNotFound { frame: 3, .. }));
        assert_eq!(r.current_frame(), Some(9));
    }

    #[test]
    fn test_degenerate_window_has_no_track_frames() {
        let mut r = reanim();
        r.play("empty").unwrap();
        let head = r.definition().track_id("head").unwrap();
        assert_eq!(r.track_frame(head), None);
    }

    #[test]
    fn test_concurrent_play_binds_tracks() {
        let mut r = reanim();
        r.play_concurrent(&["walk", "idle"]).unwrap();
        assert_eq!(r.binding_for("stem").as_deref(), Some("idle"));
        assert_eq!(r.binding_for("head").as_deref(), Some("walk"));
        let stem = r.definition().track_id("stem").unwrap();
        assert_eq!(r.track_frame(stem), Some(7));

        r.play("walk").unwrap();
        assert_eq!(r.binding_for("stem"), None);
    }

    #[test]
    fn test_binding_override_is_all_or_nothing() {
        let mut r = reanim();
        r.play_concurrent(&["walk", "idle"]).unwrap();

        let mut bad = FxHashMap::default();
        bad.insert("head".to_string(), "idle".to_string());
        bad.insert("tail".to_string(), "idle".to_string());
        assert!(r.set_track_bindings_override(&bad).unwrap_err().is_validation());
        assert_eq!(r.binding_for("head").as_deref(), Some("walk"));

        let mut inactive = FxHashMap::default();
        inactive.insert("head".to_string(), "explode".to_string());
        assert!(matches!(
            r.set_track_bindings_override(&inactive),
            Err(ReanimError::InactiveAnimation(_))
        ));

        let mut unknown = FxHashMap::default();
        unknown.insert("head".to_string(), "dance".to_string());
        assert!(matches!(
            r.set_track_bindings_override(&unknown),
            Err(ReanimError::UnknownAnimation(_))
        ));

        let mut good = FxHashMap::default();
        good.insert("head".to_string(), "anim_idle".to_string());
        r.set_track_bindings_override(&good).unwrap();
        assert_eq!(r.binding_for("head").as_deref(), Some("idle"));
    }

    #[test]
    fn test_parent_offset_follows_stem() {
        let mut r = reanim();
        r.play("idle").unwrap();
        let head = r.definition().track_id("head").unwrap();
        assert_eq!(r.parent_offset(head), Vec2::ZERO);
        r.advance(0.1);
        assert_eq!(r.parent_offset(head), Vec2::new(2.0, 0.0));
        r.advance(0.1);
        assert_eq!(r.parent_offset(head), Vec2::new(4.0, 0.0));
        r.advance(0.1);
        assert_eq!(r.parent_offset(head), Vec2::ZERO);
    }

    #[test]
    fn test_image_override_and_hidden_tracks() {
        let mut r = reanim();
        let head = r.definition().track_id("head").unwrap();
        r.set_image_override("head", "IMAGE_HEAD_BLINK").unwrap();
        assert_eq!(r.image_override(head).map(|s| s.as_ref()), Some("IMAGE_HEAD_BLINK"));
        assert!(r.clear_image_override("head"));
        assert!(!r.clear_image_override("head"));
        assert!(r.set_image_override("tail", "X").unwrap_err().is_validation());

        r.set_track_hidden("head", true).unwrap();
        assert!(r.is_track_hidden(head));
        r.set_track_hidden("head", false).unwrap();
        assert!(!r.is_track_hidden(head));
    }
}
