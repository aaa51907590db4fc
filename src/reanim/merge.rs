//! Track merger: sparse keyframes to dense per-frame values.
//!
//! Every field of a [`FrameSource`] is optional. The merger walks a track's
//! frames in order and resolves each field against the last value seen, so
//! downstream code only ever reads a fully populated [`MergedFrame`].

use std::sync::Arc;

use super::format::{FRAME_HIDDEN, FrameSource, TrackSource};

/// Fully resolved values of one track at one physical frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFrame {
    /// The frame marker at this frame equals [`FRAME_HIDDEN`].
    pub hidden: bool,
    pub x: f32,
    pub y: f32,
    pub sx: f32,
    pub sy: f32,
    /// Skew angles in degrees.
    pub kx: f32,
    pub ky: f32,
    pub alpha: f32,
    pub image: Option<Arc<str>>,
}

impl Default for MergedFrame {
    fn default() -> Self {
        Self {
            hidden: false,
            x: 0.0,
            y: 0.0,
            sx: 1.0,
            sy: 1.0,
            kx: 0.0,
            ky: 0.0,
            alpha: 1.0,
            image: None,
        }
    }
}

impl MergedFrame {
    /// Fold a sparse frame over `self`, keeping values the frame omits.
    fn apply(&mut self, frame: &FrameSource) {
        if let Some(f) = frame.f {
            self.hidden = f == FRAME_HIDDEN;
        }
        if let Some(x) = frame.x {
            self.x = x;
        }
        if let Some(y) = frame.y {
            self.y = y;
        }
        if let Some(sx) = frame.sx {
            self.sx = sx;
        }
        if let Some(sy) = frame.sy {
            self.sy = sy;
        }
        if let Some(kx) = frame.kx {
            self.kx = kx;
        }
        if let Some(ky) = frame.ky {
            self.ky = ky;
        }
        if let Some(a) = frame.a {
            self.alpha = a;
        }
        if let Some(image) = frame.i.as_deref() {
            self.image = Some(Arc::from(image));
        }
    }

    /// Frame marker value this frame was merged from.
    pub fn marker(&self) -> i32 {
        if self.hidden { FRAME_HIDDEN } else { 0 }
    }
}

/// Dense frame array of one track.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTrack {
    pub name: Arc<str>,
    pub frames: Vec<MergedFrame>,
}

impl MergedTrack {
    /// Whether any frame resolves to an image.
    pub fn has_image(&self) -> bool {
        self.frames.iter().any(|f| f.image.is_some())
    }

    pub fn frame(&self, index: usize) -> Option<&MergedFrame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Merge a sparse track into `frame_count` dense frames.
///
/// Frames past the end of the sparse list repeat the last merged frame. A
/// hidden marker only toggles `hidden`; geometry and image keep carrying.
pub fn merge_track(track: &TrackSource, frame_count: usize) -> MergedTrack {
    let mut current = MergedFrame::default();
    let mut frames = Vec::with_capacity(frame_count);
    for index in 0..frame_count {
        if let Some(sparse) = track.frames.get(index) {
            current.apply(sparse);
        }
        frames.push(current.clone());
    }
    MergedTrack {
        name: Arc::from(track.name.as_str()),
        frames,
    }
}

/// Merge every track of a definition to the length of the longest one.
pub fn merge_tracks(tracks: &[TrackSource]) -> Vec<MergedTrack> {
    let frame_count = tracks.iter().map(|t| t.frames.len()).max().unwrap_or(0);
    tracks.iter().map(|t| merge_track(t, frame_count)).collect()
}
