//! Track binding inference for concurrently playing animations.
//!
//! The source data does not say which track belongs to which animation. When
//! two or more animations play at once, each sampled track is bound to the
//! animation under which it moves the most: the one whose window shows the
//! largest positional variance for that track. Ties, including the all-static
//! case, go to the first candidate in caller order.

use super::definition::{ReanimDefinition, TrackId};
use super::merge::MergedTrack;
use super::window::Window;

/// Per-track slot into the entity's list of active animations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackBindings {
    slots: Vec<usize>,
}

impl TrackBindings {
    /// Bindings with every one of `track_count` tracks on slot 0.
    pub fn uniform(track_count: usize) -> Self {
        Self {
            slots: vec![0; track_count],
        }
    }

    /// Active-animation slot for `track`. Unbound tracks use slot 0.
    pub fn slot(&self, track: TrackId) -> usize {
        self.slots.get(track.0).copied().unwrap_or(0)
    }

    pub fn set(&mut self, track: TrackId, slot: usize) {
        if track.0 >= self.slots.len() {
            self.slots.resize(track.0 + 1, 0);
        }
        self.slots[track.0] = slot;
    }

    /// No binding has been computed; everything samples slot 0.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Sum of squared distances of the track's positions from their mean,
/// restricted to `window`.
///
/// Missing windows, windows starting past the track, and windows with fewer
/// than two frames contribute zero.
pub fn positional_variance(track: &MergedTrack, window: Option<Window>) -> f32 {
    let Some(window) = window else {
        return 0.0;
    };
    if window.first >= track.len() {
        return 0.0;
    }
    let last = window.last.min(track.len() - 1);
    let frames = &track.frames[window.first..=last];
    if frames.len() < 2 {
        return 0.0;
    }
    let n = frames.len() as f32;
    let mean_x = frames.iter().map(|f| f.x).sum::<f32>() / n;
    let mean_y = frames.iter().map(|f| f.y).sum::<f32>() / n;
    frames
        .iter()
        .map(|f| {
            let dx = f.x - mean_x;
            let dy = f.y - mean_y;
            dx * dx + dy * dy
        })
        .sum()
}

/// Index of the candidate with the strictly greatest variance, first wins
/// on ties.
fn pick_candidate(track: &MergedTrack, windows: &[Option<Window>]) -> usize {
    let mut best = 0;
    let mut best_variance = 0.0;
    for (slot, window) in windows.iter().enumerate() {
        let variance = positional_variance(track, *window);
        if variance > best_variance {
            best = slot;
            best_variance = variance;
        }
    }
    best
}

/// Bind every sampled track of `definition` to one of the candidate windows.
///
/// `windows` holds the window of each active animation in caller order; the
/// returned slots index into it.
pub fn infer_bindings(definition: &ReanimDefinition, windows: &[Option<Window>]) -> TrackBindings {
    let mut bindings = TrackBindings::uniform(definition.tracks().len());
    if windows.len() < 2 {
        return bindings;
    }
    for track in definition.sampled_tracks() {
        bindings.set(track, pick_candidate(definition.track(track), windows));
    }
    bindings
}
