//! Visibility window mapping.
//!
//! Each named animation owns a visibility map: one frame marker per physical
//! frame, `0` where the animation is playing and `-1` elsewhere. The visible
//! run is the animation's window. Logical frame `n` of an animation is the
//! `n`-th visible entry of its map.
//!
//! An empty map means raw-frame playback: logical and physical frames are
//! the same number.

use super::format::FRAME_HIDDEN;

/// Per-animation frame markers, one per physical frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityMap {
    markers: Vec<i32>,
}

/// Inclusive physical frame range of a visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub first: usize,
    pub last: usize,
}

impl Window {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// Number of physical frames in the window. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn contains(&self, frame: usize) -> bool {
        frame >= self.first && frame <= self.last
    }
}

impl VisibilityMap {
    pub fn new(markers: Vec<i32>) -> Self {
        Self { markers }
    }

    /// The raw-frame map.
    pub fn raw() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[i32] {
        &self.markers
    }

    pub fn is_raw(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn is_visible(&self, physical: usize) -> bool {
        self.markers
            .get(physical)
            .is_some_and(|m| *m != FRAME_HIDDEN)
    }

    /// Map a logical frame to a physical one.
    ///
    /// Returns `None` when `logical` is past the number of visible entries.
    pub fn physical_frame(&self, logical: usize) -> Option<usize> {
        if self.is_raw() {
            return Some(logical);
        }
        let mut counter = 0;
        for (physical, marker) in self.markers.iter().enumerate() {
            if *marker == FRAME_HIDDEN {
                continue;
            }
            if counter == logical {
                return Some(physical);
            }
            counter += 1;
        }
        None
    }

    /// Map a physical frame back to its logical index.
    ///
    /// Returns `None` for hidden entries and out-of-range frames.
    pub fn logical_frame(&self, physical: usize) -> Option<usize> {
        if self.is_raw() {
            return Some(physical);
        }
        if !self.is_visible(physical) {
            return None;
        }
        Some(
            self.markers[..physical]
                .iter()
                .filter(|m| **m != FRAME_HIDDEN)
                .count(),
        )
    }

    /// First and last visible index of the primary window, `(-1, -1)` when
    /// nothing is visible.
    ///
    /// Visible entries after the first run ends belong to a secondary window
    /// and are ignored.
    pub fn window_bounds(&self) -> (i32, i32) {
        let Some(first) = self.markers.iter().position(|m| *m != FRAME_HIDDEN) else {
            return (-1, -1);
        };
        let run = self.markers[first..]
            .iter()
            .take_while(|m| **m != FRAME_HIDDEN)
            .count();
        (first as i32, (first + run - 1) as i32)
    }

    /// The primary window, or the whole timeline of `frame_count` frames for
    /// a raw map. `None` when every entry is hidden.
    pub fn window(&self, frame_count: usize) -> Option<Window> {
        if self.is_raw() {
            return (frame_count > 0).then(|| Window::new(0, frame_count - 1));
        }
        match self.window_bounds() {
            (-1, _) | (_, -1) => None,
            (first, last) => Some(Window::new(first as usize, last as usize)),
        }
    }
}
