//! Serde mirror of the reanim definition document.
//!
//! The field names are the on-disk contract and must not change:
//!
//! ```json
//! {
//!   "fps": 12,
//!   "tracks": [
//!     { "name": "anim_idle", "t": [ { "f": -1 }, {}, { "f": 0 } ] },
//!     { "name": "head", "t": [ { "i": "IMAGE_HEAD", "x": 4.0, "y": -2.5 }, { "kx": 10, "ky": 10 } ] }
//!   ]
//! }
//! ```
//!
//! Every frame field is optional. An absent field means "same as the
//! previous frame"; resolving that is the job of [`crate::reanim::merge`].

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Frame rate used when the document does not specify one.
pub const DEFAULT_FPS: f32 = 12.0;

/// Frame marker value for a visible frame.
pub const FRAME_VISIBLE: i32 = 0;
/// Frame marker value for a hidden frame.
pub const FRAME_HIDDEN: i32 = -1;

fn default_fps() -> f32 {
    DEFAULT_FPS
}

/// A whole definition document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReanimSource {
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default)]
    pub tracks: Vec<TrackSource>,
}

/// One named track and its sparse frame list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrackSource {
    pub name: String,
    #[serde(rename = "t", default)]
    pub frames: Vec<FrameSource>,
}

/// A sparse keyframe. `None` fields inherit from the previous frame.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FrameSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sx: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kx: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ky: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<f32>,
}

impl ReanimSource {
    /// Parse a document from a JSON string.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a document from disk.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

impl TrackSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    /// Append a frame (builder pattern).
    pub fn with_frame(mut self, frame: FrameSource) -> Self {
        self.frames.push(frame);
        self
    }

    /// Append `count` empty frames that inherit everything.
    pub fn with_empty_frames(mut self, count: usize) -> Self {
        self.frames
            .extend(std::iter::repeat_n(FrameSource::default(), count));
        self
    }

    /// No frame carries an image, position, scale or skew.
    pub fn is_marker_only(&self) -> bool {
        self.frames.iter().all(FrameSource::is_marker_only)
    }
}

impl FrameSource {
    /// A frame carrying only a frame marker.
    pub fn marker(f: i32) -> Self {
        Self {
            f: Some(f),
            ..Self::default()
        }
    }

    /// A frame carrying only a position.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.i = Some(image.into());
        self
    }

    pub fn with_scale(mut self, sx: f32, sy: f32) -> Self {
        self.sx = Some(sx);
        self.sy = Some(sy);
        self
    }

    pub fn with_skew(mut self, kx: f32, ky: f32) -> Self {
        self.kx = Some(kx);
        self.ky = Some(ky);
        self
    }

    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = Some(a);
        self
    }

    pub fn with_marker(mut self, f: i32) -> Self {
        self.f = Some(f);
        self
    }

    /// Carries at most a frame marker and opacity.
    pub fn is_marker_only(&self) -> bool {
        self.i.is_none()
            && self.x.is_none()
            && self.y.is_none()
            && self.sx.is_none()
            && self.sy.is_none()
            && self.kx.is_none()
            && self.ky.is_none()
    }
}
