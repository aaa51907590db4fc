//! Event types emitted by the engine.
//!
//! Submodules:
//! - [`reanim`] – non-looping playback reached its last frame
pub mod reanim;
