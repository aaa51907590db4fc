//! Engine systems.
//!
//! Submodules overview
//! - [`reanimation`] – advance playback, emit finished events, entity-level API
//! - [`time`] – update simulation time and delta

pub mod reanimation;
pub mod time;
