//! ECS components for reanimated entities.
//!
//! Submodules overview:
//! - [`mapposition`] – world-space origin of an entity
//! - [`reanimation`] – per-entity reanimation playback state
//! - [`renderfx`] – tint, flash, highlight, hazard and glow state
//! - [`rotation`] – rotation angle in degrees
//! - [`scale`] – 2D scale factor and mirroring flags

pub mod mapposition;
pub mod reanimation;
pub mod renderfx;
pub mod rotation;
pub mod scale;
