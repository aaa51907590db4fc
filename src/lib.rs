//! Reanim engine library.
//!
//! Keyframed 2D sprite animation: sparse per-track keyframes are merged into
//! dense tracks, split into named animation windows, played per entity on a
//! `bevy_ecs` world and turned into ordered, transformed render parts for an
//! external rasterizer.

pub mod components;
pub mod error;
pub mod events;
pub mod reanim;
pub mod resources;
pub mod systems;
