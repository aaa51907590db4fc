//! Reanimation core: definitions and the pure per-frame pipeline.
//!
//! Nothing in here touches the ECS. Data flows leaf-first:
//!
//! - [`format`] – serde mirror of the reanim document
//! - [`merge`] – sparse keyframes to dense per-frame values
//! - [`window`] – visibility maps and animation windows
//! - [`definition`] – loaded definition with interned track/animation ids
//! - [`binding`] – which concurrent animation drives which track
//! - [`transform`] – per-part affine transforms
//! - [`render`] – ordered render parts for one entity
pub mod binding;
pub mod definition;
pub mod format;
pub mod merge;
pub mod render;
pub mod transform;
pub mod window;
