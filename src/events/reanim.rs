//! Reanimation completion events.
//!
//! When a non-looping reanimation freezes on the last frame of every active
//! window, a [`ReanimFinishedEvent`] is triggered exactly once. Playing
//! again re-arms it.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<ReanimFinishedEvent>, mut commands: Commands| {
//!     if trigger.animation.as_deref() == Some("explode") {
//!         commands.entity(trigger.entity).despawn();
//!     }
//! });
//! ```
//!
//! # Related
//!
//! - [`crate::components::reanimation::Reanimation`] – playback state
//! - [`crate::systems::reanimation::reanimation_system`] – emits these events

use std::sync::Arc;

use bevy_ecs::prelude::*;

/// Event emitted when a non-looping reanimation finishes.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct ReanimFinishedEvent {
    /// The entity whose playback finished.
    pub entity: Entity,
    /// First active animation, `None` for raw timeline playback.
    pub animation: Option<Arc<str>>,
}
