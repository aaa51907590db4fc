//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta seconds on the `WorldTime` resource.
///
/// `dt` is expected to be the unscaled frame delta in seconds. Inserts a
/// default clock first if the world has none.
pub fn update_world_time(world: &mut World, dt: f32) {
    world.get_resource_or_init::<WorldTime>().advance(dt);
}
