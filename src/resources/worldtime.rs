//! Simulation clock.
//!
//! Updated once per frame by [`crate::systems::time::update_world_time`].
//! `delta` is already scaled by `time_scale`; reanimation playback reads it.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldTime {
    /// Scaled seconds since start.
    pub elapsed: f32,
    /// Scaled seconds of the current frame.
    pub delta: f32,
    pub time_scale: f32,
    /// Frames advanced so far.
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Advance by an unscaled delta.
    pub fn advance(&mut self, dt: f32) {
        let scaled = dt * self.time_scale;
        self.elapsed += scaled;
        self.delta = scaled;
        self.frame_count += 1;
    }
}
