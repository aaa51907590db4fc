use bevy_ecs::prelude::Component;
use glam::Vec2;

/// World-space origin of an entity; reanim parts are placed relative to it.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
        }
    }
}
