use bevy_ecs::prelude::Component;

/// Entity rotation in degrees, applied about the entity origin.
#[derive(Component, Clone, Debug, Copy, Default, PartialEq)]
pub struct Rotation {
    pub degrees: f32,
}

impl Rotation {
    pub fn new(degrees: f32) -> Self {
        Self { degrees }
    }
}
