//! Hover highlight target.
//!
//! Whichever entity the pointer currently rests on. The render assembler
//! receives the answer to "is this entity highlighted" as a plain argument;
//! this resource is where the world-level API reads it from.

use bevy_ecs::prelude::{Entity, Resource};

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighlightTarget(pub Option<Entity>);

impl HighlightTarget {
    pub fn is(&self, entity: Entity) -> bool {
        self.0 == Some(entity)
    }
}
