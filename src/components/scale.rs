//! Entity scale and mirroring.
//!
//! Mirroring is kept as separate flags so game code can flip an entity
//! without touching its magnitude. [`Scale::signed`] folds both into the
//! signed scale the transform compositor expects.

use bevy_ecs::prelude::Component;
use glam::Vec2;

#[derive(Component, Clone, Debug, Copy, PartialEq)]
pub struct Scale {
    pub scale: Vec2,
    /// Mirror about the vertical axis.
    pub flip_h: bool,
    /// Mirror about the horizontal axis.
    pub flip_v: bool,
}

impl Scale {
    pub fn new(sx: f32, sy: f32) -> Self {
        Self {
            scale: Vec2::new(sx, sy),
            flip_h: false,
            flip_v: false,
        }
    }

    pub fn mirrored(mut self, flip_h: bool, flip_v: bool) -> Self {
        self.flip_h = flip_h;
        self.flip_v = flip_v;
        self
    }

    /// Scale with the mirroring flags applied as sign flips.
    pub fn signed(&self) -> Vec2 {
        Vec2::new(
            if self.flip_h { -self.scale.x } else { self.scale.x },
            if self.flip_v { -self.scale.y } else { self.scale.y },
        )
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
