//! Visual-effect state for reanimated entities.
//!
//! The [`RenderEffects`] component carries the per-entity overlays the game
//! layer drives: a multiplicative tint, a flash intensity, a persistent
//! hover highlight, a hazard flag and additive glow layers. The render
//! assembler turns them into per-part color fields; nothing here touches
//! geometry.

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Component;
use serde::Serialize;

/// Upper bound on simultaneous glow layers per entity.
pub const MAX_GLOW_LAYERS: usize = 4;

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const RED: Rgba = Rgba::new(255, 64, 64, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Component-wise product of two colors.
    pub fn multiply(&self, other: Rgba) -> Rgba {
        Rgba::new(
            ((self.r as u16 * other.r as u16) / 255) as u8,
            ((self.g as u16 * other.g as u16) / 255) as u8,
            ((self.b as u16 * other.b as u16) / 255) as u8,
            ((self.a as u16 * other.a as u16) / 255) as u8,
        )
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Per-entity visual effects applied on top of the animation.
#[derive(Component, Clone, Debug)]
pub struct RenderEffects {
    /// Multiplied into every part's color.
    pub tint: Rgba,
    /// Multiplied into every part's opacity.
    pub alpha: f32,
    /// Flash intensity in `0.0..=1.0`; brightens every part.
    pub flash: f32,
    /// Persistent hover highlight, brightens like a flash.
    pub hovered: bool,
    /// Hazard state, tints every part red.
    pub hazard: bool,
    /// Additive glow overlays drawn over every part.
    pub glow_layers: ArrayVec<Rgba, MAX_GLOW_LAYERS>,
}

impl Default for RenderEffects {
    fn default() -> Self {
        Self {
            tint: Rgba::WHITE,
            alpha: 1.0,
            flash: 0.0,
            hovered: false,
            hazard: false,
            glow_layers: ArrayVec::new(),
        }
    }
}

impl RenderEffects {
    /// Add a glow layer. Returns `false` when all slots are taken.
    pub fn add_glow(&mut self, color: Rgba) -> bool {
        self.glow_layers.try_push(color).is_ok()
    }

    pub fn clear_glow(&mut self) {
        self.glow_layers.clear();
    }

    pub fn with_flash(mut self, flash: f32) -> Self {
        self.flash = flash.clamp(0.0, 1.0);
        self
    }

    pub fn with_hazard(mut self, hazard: bool) -> Self {
        self.hazard = hazard;
        self
    }
}
