//! Image handles known to a reanim definition.
//!
//! The engine never decodes images. The asset loader registers a handle per
//! image reference (`IMAGE_*` names in the definition) and the render
//! assembler resolves references through this registry. References without a
//! handle are simply skipped, which is the normal state during partial loads.

use std::sync::Arc;

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Opaque handle to an image owned by the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImageHandle {
    pub id: u32,
    pub width: f32,
    pub height: f32,
}

impl ImageHandle {
    pub fn new(id: u32, width: f32, height: f32) -> Self {
        Self { id, width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Image reference -> handle map for one definition.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    images: FxHashMap<Arc<str>, ImageHandle>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<Arc<str>>, handle: ImageHandle) {
        self.images.insert(name.into(), handle);
    }

    /// Register an image (builder pattern).
    pub fn with_image(mut self, name: impl Into<Arc<str>>, handle: ImageHandle) -> Self {
        self.insert(name, handle);
        self
    }

    pub fn get(&self, name: &str) -> Option<ImageHandle> {
        self.images.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ImageHandle> {
        self.images.remove(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
