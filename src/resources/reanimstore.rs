//! Reanim definition registry.
//!
//! Definitions are loaded once per key and shared through `Arc` by every
//! entity that plays them. Each definition carries its own
//! [`ImageRegistry`], which the asset loader can keep filling after the
//! definition is in use.

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use log::info;
use rustc_hash::FxHashMap;

use crate::error::{ReanimError, Result};
use crate::reanim::definition::ReanimDefinition;
use crate::reanim::format::ReanimSource;
use crate::resources::imageregistry::ImageRegistry;

/// A loaded definition and the image handles registered for it.
#[derive(Debug, Clone)]
pub struct StoredReanim {
    pub definition: Arc<ReanimDefinition>,
    pub images: ImageRegistry,
}

/// Central registry of reanim definitions keyed by string IDs.
#[derive(Resource, Debug, Default)]
pub struct ReanimStore {
    pub reanims: FxHashMap<String, StoredReanim>,
}

impl ReanimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under `key`, replacing any previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        definition: ReanimDefinition,
        images: ImageRegistry,
    ) -> Arc<ReanimDefinition> {
        let definition = Arc::new(definition);
        self.reanims.insert(
            key.into(),
            StoredReanim {
                definition: definition.clone(),
                images,
            },
        );
        definition
    }

    /// Read, merge and register a definition document.
    pub fn load_from_file(
        &mut self,
        key: impl Into<String>,
        path: impl AsRef<Path>,
        prefix: &str,
    ) -> Result<Arc<ReanimDefinition>> {
        let key = key.into();
        let source = ReanimSource::load_from_file(path.as_ref())?;
        let definition = ReanimDefinition::from_source_with_prefix(&source, prefix)?;
        info!(
            "Loaded reanim '{}' from {}: {} tracks, {} frames, {} animations",
            key,
            path.as_ref().display(),
            definition.tracks().len(),
            definition.frame_count(),
            definition.animations().len()
        );
        Ok(self.insert(key, definition, ImageRegistry::new()))
    }

    pub fn get(&self, key: &str) -> Option<&StoredReanim> {
        self.reanims.get(key)
    }

    pub fn definition(&self, key: &str) -> Result<Arc<ReanimDefinition>> {
        self.reanims
            .get(key)
            .map(|stored| stored.definition.clone())
            .ok_or_else(|| ReanimError::DefinitionNotFound(key.to_string()))
    }

    pub fn images(&self, key: &str) -> Option<&ImageRegistry> {
        self.reanims.get(key).map(|stored| &stored.images)
    }

    pub fn images_mut(&mut self, key: &str) -> Option<&mut ImageRegistry> {
        self.reanims.get_mut(key).map(|stored| &mut stored.images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reanim::definition::DEFAULT_DEFINITION_PREFIX;
    use crate::resources::imageregistry::ImageHandle;
    use std::io::Write;

    const DOC: &str = r#"{
        "fps": 12,
        "tracks": [
            { "name": "anim_idle", "t": [ { "f": 0 }, {} ] },
            { "name": "head", "t": [ { "i": "IMAGE_HEAD" }, { "x": 1 } ] }
        ]
    }"#;

    #[test]
    fn test_load_from_file_shares_definition() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOC.as_bytes()).unwrap();

        let mut store = ReanimStore::new();
        let loaded = store
            .load_from_file("peashooter", file.path(), DEFAULT_DEFINITION_PREFIX)
            .unwrap();
        let fetched = store.definition("peashooter").unwrap();
        assert!(Arc::ptr_eq(&loaded, &fetched));
        assert_eq!(fetched.frame_count(), 2);
        assert!(store.images("peashooter").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut store = ReanimStore::new();
        let err = store
            .load_from_file("x", "/nonexistent/definitely/missing.json", "anim_")
            .unwrap_err();
        assert!(matches!(err, ReanimError::Io(_)));
        assert!(store.get("x").is_none());
    }

    #[test]
    fn test_unknown_key_is_not_found() {
        let store = ReanimStore::new();
        assert!(store.definition("zombie").unwrap_err().is_not_found());
    }

    #[test]
    fn test_images_can_be_added_after_load() {
        let source = ReanimSource::from_json(DOC).unwrap();
        let mut store = ReanimStore::new();
        store.insert(
            "peashooter",
            ReanimDefinition::from_source(&source).unwrap(),
            ImageRegistry::new(),
        );
        store
            .images_mut("peashooter")
            .unwrap()
            .insert("IMAGE_HEAD", ImageHandle::new(3, 8.0, 8.0));
        assert!(store.images("peashooter").unwrap().contains("IMAGE_HEAD"));
    }
}
