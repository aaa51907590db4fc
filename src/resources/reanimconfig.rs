//! Reanimation engine configuration resource.
//!
//! Settings are loaded from an INI file. Every key is optional; missing keys
//! keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [reanim]
//! definition_prefix = anim_
//! default_looping = true
//! max_catch_up_frames = 8
//!
//! [effects]
//! highlight_brightness = 0.25
//! flash_scale = 1.0
//! hazard_tint = 255,64,64,255
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::components::renderfx::Rgba;
use crate::reanim::definition::DEFAULT_DEFINITION_PREFIX;

const DEFAULT_LOOPING: bool = true;
const DEFAULT_MAX_CATCH_UP_FRAMES: u32 = 8;
const DEFAULT_HIGHLIGHT_BRIGHTNESS: f32 = 0.25;
const DEFAULT_FLASH_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./reanim.ini";

/// How visual-effect flags turn into color fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSettings {
    /// Brightness added to highlighted entities.
    pub highlight_brightness: f32,
    /// Multiplier from flash intensity to brightness.
    pub flash_scale: f32,
    /// Color multiplied into parts of hazard-state entities.
    pub hazard_tint: Rgba,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            highlight_brightness: DEFAULT_HIGHLIGHT_BRIGHTNESS,
            flash_scale: DEFAULT_FLASH_SCALE,
            hazard_tint: Rgba::RED,
        }
    }
}

/// Reanimation configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct ReanimConfig {
    /// Name prefix of definition tracks.
    pub definition_prefix: String,
    /// Looping flag of newly spawned reanimations.
    pub default_looping: bool,
    /// Cap on frames advanced by one tick after a long stall.
    pub max_catch_up_frames: u32,
    pub effects: EffectSettings,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for ReanimConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_rgba(text: &str) -> Option<Rgba> {
    let parts: Vec<u8> = text
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some(Rgba::new(*r, *g, *b, 255)),
        [r, g, b, a] => Some(Rgba::new(*r, *g, *b, *a)),
        _ => None,
    }
}

impl ReanimConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            definition_prefix: DEFAULT_DEFINITION_PREFIX.to_string(),
            default_looping: DEFAULT_LOOPING,
            max_catch_up_frames: DEFAULT_MAX_CATCH_UP_FRAMES,
            effects: EffectSettings::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);
        info!(
            "Loaded reanim config: prefix='{}', looping={}, catch_up={}",
            self.definition_prefix, self.default_looping, self.max_catch_up_frames
        );
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [reanim] section
        if let Some(prefix) = config.get("reanim", "definition_prefix") {
            self.definition_prefix = prefix;
        }
        if let Some(looping) = config.getbool("reanim", "default_looping").ok().flatten() {
            self.default_looping = looping;
        }
        if let Some(frames) = config.getuint("reanim", "max_catch_up_frames").ok().flatten() {
            self.max_catch_up_frames = (frames as u32).max(1);
        }

        // [effects] section
        if let Some(value) = config.getfloat("effects", "highlight_brightness").ok().flatten() {
            self.effects.highlight_brightness = value as f32;
        }
        if let Some(value) = config.getfloat("effects", "flash_scale").ok().flatten() {
            self.effects.flash_scale = value as f32;
        }
        if let Some(text) = config.get("effects", "hazard_tint") {
            match parse_rgba(&text) {
                Some(color) => self.effects.hazard_tint = color,
                None => warn!("Ignoring malformed hazard_tint '{}'", text),
            }
        }
    }

    /// Save configuration to the INI file.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();
        let tint = self.effects.hazard_tint;

        config.set("reanim", "definition_prefix", Some(self.definition_prefix.clone()));
        config.set("reanim", "default_looping", Some(self.default_looping.to_string()));
        config.set(
            "reanim",
            "max_catch_up_frames",
            Some(self.max_catch_up_frames.to_string()),
        );

        config.set(
            "effects",
            "highlight_brightness",
            Some(self.effects.highlight_brightness.to_string()),
        );
        config.set("effects", "flash_scale", Some(self.effects.flash_scale.to_string()));
        config.set(
            "effects",
            "hazard_tint",
            Some(format!("{},{},{},{}", tint.r, tint.g, tint.b, tint.a)),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved reanim config to {:?}", self.config_path);
        Ok(())
    }
}
