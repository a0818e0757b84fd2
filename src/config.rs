//! Simulation and application configuration
//!
//! [`Config`] is the record new entities read at construction. Live rockets
//! and bursts never look at it again, so [`Config::apply`] only changes what
//! gets spawned afterwards.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_PARTICLE_COUNT: usize = 80;
pub const DEFAULT_EXPLOSION_POWER: f32 = 8.0;
pub const DEFAULT_GRAVITY: f32 = 0.15;
pub const DEFAULT_TRAIL_LENGTH: f32 = 0.15;
pub const DEFAULT_CUSTOM_TEXT: &str = "HAPPY NEW YEAR";
pub const DEFAULT_AUTO_FIREWORK_COUNT: usize = 2;
pub const DEFAULT_VOLUME: f32 = 0.3;

/// Text used for text bursts when the custom text is empty.
pub const FALLBACK_TEXT: &str = "FIREWORKS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub particle_count: usize,
    pub explosion_power: f32,
    pub gravity: f32,
    pub trail_length: f32,
    pub shape_mode: bool,
    pub custom_text: String,
    pub auto_firework_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            explosion_power: DEFAULT_EXPLOSION_POWER,
            gravity: DEFAULT_GRAVITY,
            trail_length: DEFAULT_TRAIL_LENGTH,
            shape_mode: true,
            custom_text: DEFAULT_CUSTOM_TEXT.to_string(),
            auto_firework_count: DEFAULT_AUTO_FIREWORK_COUNT,
        }
    }
}

impl Config {
    /// Shallow merge: every `Some` field of the patch replaces ours.
    pub fn apply(&mut self, patch: ConfigPatch) {
        let config = self;

        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = patch.$field {
                    config.$field = value;
                })*
            };
        }

        merge!(
            particle_count,
            explosion_power,
            gravity,
            trail_length,
            shape_mode,
            custom_text,
            auto_firework_count
        );
    }

    /// The text a text burst will spell.
    pub fn burst_text(&self) -> &str {
        if self.custom_text.is_empty() {
            FALLBACK_TEXT
        } else {
            &self.custom_text
        }
    }
}

/// Partial update for [`Config`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigPatch {
    pub particle_count: Option<usize>,
    pub explosion_power: Option<f32>,
    pub gravity: Option<f32>,
    pub trail_length: Option<f32>,
    pub shape_mode: Option<bool>,
    pub custom_text: Option<String>,
    pub auto_firework_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub enabled: bool,
    pub volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: DEFAULT_VOLUME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Background as `RRGGBB` hex.
    pub bg_color: Option<String>,
    /// TrueType font used for text bursts instead of the built-in bitmap font.
    pub font_path: Option<PathBuf>,
    /// Start with auto-fire running.
    pub auto_start: bool,
    /// Launch the three welcome rockets at start-up.
    pub welcome_show: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            bg_color: None,
            font_path: None,
            auto_start: true,
            welcome_show: true,
        }
    }
}

/// Everything a config file can hold.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub simulation: Config,
    pub audio: AudioSettings,
    pub display: DisplaySettings,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
