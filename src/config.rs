//! Label configuration and its toml loading.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::color::{OutlineColorPolicy, Rgba, TextColorPolicy};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Locale the host runs under.
///
/// Non-Latin scripts render disproportionately small at the Latin base scale,
/// so the base font scale is locale-dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    English,
    Japanese,
    Chinese,
    Korean,
    Other,
}

impl Locale {
    pub fn base_font_scale(self) -> f32 {
        match self {
            Locale::English => 0.65,
            _ => 0.85,
        }
    }
}

/// Configuration for label generation and drawing.
///
/// Colors and scale are baked into the cached bitmaps, so changing the
/// configuration must go through [`crate::LabelCache::set_config`], which
/// clears the cache.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub locale: Locale,
    /// User font-scale multiplier on top of the locale base scale.
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
    /// Width budget for a rendered label, in pixels at scale 1.0.
    #[serde(default = "default_max_label_width")]
    pub max_label_width: f32,
    /// Transparent padding around the rendered text, in pixels per side.
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default = "default_text_color")]
    pub text_color: TextColorPolicy,
    #[serde(default = "default_outline_color")]
    pub outline_color: OutlineColorPolicy,
}

fn default_font_scale() -> f32 {
    1.0
}

fn default_max_label_width() -> f32 {
    70.0
}

fn default_padding() -> f32 {
    4.0
}

fn default_text_color() -> TextColorPolicy {
    TextColorPolicy::Fixed(Rgba::WHITE)
}

fn default_outline_color() -> OutlineColorPolicy {
    OutlineColorPolicy::Fixed(Rgba::BLACK)
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            font_scale: default_font_scale(),
            max_label_width: default_max_label_width(),
            padding: default_padding(),
            text_color: default_text_color(),
            outline_color: default_outline_color(),
        }
    }
}

impl LabelConfig {
    /// Parse a configuration from toml text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a toml file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Locale base scale times the user multiplier.
    pub fn effective_font_scale(&self) -> f32 {
        self.locale.base_font_scale() * self.font_scale
    }
}
