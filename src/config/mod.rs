//! Configuration module for the site server

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;

use crate::engine::{
    DEFAULT_BOTTOM_DARKEN, DEFAULT_BOTTOM_OFFSET, DEFAULT_BRUSH_RADIUS, DEFAULT_DECAY,
    DEFAULT_REVEAL_THRESHOLD, DEFAULT_TOP_OFFSET,
};

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub content: ContentSettings,
    #[serde(default)]
    pub effect: EffectSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Where the site content lives on disk
#[derive(Debug, Clone, Deserialize)]
pub struct ContentSettings {
    /// Site title passed to every page
    pub title: String,
    pub catalog_path: PathBuf,
    pub templates_path: PathBuf,
    pub static_dir: PathBuf,
    pub stylesheet: PathBuf,
    pub script: PathBuf,
}

/// Displacement effect tuning and the background layers it composites
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub top_image: Option<PathBuf>,
    pub bottom_image: Option<PathBuf>,
    pub decay: f32,
    pub brush_radius: f32,
    pub top_offset: f32,
    pub bottom_offset: f32,
    pub bottom_darken: f32,
    pub reveal_threshold: f32,
    /// Upper bound on width * height for preview renders
    pub max_preview_pixels: u32,
}

impl Default for EffectSettings {
    fn default() -> Self {
        EffectSettings {
            top_image: Some(PathBuf::from("static/img/top.png")),
            bottom_image: Some(PathBuf::from("static/img/bottom.png")),
            decay: DEFAULT_DECAY,
            brush_radius: DEFAULT_BRUSH_RADIUS,
            top_offset: DEFAULT_TOP_OFFSET,
            bottom_offset: DEFAULT_BOTTOM_OFFSET,
            bottom_darken: DEFAULT_BOTTOM_DARKEN,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            max_preview_pixels: 1920 * 1080,
        }
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with BLENDING_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("content.title", "BlendingWaves")?
            .set_default("content.catalog_path", "static/data/items.json")?
            .set_default("content.templates_path", "templates")?
            .set_default("content.static_dir", "static")?
            .set_default("content.stylesheet", "styles.css")?
            .set_default("content.script", "main.js")?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local overrides (gitignored)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables (BLENDING_SERVER__PORT, etc.)
            .add_source(
                Environment::with_prefix("BLENDING")
                    .separator("__")
                    .try_parsing(true)
            );

        builder.build()?.try_deserialize()
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: None,
            },
            content: ContentSettings {
                title: "BlendingWaves".to_string(),
                catalog_path: PathBuf::from("static/data/items.json"),
                templates_path: PathBuf::from("templates"),
                static_dir: PathBuf::from("static"),
                stylesheet: PathBuf::from("styles.css"),
                script: PathBuf::from("main.js"),
            },
            effect: EffectSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_defaults_match_engine_constants() {
        let effect = EffectSettings::default();
        assert_eq!(effect.decay, 0.95);
        assert_eq!(effect.brush_radius, 0.2);
        assert_eq!(effect.top_offset, 0.1);
        assert_eq!(effect.bottom_offset, 0.05);
        assert_eq!(effect.bottom_darken, 0.2);
        assert_eq!(effect.reveal_threshold, 0.1);
    }

    #[test]
    fn test_partial_effect_section_keeps_defaults() {
        let effect: EffectSettings = serde_json::from_str(r#"{"decay": 0.9}"#).unwrap();
        assert_eq!(effect.decay, 0.9);
        assert_eq!(effect.brush_radius, DEFAULT_BRUSH_RADIUS);
        assert!(effect.top_image.is_some());
    }

    #[test]
    fn test_default_layers_ship_with_the_site() {
        let effect = EffectSettings::default();
        let layers = crate::engine::EffectLayers::load(
            effect.top_image.as_deref(),
            effect.bottom_image.as_deref(),
        );
        assert!(layers.is_complete());

        // The page's canvas points at the same files under /static
        let home = include_str!("../../templates/home.html");
        assert!(home.contains(r#"data-top="/static/img/top.png""#));
        assert!(home.contains(r#"data-bottom="/static/img/bottom.png""#));
    }

    #[test]
    fn test_bind_addr() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
    }
}
