//! Centralized menu options with TOML support.
//!
//! All tweakable settings (sphere layout, atlas resolution, camera, arcball
//! tuning) are consolidated here. A menu configuration file pairs these
//! options with the `[[items]]` list the sphere displays.

mod camera;
mod control;

use std::path::Path;

pub use camera::CameraOptions;
pub use control::ControlOptions;
use serde::{Deserialize, Serialize};

use crate::atlas::DEFAULT_CELL_SIZE;
use crate::error::MenuError;
use crate::items::MenuItem;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[control]`) work correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MenuOptions {
    /// Multiplier on the camera distance; larger values show a smaller
    /// sphere. Card sizes are set by `card_scale`.
    pub scale: f32,
    /// Radius of the geodesic sphere in world units.
    pub sphere_radius: f32,
    /// Icosahedron subdivision level (1 gives 42 slots).
    pub subdivisions: u32,
    /// Atlas cell edge length in pixels.
    pub cell_size: u32,
    /// Base card scale before the facing-based emphasis.
    pub card_scale: f32,
    /// How much of the card scale depends on facing the viewer axis.
    pub facing_emphasis: f32,
    /// Rotation velocity above which the sphere counts as moving.
    pub movement_threshold: f32,
    /// Camera projection and dolly parameters.
    pub camera: CameraOptions,
    /// Arcball tuning.
    pub control: ControlOptions,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            sphere_radius: 2.0,
            subdivisions: 1,
            cell_size: DEFAULT_CELL_SIZE,
            card_scale: 0.25,
            facing_emphasis: 0.6,
            movement_threshold: 0.01,
            camera: CameraOptions::default(),
            control: ControlOptions::default(),
        }
    }
}

impl MenuOptions {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Io`] if the file cannot be read, or
    /// [`MenuError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, MenuError> {
        let content = std::fs::read_to_string(path).map_err(MenuError::Io)?;
        toml::from_str(&content)
            .map_err(|e| MenuError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::OptionsParse`] if serialization fails, or
    /// [`MenuError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), MenuError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MenuError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(MenuError::Io)?;
        }
        std::fs::write(path, content).map_err(MenuError::Io)
    }
}

/// A menu definition file: options plus the item list.
///
/// ```toml
/// [options]
/// scale = 1.2
///
/// [[items]]
/// image = "thumbs/work.png"
/// link = "/work"
/// title = "Work"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct MenuConfig {
    /// Engine options.
    pub options: MenuOptions,
    /// Items in slot order.
    pub items: Vec<MenuItem>,
}

impl MenuConfig {
    /// Parse a menu definition from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::OptionsParse`] on malformed TOML or mistyped
    /// fields.
    pub fn from_toml(content: &str) -> Result<Self, MenuError> {
        toml::from_str(content)
            .map_err(|e| MenuError::OptionsParse(e.to_string()))
    }

    /// Load a menu definition file.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Io`] or [`MenuError::OptionsParse`].
    pub fn load(path: &Path) -> Result<Self, MenuError> {
        let content = std::fs::read_to_string(path).map_err(MenuError::Io)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = MenuOptions::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: MenuOptions = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
scale = 1.5

[control]
snap_intensity = 0.4
";
        let opts: MenuOptions = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.scale, 1.5);
        assert_eq!(opts.control.snap_intensity, 0.4);
        // Everything else should be default
        assert_eq!(opts.control.trackball_radius, 2.0);
        assert_eq!(opts.camera.base_distance, 3.0);
        assert_eq!(opts.subdivisions, 1);
    }

    #[test]
    fn menu_config_reads_items_and_options() {
        let config = MenuConfig::from_toml(
            r#"
[options]
cell_size = 256

[[items]]
image = "https://example.com/a.png"
link = "https://example.com/"
title = "A"
description = "First"

[[items]]
image = "b.png"
link = "/b"
"#,
        )
        .unwrap();
        assert_eq!(config.options.cell_size, 256);
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.items[1].title, "");
        assert!(config.items[0].is_external_link());
    }

    #[test]
    fn malformed_config_is_an_options_error() {
        let err = MenuConfig::from_toml("[[items]]\nimage = 3").unwrap_err();
        assert!(matches!(err, MenuError::OptionsParse(_)));
    }
}
