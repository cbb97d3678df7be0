//! Render settings, loadable from TOML.

use std::path::Path;

use serde::Deserialize;

use crate::kd::BuildOptions;
use crate::{Color, Error, Result};

/// Image and shading parameters for a render.
///
/// Every field has a default, so a settings file only needs the values it
/// changes:
///
/// ```toml
/// width = 800
/// height = 600
/// shadow_darkness = 0.3
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Color of rays that hit nothing.
    pub background: [f64; 3],
    /// Brightness kept for each light sample that is blocked, in `[0, 1]`.
    pub shadow_darkness: f64,
    /// Vertical field of view.
    pub fov_degrees: f64,
    /// Recursion limit for tree construction.
    pub max_depth: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            background: [0.815, 0.949, 1.0],
            shadow_darkness: 0.5,
            fov_degrees: 60.0,
            max_depth: BuildOptions::default().max_depth,
        }
    }
}

impl RenderSettings {
    /// Parses and validates settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading render settings from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidSettings(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.shadow_darkness) {
            return Err(Error::InvalidSettings(format!(
                "shadow darkness {} is outside [0, 1]",
                self.shadow_darkness
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(Error::InvalidSettings(format!(
                "field of view {} is outside (0, 180)",
                self.fov_degrees
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn background_color(&self) -> Color {
        Color::from(self.background)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = RenderSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.shadow_darkness, 0.5);
        assert_eq!(settings.max_depth, 64);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings =
            RenderSettings::from_toml_str("width = 32\nshadow_darkness = 0.25\n").unwrap();
        assert_eq!(settings.width, 32);
        assert_eq!(settings.height, 480);
        assert_eq!(settings.shadow_darkness, 0.25);
        assert_eq!(settings.background, [0.815, 0.949, 1.0]);
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = RenderSettings::from_toml_str("height = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidSettings(_)));
    }

    #[test]
    fn darkness_out_of_range_is_rejected() {
        let settings = RenderSettings {
            shadow_darkness: 1.5,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn malformed_toml_is_a_settings_error() {
        let err = RenderSettings::from_toml_str("width = \"wide\"").unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = RenderSettings::load("/nonexistent/render.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
