use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::SpringConfig;
use crate::error::{BookError, Result};
use crate::page_map::DEFAULT_SPLIT_THRESHOLD;
use crate::zoom::ZoomLevels;

/// Total spacing (both sides together) kept around a page when fitting it
/// into the container.
pub const DEFAULT_PAGE_SPACING: f32 = 8.0 * 11.0 * 2.0;

/// Resistance of a pinch pushed past the zoom limits.
pub const DEFAULT_RUBBERBAND: f32 = 0.15;

/// Renderer units to bitmap pixels when rasterizing a page.
pub const DEFAULT_RENDER_SCALE: f32 = 2.0;

/// Viewer tuning. Every field has a default, so a config file only needs the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub split_threshold: f32,
    pub page_spacing: f32,
    pub zoom_levels: ZoomLevels,
    pub rubberband: f32,
    pub render_scale: f32,
    pub spring: SpringConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            page_spacing: DEFAULT_PAGE_SPACING,
            zoom_levels: ZoomLevels::default(),
            rubberband: DEFAULT_RUBBERBAND,
            render_scale: DEFAULT_RENDER_SCALE,
            spring: SpringConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), "loaded viewer config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.split_threshold > 1.0) {
            return Err(BookError::InvalidConfig(format!(
                "split_threshold must be greater than 1, got {}",
                self.split_threshold
            )));
        }
        if !(self.page_spacing >= 0.0) {
            return Err(BookError::InvalidConfig(format!(
                "page_spacing must not be negative, got {}",
                self.page_spacing
            )));
        }
        if !(self.rubberband > 0.0) {
            return Err(BookError::InvalidConfig(format!(
                "rubberband must be positive, got {}",
                self.rubberband
            )));
        }
        if !(self.render_scale > 0.0) {
            return Err(BookError::InvalidConfig(format!(
                "render_scale must be positive, got {}",
                self.render_scale
            )));
        }
        let SpringConfig {
            tension,
            friction,
            mass,
        } = self.spring;
        if !(tension > 0.0 && friction > 0.0 && mass > 0.0) {
            return Err(BookError::InvalidConfig(
                "spring tension, friction and mass must be positive".into(),
            ));
        }
        self.zoom_levels.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_spacing, 176.0);
        assert_eq!(config.split_threshold, 1.5);
    }

    #[test]
    fn partial_json_overrides_defaults() {
        let config =
            ViewerConfig::from_json(r#"{ "split_threshold": 1.8, "zoom_levels": [1, 2, 3] }"#)
                .unwrap();
        assert_eq!(config.split_threshold, 1.8);
        assert_eq!(config.zoom_levels.as_slice(), &[1.0, 2.0, 3.0]);
        assert_eq!(config.spring, SpringConfig::default());
    }

    #[test]
    fn partial_spring_overrides() {
        let config = ViewerConfig::from_json(r#"{ "spring": { "tension": 300 } }"#).unwrap();
        assert_eq!(config.spring.tension, 300.0);
        assert_eq!(config.spring.friction, 26.0);
    }

    #[test]
    fn rejects_invalid_values() {
        for json in [
            r#"{ "split_threshold": 1.0 }"#,
            r#"{ "page_spacing": -1 }"#,
            r#"{ "rubberband": 0 }"#,
            r#"{ "render_scale": 0 }"#,
            r#"{ "zoom_levels": [] }"#,
            r#"{ "zoom_levels": [2, 1] }"#,
            r#"{ "zoom_levels": [1.5, 2] }"#,
            r#"{ "spring": { "mass": 0 } }"#,
        ] {
            assert!(
                matches!(ViewerConfig::from_json(json), Err(BookError::InvalidConfig(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            ViewerConfig::from_json("{ not json"),
            Err(BookError::Json(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "page_spacing": 40 }}"#).unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.page_spacing, 40.0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ViewerConfig::load(&dir.path().join("missing.json")),
            Err(BookError::Io(_))
        ));
    }
}
