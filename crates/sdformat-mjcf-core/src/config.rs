//! Conversion configuration
//!
//! Options that are not carried by either file format. Stored as RON so a
//! team can keep one settings file next to its models.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Error during deserialization
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Settings shared by both conversion directions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionConfig {
    /// Configuration format version
    pub version: u32,
    /// Add the Gazebo system plugins to converted worlds (MJCF -> SDFormat)
    pub export_world_plugins: bool,
    /// Grid line spacing written as the third `size` entry of MJCF planes
    pub plane_grid_spacing: f64,
    /// Image width assumed for cameras without a resolution
    pub camera_width: u32,
    /// Image height assumed for cameras without a resolution
    pub camera_height: u32,
    /// Geom density (kg/m^3) used when computing MJCF body inertia
    pub default_density: f64,
    /// SDFormat version written to output files
    pub sdf_version: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            export_world_plugins: false,
            plane_grid_spacing: 0.0,
            camera_width: 320,
            camera_height: 240,
            default_density: 1000.0,
            sdf_version: "1.9".to_string(),
        }
    }
}

impl ConversionConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Load configuration from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: ConversionConfig =
            ron::from_str(&content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save configuration as pretty-printed RON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Camera aspect ratio (width / height)
    pub fn camera_aspect(&self) -> f64 {
        if self.camera_height == 0 {
            return 1.0;
        }
        self.camera_width as f64 / self.camera_height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ConversionConfig = ron::from_str("(export_world_plugins: true)").unwrap();
        assert!(config.export_world_plugins);
        assert_eq!(config.camera_width, 320);
        assert_eq!(config.sdf_version, "1.9");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("convert.ron");
        let config = ConversionConfig {
            plane_grid_spacing: 0.5,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ConversionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ron");
        assert!(matches!(ConversionConfig::load(&missing), Err(ConfigError::Io(_))));

        let bad = dir.path().join("bad.ron");
        std::fs::write(&bad, "(camera_width: \"wide\")").unwrap();
        assert!(matches!(ConversionConfig::load(&bad), Err(ConfigError::Deserialize(_))));
    }
}
