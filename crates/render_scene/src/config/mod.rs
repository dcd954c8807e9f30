//! Configuration system
//!
//! Settings are plain serde structs loadable from TOML or RON, picked by
//! file extension.

use std::path::Path;

pub use serde::{Serialize, Deserialize};

use crate::color::ColorConfig;
use crate::io::DEFAULT_MAX_STRING_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Toml,
    Ron,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Settings that can be stored as TOML or RON
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = Format::of(path)?;
        let contents = std::fs::read_to_string(path)?;

        let config = match format {
            Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
            Format::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?,
        };
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match Format::of(path)? {
            Format::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Format::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not valid for the format
    #[error("Parse error: {0}")]
    Parse(String),

    /// Settings could not be encoded
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Extension is neither `.toml` nor `.ron`
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Scene loading and export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Name given to scenes built with [`Scene::from_config`](crate::scene::Scene::from_config)
    pub name: String,

    /// Run a finalize pass right after a scene is read
    pub finalize_after_load: bool,

    /// Longest length-prefixed string accepted while reading, in bytes
    pub max_string_length: u32,

    /// Color transform applied to rendered output
    pub color: ColorConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "Scene".to_string(),
            finalize_after_load: false,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            color: ColorConfig::default(),
        }
    }
}

impl Config for SceneConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::BitDepth;

    fn sample() -> SceneConfig {
        SceneConfig {
            name: "studio".to_string(),
            finalize_after_load: true,
            max_string_length: 256,
            color: ColorConfig {
                config: "srgb".to_string(),
                look: Some("contrast".to_string()),
                bit_depth: BitDepth::U16,
                exposure: 0.5,
                gamma: 2.2,
            },
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.toml");

        sample().save_to_file(&path).unwrap();
        let loaded = SceneConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_ron_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ron");

        sample().save_to_file(&path).unwrap();
        let loaded = SceneConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: SceneConfig = toml::from_str("finalize_after_load = true").unwrap();

        assert!(config.finalize_after_load);
        assert_eq!(config.max_string_length, DEFAULT_MAX_STRING_LENGTH);
        assert_eq!(config.color, ColorConfig::default());
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = SceneConfig::default().save_to_file("scene.json").unwrap_err();

        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "max_string_length = \"many\"").unwrap();

        let err = SceneConfig::load_from_file(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
