//! Configuration system

pub use serde::{Deserialize, Serialize};

use crate::record::Renderer;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Options for one import pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Uniform scene-scale factor between the two scenes.
    pub scale: f64,
    /// Build the Mantra section of each record.
    pub mantra: bool,
    /// Build the Arnold section of each record.
    pub arnold: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            mantra: true,
            arnold: true,
        }
    }
}

impl Config for ImportOptions {}

impl ImportOptions {
    /// Whether sections targeting `renderer` should be built.
    #[must_use]
    pub const fn renderer_enabled(&self, renderer: Renderer) -> bool {
        match renderer {
            Renderer::Mantra => self.mantra,
            Renderer::Arnold => self.arnold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_both_renderers_at_unit_scale() {
        let options = ImportOptions::default();
        assert!((options.scale - 1.0).abs() < f64::EPSILON);
        assert!(options.renderer_enabled(Renderer::Mantra));
        assert!(options.renderer_enabled(Renderer::Arnold));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let options: ImportOptions = toml::from_str("scale = 0.1\narnold = false\n").unwrap();
        assert!((options.scale - 0.1).abs() < f64::EPSILON);
        assert!(options.mantra);
        assert!(!options.arnold);
    }

    #[test]
    fn options_round_trip_through_config_files() {
        let options = ImportOptions {
            scale: 0.1,
            mantra: true,
            arnold: false,
        };
        for name in ["light_import_options.toml", "light_import_options.ron"] {
            let path = std::env::temp_dir().join(name);
            let path = path.to_str().unwrap();
            options.save_to_file(path).unwrap();
            let restored = ImportOptions::load_from_file(path).unwrap();
            assert_eq!(restored, options, "{name}");
            std::fs::remove_file(path).ok();
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let options = ImportOptions::default();
        assert!(matches!(
            options.save_to_file("options.json"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
