//! User settings read from `boltyard.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::fastener::{Fit, TapMaterial};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "boltyard.toml";

/// Errors raised while reading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid settings TOML.
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Defaults applied when building fasteners and holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Clearance fit for clearance holes.
    pub fit: Fit,
    /// Material class for tap holes.
    pub tap_material: TapMaterial,
    /// Omit threads from fastener shapes.
    pub simple: bool,
    /// Volume integration resolution in mm; kernel default if unset.
    pub resolution: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fit: Fit::Normal,
            tap_material: TapMaterial::Soft,
            simple: true,
            resolution: None,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read settings from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Read `path` if given, else `./boltyard.toml` if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(CONFIG_FILE);
                if local.exists() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml_str("fit = \"loose\"\n").unwrap();
        assert_eq!(settings.fit, Fit::Loose);
        assert_eq!(settings.tap_material, TapMaterial::Soft);
        assert!(settings.simple);
    }

    #[test]
    fn test_full_file() {
        let text = "fit = \"close\"\ntap_material = \"hard\"\nsimple = false\nresolution = 0.2\n";
        let settings = Settings::from_toml_str(text).unwrap();
        assert_eq!(settings.fit, Fit::Close);
        assert_eq!(settings.tap_material, TapMaterial::Hard);
        assert!(!settings.simple);
        assert_eq!(settings.resolution, Some(0.2));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(matches!(
            Settings::from_toml_str("fitt = \"close\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(Settings::from_toml_str("fit = \"snug\"\n").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/boltyard.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
