//! Repository configuration, stored as TOML at `<root>/config.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Compression codec for newly written objects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// zlib stream, the classic loose-object encoding.
    #[default]
    Zlib,
    /// zstd frame.
    Zstd,
}

/// Object store settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Codec used when writing objects. Reads accept either codec.
    pub compression: Compression,
    /// Codec level: 0-9 for zlib, 1-22 for zstd.
    pub level: i32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Zlib,
            level: 6,
        }
    }
}

/// Top-level repository configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub store: StoreConfig,
}

impl RepoConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, TypeError> {
        let config: Self = toml::from_str(text).map_err(|e| TypeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML text.
    pub fn to_toml(&self) -> Result<String, TypeError> {
        toml::to_string_pretty(self).map_err(|e| TypeError::Config(e.to_string()))
    }

    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, TypeError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(TypeError::Config(format!("read {}: {e}", path.display()))),
        }
    }

    fn validate(&self) -> Result<(), TypeError> {
        let range = match self.store.compression {
            Compression::Zlib => 0..=9,
            Compression::Zstd => 1..=22,
        };
        if !range.contains(&self.store.level) {
            return Err(TypeError::Config(format!(
                "{:?} level {} out of range {}..={}",
                self.store.compression,
                self.store.level,
                range.start(),
                range.end()
            )));
        }
        Ok(())
    }
}
