#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Configuration for the OPT map toolchain.
//!
//! Read from `opt_map.toml`. Every key is optional; an absent key takes
//! the built-in default, and an absent file at [`DEFAULT_CONFIG_PATH`] is
//! the same as an empty one.

use std::path::{Path, PathBuf};

use opt_map_map::MapView;
use opt_map_region_models::BoundaryFieldMapping;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "opt_map.toml";

/// Default boundary layer location.
pub const DEFAULT_BOUNDARY_PATH: &str = "Data/ADMINISTRASIDESA_AR_25K.shp";

/// Default location of the regenerated `GeoJSON` export.
pub const DEFAULT_EXPORT_PATH: &str = "Data/nama_file.geojson";

/// Errors that can occur while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`Config`].
    #[error("Invalid config {path}: {source}")]
    Toml {
        /// Path that was parsed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Boundary layer input and export.
    pub boundary: BoundaryConfig,
    /// Initial map framing.
    pub map: MapView,
}

/// `[boundary]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Boundary layer to load (`.shp`, `.geojson` or `.json`).
    pub path: PathBuf,
    /// Where the `GeoJSON` export is written on every run.
    pub export_path: PathBuf,
    /// Attribute names of the village and sub-district.
    pub fields: BoundaryFieldMapping,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_BOUNDARY_PATH),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            fields: BoundaryFieldMapping::default(),
        }
    }
}

impl Config {
    /// Parses a config document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn parse(toml_str: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::de::from_str(toml_str).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the configuration.
    ///
    /// With `path = None` the file at [`DEFAULT_CONFIG_PATH`] is read if it
    /// exists and defaults are used otherwise. An explicitly given path
    /// must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if an explicit file cannot be read, or
    /// [`ConfigError::Toml`] if the file is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => {
                log::debug!("Loaded config from {}", path.display());
                Self::parse(&contents, path)
            }
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
