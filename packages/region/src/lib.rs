#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative boundary layer loading and `GeoJSON` export.
//!
//! Reads the village boundary layer (ESRI shapefile or `GeoJSON`) into
//! [`Boundary`] records keyed by normalized village and sub-district names,
//! and writes the layer back out as a `GeoJSON` `FeatureCollection` for
//! external use.

pub mod export;
pub mod load;

use geojson::FeatureCollection;
use thiserror::Error;

pub use opt_map_region_models::{Boundary, BoundaryFieldMapping, RegionKey, normalize_key};

/// A loaded boundary layer.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    /// Polygon features with their join keys.
    pub boundaries: Vec<Boundary>,
    /// Every source feature with its original attributes, including those
    /// that carry no polygon and so never join.
    pub features: FeatureCollection,
}

/// Errors that can occur while loading or exporting the boundary layer.
#[derive(Debug, Error)]
pub enum RegionError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The shapefile (or its `.dbf` attribute table) could not be read.
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The file extension is not a supported boundary format.
    #[error("Unsupported boundary format: '{extension}' (expected shp, geojson or json)")]
    UnsupportedFormat {
        /// The offending extension (empty when the path has none).
        extension: String,
    },

    /// A configured name attribute does not exist on any feature.
    #[error("Boundary layer has no '{field}' attribute on any feature")]
    MissingField {
        /// The attribute name from the field mapping.
        field: String,
    },

    /// The `GeoJSON` document is not a `Feature` or `FeatureCollection`.
    #[error("GeoJSON document contains no features")]
    NoFeatures,
}
