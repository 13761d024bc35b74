#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Choropleth map layer for OPT observations.
//!
//! Left-joins the boundary layer to the uploaded observations, styles each
//! feature from the active [`FilterSelection`](opt_map_filter::FilterSelection)
//! and writes the result as a styled `GeoJSON` document a web map can draw
//! directly.

pub mod join;
pub mod layer;
pub mod palette;
pub mod style;
pub mod tooltip;

use thiserror::Error;

pub use layer::{MapLayer, MapView, RenderMode, build_layer};
pub use style::{Style, StyleMode};

/// Errors that can occur while building or writing a map layer.
#[derive(Debug, Error)]
pub enum MapError {
    /// Writing the layer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing feature properties failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
