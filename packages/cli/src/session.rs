//! Loaded boundaries and observations for one run of the tool.

use std::path::{Path, PathBuf};

use opt_map_config::Config;
use opt_map_filter::options::FilterOptions;
use opt_map_filter::{FilterSelection, Selection, filter_observations};
use opt_map_map::{MapError, MapLayer, RenderMode, build_layer};
use opt_map_observation::preview::PreviewTable;
use opt_map_observation::{LoadError, Observation, load_observations};
use opt_map_region::export::write_geojson;
use opt_map_region::load::load_boundaries;
use opt_map_region::{Boundary, RegionError};

/// An uploaded observation table.
#[derive(Debug)]
struct Dataset {
    path: PathBuf,
    observations: Vec<Observation>,
}

/// Boundary layer plus the currently active upload.
#[derive(Debug)]
pub struct Session {
    config: Config,
    boundaries: Vec<Boundary>,
    data: Option<Dataset>,
}

impl Session {
    /// Loads the boundary layer and regenerates its `GeoJSON` export.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError`] if the layer cannot be loaded or the export
    /// cannot be written. Nothing can be drawn without boundaries, so
    /// callers treat this as fatal.
    pub fn start(config: Config) -> Result<Self, RegionError> {
        let layer = load_boundaries(&config.boundary.path, &config.boundary.fields)?;
        write_geojson(&layer.features, &config.boundary.export_path)?;

        Ok(Self {
            config,
            boundaries: layer.boundaries,
            data: None,
        })
    }

    /// Replaces the active upload with the table at `path`.
    ///
    /// The file is always read again, even when it is the active upload.
    /// On error the previously loaded table stays active.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read or has the wrong
    /// shape.
    pub fn load_data(&mut self, path: &Path) -> Result<usize, LoadError> {
        let observations = load_observations(path)?;
        let count = observations.len();
        self.data = Some(Dataset {
            path: path.to_path_buf(),
            observations,
        });
        Ok(count)
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Path of the active upload, if any.
    #[must_use]
    pub fn data_path(&self) -> Option<&Path> {
        self.data.as_ref().map(|d| d.path.as_path())
    }

    /// Observations of the active upload; empty when nothing is loaded.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        self.data
            .as_ref()
            .map(|d| d.observations.as_slice())
            .unwrap_or_default()
    }

    /// First `rows` observations of the unfiltered upload.
    #[must_use]
    pub fn preview(&self, rows: usize) -> PreviewTable {
        PreviewTable::new(self.observations(), rows)
    }

    /// Option lists for the filters, villages cascading from `kecamatan`.
    #[must_use]
    pub fn options(&self, kecamatan: &Selection) -> FilterOptions {
        FilterOptions::from_observations(self.observations(), kecamatan)
    }

    /// Observations passing `selection`, for tabular display.
    #[must_use]
    pub fn filtered(&self, selection: &FilterSelection) -> Vec<&Observation> {
        filter_observations(self.observations(), selection)
    }

    /// Joins, styles, and writes the map layer to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if the layer cannot be built or written.
    pub fn render(
        &self,
        selection: &FilterSelection,
        mode: RenderMode,
        out: &Path,
    ) -> Result<MapLayer, MapError> {
        let layer = build_layer(
            &self.boundaries,
            self.observations(),
            selection,
            mode,
            self.config.map,
        )?;
        layer.write(out)?;
        Ok(layer)
    }
}
