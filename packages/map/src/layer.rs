//! Styled `GeoJSON` layer handed to the map renderer.
//!
//! Each feature carries the boundary's source attributes, the join keys,
//! the joined observation columns, a `style` object, and a `tooltip`
//! array with one entry per joined row. The collection carries the map
//! view and the tooltip field list as foreign members.

use std::collections::BTreeMap;
use std::path::Path;

use geo::BoundingRect;
use geojson::{Feature, FeatureCollection, GeoJson};
use opt_map_filter::FilterSelection;
use opt_map_observation_models::Observation;
use opt_map_region::export::boundary_geometry;
use opt_map_region_models::Boundary;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::MapError;
use crate::join::{JoinedRecord, left_join};
use crate::palette::SubDistrictColors;
use crate::style::{Style, StyleMode, classify, style_for};
use crate::tooltip::{DESA_JOIN, KECAMATAN_JOIN, TooltipField, tooltip_fields, tooltip_values};

type Properties = serde_json::Map<String, serde_json::Value>;

/// How a boundary matching several observations is drawn.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RenderMode {
    /// One feature per joined row; a boundary with three monthly rows is
    /// drawn three times, stacked.
    #[default]
    FanOut,
    /// One feature per boundary. Its tooltip lists every joined row and it
    /// is highlighted if any row passes the filter.
    PerBoundary,
}

/// Initial map framing for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    /// `[latitude, longitude]` of the map centre.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [-7.45, 112.7],
            zoom: 10,
        }
    }
}

/// A rendered layer plus bookkeeping about how features were styled.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    /// Styled features.
    pub features: FeatureCollection,
    /// Tooltip lines, in display order.
    pub tooltip: Vec<TooltipField>,
    /// Feature count per style mode.
    pub counts: BTreeMap<StyleMode, usize>,
}

impl MapLayer {
    /// Converts the layer to a `GeoJSON` document.
    #[must_use]
    pub fn to_geojson(&self) -> GeoJson {
        GeoJson::from(self.features.clone())
    }

    /// Writes the layer to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Io`] if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), MapError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_geojson().to_string())?;
        log::info!(
            "Wrote {} styled features to {}",
            self.features.features.len(),
            path.display()
        );
        Ok(())
    }
}

/// Joins, styles, and assembles the map layer for one render pass.
///
/// # Errors
///
/// Returns [`MapError::Json`] if an observation cannot be serialized into
/// feature properties.
pub fn build_layer(
    boundaries: &[Boundary],
    observations: &[Observation],
    selection: &FilterSelection,
    mode: RenderMode,
    view: MapView,
) -> Result<MapLayer, MapError> {
    let colors = SubDistrictColors::from_boundaries(boundaries);
    let joined = left_join(boundaries, observations);
    let tooltip = tooltip_fields(selection);

    let groups: Vec<Vec<JoinedRecord<'_>>> = match mode {
        RenderMode::FanOut => joined.into_iter().map(|j| vec![j]).collect(),
        RenderMode::PerBoundary => group_by_boundary(joined),
    };

    let mut counts = BTreeMap::new();
    let mut features = Vec::with_capacity(groups.len());

    for group in &groups {
        let Some(first) = group.first() else {
            continue;
        };

        let style_mode = group_mode(group, selection);
        *counts.entry(style_mode).or_insert(0) += 1;
        let style = style_for(
            style_mode,
            first.boundary.key.kecamatan.as_deref(),
            &colors,
        );

        features.push(Feature {
            bbox: None,
            geometry: Some(boundary_geometry(first.boundary)),
            id: None,
            properties: Some(feature_properties(group, &style, style_mode, &tooltip)?),
            foreign_members: None,
        });
    }

    log::info!(
        "Styled {} features ({}): {counts:?}",
        features.len(),
        mode
    );

    let mut foreign_members = Properties::new();
    foreign_members.insert("view".to_string(), serde_json::to_value(view)?);
    foreign_members.insert("tooltip".to_string(), serde_json::to_value(&tooltip)?);

    Ok(MapLayer {
        features: FeatureCollection {
            bbox: layer_bbox(boundaries),
            features,
            foreign_members: Some(foreign_members),
        },
        tooltip,
        counts,
    })
}

/// Collapses consecutive rows of the same boundary. The join emits all
/// rows of a boundary contiguously.
fn group_by_boundary(joined: Vec<JoinedRecord<'_>>) -> Vec<Vec<JoinedRecord<'_>>> {
    let mut groups: Vec<Vec<JoinedRecord<'_>>> = Vec::new();
    for record in joined {
        match groups.last_mut() {
            Some(group) if std::ptr::eq(group[0].boundary, record.boundary) => group.push(record),
            _ => groups.push(vec![record]),
        }
    }
    groups
}

/// Highlighted wins over dimmed when any row of the group passes.
fn group_mode(group: &[JoinedRecord<'_>], selection: &FilterSelection) -> StyleMode {
    group
        .iter()
        .map(|r| classify(r.filter_fields(), selection))
        .min()
        .unwrap_or(StyleMode::Overview)
}

fn feature_properties(
    group: &[JoinedRecord<'_>],
    style: &Style,
    mode: StyleMode,
    tooltip: &[TooltipField],
) -> Result<Properties, MapError> {
    let first = &group[0];
    let mut props = first.boundary.attributes.clone();

    insert_derived(&mut props, DESA_JOIN, first.boundary.key.desa.clone().into());
    insert_derived(
        &mut props,
        KECAMATAN_JOIN,
        first.boundary.key.kecamatan.clone().into(),
    );

    let empty = Observation::default();
    let observation = first.observation.unwrap_or(&empty);
    if let serde_json::Value::Object(columns) = serde_json::to_value(observation)? {
        for (column, value) in columns {
            // Boundary attributes keep their names; clashing upload columns
            // get a suffix.
            let name = if props.contains_key(&column) {
                format!("{column}_data")
            } else {
                column
            };
            props.insert(name, value);
        }
    }

    insert_derived(&mut props, "style", serde_json::to_value(style)?);
    insert_derived(&mut props, "style_mode", mode.as_ref().into());
    insert_derived(
        &mut props,
        "tooltip",
        serde_json::Value::Array(
            group
                .iter()
                .map(|r| serde_json::Value::Object(tooltip_values(r, tooltip)))
                .collect(),
        ),
    );

    Ok(props)
}

/// Inserts a property the renderer relies on. A source value already
/// stored under `key` moves to `<key>_data`.
fn insert_derived(props: &mut Properties, key: &str, value: serde_json::Value) {
    if let Some(source) = props.insert(key.to_string(), value) {
        props.insert(format!("{key}_data"), source);
    }
}

fn layer_bbox(boundaries: &[Boundary]) -> Option<Vec<f64>> {
    boundaries
        .iter()
        .filter_map(|b| b.geometry.bounding_rect())
        .reduce(|a, b| {
            geo::Rect::new(
                geo::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                geo::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
        .map(|r| vec![r.min().x, r.min().y, r.max().x, r.max().y])
}
