//! Boundary layer readers.
//!
//! The format is chosen from the file extension. Both readers apply the
//! configured [`BoundaryFieldMapping`] to pull the village and
//! sub-district names out of each feature's attributes, lift polygons to
//! multipolygons, and skip features without polygon geometry for the
//! join. Skipped features are still kept in [`BoundaryLayer::features`].

use std::path::Path;

use geo::{Geometry, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson};
use opt_map_region_models::{Boundary, BoundaryFieldMapping};
use shapefile::dbase::FieldValue;

use crate::export::to_geojson_geometry;
use crate::{BoundaryLayer, RegionError};

type Attributes = serde_json::Map<String, serde_json::Value>;

/// Loads the boundary layer at `path`.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedFormat`] for unknown extensions,
/// [`RegionError::MissingField`] when a mapped attribute is absent from
/// every feature, and I/O or parse errors from the underlying reader.
pub fn load_boundaries(
    path: &Path,
    fields: &BoundaryFieldMapping,
) -> Result<BoundaryLayer, RegionError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    log::info!("Loading boundary layer {}", path.display());

    let layer = match extension.as_str() {
        "shp" => load_shapefile(path, fields)?,
        "geojson" | "json" => {
            let input = std::fs::read_to_string(path)?;
            parse_geojson_boundaries(&input, fields)?
        }
        _ => return Err(RegionError::UnsupportedFormat { extension }),
    };

    log::info!(
        "Loaded {} boundaries ({} features) from {}",
        layer.boundaries.len(),
        layer.features.features.len(),
        path.display()
    );
    Ok(layer)
}

/// Parses boundaries from a `GeoJSON` `FeatureCollection` (or a single
/// `Feature`).
///
/// # Errors
///
/// Returns [`RegionError`] if the document does not parse, holds no
/// features, or lacks a mapped attribute.
pub fn parse_geojson_boundaries(
    input: &str,
    fields: &BoundaryFieldMapping,
) -> Result<BoundaryLayer, RegionError> {
    let features = match input.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => std::iter::once(feature).collect(),
        GeoJson::Geometry(_) => return Err(RegionError::NoFeatures),
    };

    let mut boundaries = Vec::with_capacity(features.features.len());

    for (index, feature) in features.features.iter().enumerate() {
        let attributes = feature.properties.clone().unwrap_or_default();

        let Some(geometry) = feature.geometry.clone() else {
            log::warn!("Skipping boundary feature {index}: no geometry");
            continue;
        };

        let geometry = match Geometry::<f64>::try_from(geometry) {
            Ok(g) => g,
            Err(e) => {
                log::warn!("Skipping boundary feature {index}: {e}");
                continue;
            }
        };

        if let Some(boundary) = build_boundary(index, geometry, attributes, fields) {
            boundaries.push(boundary);
        }
    }

    check_mapped_fields(&boundaries, fields)?;
    Ok(BoundaryLayer {
        boundaries,
        features,
    })
}

/// Reads a shapefile and its `.dbf` attribute table.
fn load_shapefile(
    path: &Path,
    fields: &BoundaryFieldMapping,
) -> Result<BoundaryLayer, RegionError> {
    let mut reader = shapefile::Reader::from_path(path)?;
    let mut boundaries = Vec::new();
    let mut features = Vec::new();

    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result?;

        let attributes: Attributes = record
            .into_iter()
            .map(|(name, value)| (name, field_value_to_json(value)))
            .collect();

        let geometry = match Geometry::<f64>::try_from(shape) {
            Ok(g) => Some(g),
            Err(e) => {
                log::warn!("Skipping boundary shape {index}: {e}");
                None
            }
        };

        features.push(Feature {
            bbox: None,
            geometry: geometry.as_ref().map(to_geojson_geometry),
            id: None,
            properties: Some(attributes.clone()),
            foreign_members: None,
        });

        if let Some(geometry) = geometry
            && let Some(boundary) = build_boundary(index, geometry, attributes, fields)
        {
            boundaries.push(boundary);
        }
    }

    check_mapped_fields(&boundaries, fields)?;
    Ok(BoundaryLayer {
        boundaries,
        features: features.into_iter().collect::<FeatureCollection>(),
    })
}

fn build_boundary(
    index: usize,
    geometry: Geometry<f64>,
    attributes: Attributes,
    fields: &BoundaryFieldMapping,
) -> Option<Boundary> {
    let Some(geometry) = into_multipolygon(geometry) else {
        log::warn!("Skipping boundary feature {index}: not a polygon");
        return None;
    };

    let village = attributes.get(&fields.village).and_then(json_to_name);
    let sub_district = attributes.get(&fields.sub_district).and_then(json_to_name);

    if village.is_none() || sub_district.is_none() {
        log::debug!("Boundary feature {index} is missing a village or sub-district name");
    }

    Some(Boundary::new(
        index,
        village,
        sub_district,
        geometry,
        attributes,
    ))
}

/// Fails when a mapped attribute is missing from every feature, which
/// almost always means the field mapping does not fit the dataset.
fn check_mapped_fields(
    boundaries: &[Boundary],
    fields: &BoundaryFieldMapping,
) -> Result<(), RegionError> {
    if boundaries.is_empty() {
        return Ok(());
    }

    for field in [&fields.village, &fields.sub_district] {
        if !boundaries.iter().any(|b| b.attributes.contains_key(field)) {
            return Err(RegionError::MissingField {
                field: field.clone(),
            });
        }
    }

    Ok(())
}

fn into_multipolygon(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::MultiPolygon(mp) => Some(mp),
        Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Renders an attribute value as a region name.
fn json_to_name(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn field_value_to_json(value: FieldValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        FieldValue::Character(Some(s)) | FieldValue::Memo(s) => {
            Value::String(s.trim_end().to_string())
        }
        FieldValue::Numeric(Some(n)) | FieldValue::Double(n) | FieldValue::Currency(n) => {
            Value::from(n)
        }
        FieldValue::Float(Some(f)) => Value::from(f64::from(f)),
        FieldValue::Integer(i) => Value::from(i),
        FieldValue::Logical(Some(b)) => Value::Bool(b),
        FieldValue::Date(Some(d)) => Value::String(format!(
            "{:04}-{:02}-{:02}",
            d.year(),
            d.month(),
            d.day()
        )),
        _ => Value::Null,
    }
}
