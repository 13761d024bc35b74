//! `GeoJSON` export of the boundary layer.
//!
//! The export is regenerated on every run and overwrites the previous
//! file. It carries every source feature, joinable or not. Attribute maps
//! are ordered, so unchanged input produces byte-identical output.

use std::path::Path;

use geo::Geometry;
use geojson::{FeatureCollection, GeoJson};
use opt_map_region_models::Boundary;

use crate::RegionError;

/// Converts a geometry to `GeoJSON`, writing single-part multipolygons
/// back out as plain polygons.
#[must_use]
pub fn to_geojson_geometry(geometry: &Geometry<f64>) -> geojson::Geometry {
    let value = match geometry {
        Geometry::MultiPolygon(mp) if mp.0.len() == 1 => geojson::Value::from(&mp.0[0]),
        other => geojson::Value::from(other),
    };
    geojson::Geometry::new(value)
}

/// Converts a boundary's geometry to a `GeoJSON` geometry, writing
/// single-part multipolygons back out as plain polygons.
#[must_use]
pub fn boundary_geometry(boundary: &Boundary) -> geojson::Geometry {
    let value = match boundary.geometry.0.as_slice() {
        [polygon] => geojson::Value::from(polygon),
        _ => geojson::Value::from(&boundary.geometry),
    };
    geojson::Geometry::new(value)
}

/// Writes the layer's source features to `path` as a `GeoJSON`
/// `FeatureCollection`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`RegionError::Io`] if the directory or file cannot be written.
pub fn write_geojson(features: &FeatureCollection, path: &Path) -> Result<(), RegionError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let output = GeoJson::from(features.clone()).to_string();
    std::fs::write(path, output)?;

    log::info!(
        "Exported {} boundary features to {}",
        features.features.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::parse_geojson_boundaries;
    use geo::{MultiPolygon, polygon};
    use opt_map_region_models::BoundaryFieldMapping;

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"WADMKC": "Krian", "NAMOBJ": "Sidorejo", "LUAS": 1.5},
                "geometry": {"type": "Polygon", "coordinates": [[[112.5, -7.4], [112.6, -7.4], [112.6, -7.5], [112.5, -7.4]]]}
            },
            {
                "type": "Feature",
                "properties": {"NAMOBJ": "Bakung", "WADMKC": "Balongbendo"},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[112.4, -7.4], [112.5, -7.4], [112.5, -7.5], [112.4, -7.4]]],
                    [[[112.3, -7.4], [112.35, -7.4], [112.35, -7.45], [112.3, -7.4]]]
                ]}
            },
            {
                "type": "Feature",
                "properties": {"NAMOBJ": "Balai Desa", "WADMKC": "Krian"},
                "geometry": {"type": "Point", "coordinates": [112.55, -7.45]}
            },
            {
                "type": "Feature",
                "properties": {"NAMOBJ": "Tanpa Batas", "WADMKC": "Krian"},
                "geometry": null
            }
        ]
    }"#;

    fn export_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("opt_map_export_{name}_{}", std::process::id()))
    }

    #[test]
    fn exports_every_source_feature() {
        let layer = parse_geojson_boundaries(LAYER, &BoundaryFieldMapping::default()).unwrap();
        assert_eq!(layer.boundaries.len(), 2);

        let dir = export_dir("all");
        let path = dir.join("boundaries.geojson");
        write_geojson(&layer.features, &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let features = json["features"].as_array().unwrap();
        assert_eq!(features.len(), 4);

        assert_eq!(features[0]["properties"]["LUAS"], serde_json::json!(1.5));
        assert_eq!(features[2]["properties"]["NAMOBJ"], serde_json::json!("Balai Desa"));
        assert_eq!(features[2]["geometry"]["type"], serde_json::json!("Point"));
        assert_eq!(features[3]["properties"]["NAMOBJ"], serde_json::json!("Tanpa Batas"));
        assert!(features[3]["geometry"].is_null());
        assert!(features.iter().all(|f| f["properties"].get("DESA_JOIN").is_none()));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn single_part_polygons_stay_polygons() {
        let layer = parse_geojson_boundaries(LAYER, &BoundaryFieldMapping::default()).unwrap();
        let first = boundary_geometry(&layer.boundaries[0]);
        let second = boundary_geometry(&layer.boundaries[1]);
        assert!(matches!(first.value, geojson::Value::Polygon(_)));
        assert!(matches!(second.value, geojson::Value::MultiPolygon(_)));

        let single = Geometry::MultiPolygon(MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
        ]]));
        assert!(matches!(
            to_geojson_geometry(&single).value,
            geojson::Value::Polygon(_)
        ));
    }

    #[test]
    fn export_is_idempotent() {
        let dir = export_dir("idempotent");
        let path = dir.join("boundaries.geojson");
        let layer = parse_geojson_boundaries(LAYER, &BoundaryFieldMapping::default()).unwrap();

        write_geojson(&layer.features, &path).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_geojson(&layer.features, &path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);

        let reparsed = parse_geojson_boundaries(
            &String::from_utf8(second).unwrap(),
            &BoundaryFieldMapping::default(),
        )
        .unwrap();
        assert_eq!(reparsed.boundaries.len(), 2);
        assert_eq!(reparsed.features.features.len(), 4);
        assert_eq!(reparsed.boundaries[1].key.desa.as_deref(), Some("BAKUNG"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
