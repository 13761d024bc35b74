#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative boundary types and join-key normalization.
//!
//! A [`Boundary`] is one village polygon from the boundary layer. Both the
//! boundary layer and the uploaded observation table derive a [`RegionKey`]
//! from their village (desa) and sub-district (kecamatan) names using
//! [`normalize_key`], so the two sides of every join and every filter
//! comparison see identical strings.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Default attribute holding the village name in the Indonesian 1:25k
/// administrative layer.
pub const DEFAULT_VILLAGE_FIELD: &str = "NAMOBJ";

/// Default attribute holding the sub-district name.
pub const DEFAULT_SUB_DISTRICT_FIELD: &str = "WADMKC";

/// Normalizes a region name into its join key: trimmed and uppercased.
///
/// Returns `None` for blank input so missing names never match anything.
#[must_use]
pub fn normalize_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Normalized `(desa, kecamatan)` pair used to join boundaries to
/// observations.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionKey {
    /// Normalized village name (`DESA_JOIN`).
    pub desa: Option<String>,
    /// Normalized sub-district name (`KECAMATAN_JOIN`).
    pub kecamatan: Option<String>,
}

impl RegionKey {
    /// Builds a key from raw village and sub-district names.
    #[must_use]
    pub fn from_names(desa: Option<&str>, kecamatan: Option<&str>) -> Self {
        Self {
            desa: desa.and_then(normalize_key),
            kecamatan: kecamatan.and_then(normalize_key),
        }
    }

    /// Whether both halves of the key are present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.desa.is_some() && self.kecamatan.is_some()
    }

    /// Join equality: both halves present and equal.
    #[must_use]
    pub fn joins_with(&self, other: &Self) -> bool {
        self.is_complete() && self == other
    }
}

/// Maps the boundary layer's dataset-specific attribute names onto the
/// roles this application needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryFieldMapping {
    /// Attribute holding the village name.
    pub village: String,
    /// Attribute holding the sub-district name.
    pub sub_district: String,
}

impl Default for BoundaryFieldMapping {
    fn default() -> Self {
        Self {
            village: DEFAULT_VILLAGE_FIELD.to_string(),
            sub_district: DEFAULT_SUB_DISTRICT_FIELD.to_string(),
        }
    }
}

/// One administrative area from the boundary layer.
///
/// Immutable after load. Keys of distinct boundaries may collide; the join
/// matches every boundary carrying an equal key.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Position of the feature in the source layer.
    pub index: usize,
    /// Raw village name as stored in the layer.
    pub village: Option<String>,
    /// Raw sub-district name as stored in the layer.
    pub sub_district: Option<String>,
    /// Normalized join key derived from the two names.
    pub key: RegionKey,
    /// Polygon geometry (single polygons are lifted to a multipolygon).
    pub geometry: MultiPolygon<f64>,
    /// Every attribute of the source feature, in source form.
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Boundary {
    /// Creates a boundary, deriving its [`RegionKey`] from the raw names.
    #[must_use]
    pub fn new(
        index: usize,
        village: Option<String>,
        sub_district: Option<String>,
        geometry: MultiPolygon<f64>,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let key = RegionKey::from_names(village.as_deref(), sub_district.as_deref());
        Self {
            index,
            village,
            sub_district,
            key,
            geometry,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_key("  Sidorejo "), Some("SIDOREJO".to_string()));
        assert_eq!(normalize_key("krian"), Some("KRIAN".to_string()));
    }

    #[test]
    fn blank_names_have_no_key() {
        assert_eq!(normalize_key(""), None);
        assert_eq!(normalize_key("   \t"), None);
    }

    #[test]
    fn keys_from_differently_cased_names_join() {
        let boundary = RegionKey::from_names(Some("SIDOREJO"), Some("KRIAN"));
        let observation = RegionKey::from_names(Some("Sidorejo"), Some(" Krian"));
        assert!(boundary.joins_with(&observation));
    }

    #[test]
    fn incomplete_keys_never_join() {
        let a = RegionKey::from_names(None, Some("KRIAN"));
        let b = RegionKey::from_names(None, Some("KRIAN"));
        assert!(!a.joins_with(&b));
    }

    #[test]
    fn boundary_derives_key() {
        let boundary = Boundary::new(
            0,
            Some("Sidorejo ".to_string()),
            Some("krian".to_string()),
            MultiPolygon(vec![]),
            serde_json::Map::new(),
        );
        assert_eq!(boundary.key.desa.as_deref(), Some("SIDOREJO"));
        assert_eq!(boundary.key.kecamatan.as_deref(), Some("KRIAN"));
    }

    #[test]
    fn field_mapping_defaults_to_indonesian_layer() {
        let mapping = BoundaryFieldMapping::default();
        assert_eq!(mapping.village, "NAMOBJ");
        assert_eq!(mapping.sub_district, "WADMKC");
    }
}
