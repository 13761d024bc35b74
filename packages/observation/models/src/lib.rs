#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pest and disease (OPT) observation record types.
//!
//! One [`Observation`] is one row of an uploaded table: where (kecamatan,
//! desa), what (OPT), when (bulan), and the three area measurements in
//! hectares described by [`Metric`].

use std::collections::BTreeMap;

use opt_map_region_models::RegionKey;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Sub-district column header.
pub const COLUMN_KECAMATAN: &str = "Kecamatan";
/// Village column header.
pub const COLUMN_DESA: &str = "Desa";
/// Pest/disease type column header.
pub const COLUMN_OPT: &str = "OPT";
/// Month column header.
pub const COLUMN_BULAN: &str = "Bulan";

/// Every column an upload must contain, in display order.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COLUMN_KECAMATAN,
    COLUMN_DESA,
    COLUMN_OPT,
    COLUMN_BULAN,
    Metric::Serangan.column(),
    Metric::Pengendalian.column(),
    Metric::Puso.column(),
];

/// The three area measurements carried by every observation.
///
/// Variants are declared in canonical display order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Metric {
    /// Attacked area (ha).
    Serangan,
    /// Controlled (treated) area (ha).
    Pengendalian,
    /// Crop-loss area (ha).
    Puso,
}

impl Metric {
    /// Returns all metrics in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Serangan, Self::Pengendalian, Self::Puso]
    }

    /// Column header for this metric in the upload.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Serangan => "Serangan",
            Self::Pengendalian => "Pengendalian",
            Self::Puso => "Puso",
        }
    }

    /// Tooltip label for this metric.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Serangan => "Serangan (Ha):",
            Self::Pengendalian => "Pengendalian (Ha):",
            Self::Puso => "Puso (Ha):",
        }
    }

    /// Reads this metric's value from an observation.
    #[must_use]
    pub const fn value(self, observation: &Observation) -> Option<f64> {
        match self {
            Self::Serangan => observation.serangan,
            Self::Pengendalian => observation.pengendalian,
            Self::Puso => observation.puso,
        }
    }
}

/// One row of the uploaded observation table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Zero-based data row (the header is not counted).
    #[serde(skip)]
    pub row: usize,
    /// Sub-district name as uploaded.
    #[serde(rename = "Kecamatan")]
    pub kecamatan: Option<String>,
    /// Village name as uploaded.
    #[serde(rename = "Desa")]
    pub desa: Option<String>,
    /// Pest/disease type.
    #[serde(rename = "OPT")]
    pub opt: Option<String>,
    /// Month label.
    #[serde(rename = "Bulan")]
    pub bulan: Option<String>,
    /// Attacked area (ha).
    #[serde(rename = "Serangan")]
    pub serangan: Option<f64>,
    /// Controlled area (ha).
    #[serde(rename = "Pengendalian")]
    pub pengendalian: Option<f64>,
    /// Crop-loss area (ha).
    #[serde(rename = "Puso")]
    pub puso: Option<f64>,
    /// Columns beyond the required set, by header.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
    /// Normalized `(desa, kecamatan)` join key.
    #[serde(skip)]
    pub key: RegionKey,
}

impl Observation {
    /// Recomputes [`Self::key`] from the raw village and sub-district
    /// names. Call after filling in those fields.
    #[must_use]
    pub fn with_key(mut self) -> Self {
        self.key = RegionKey::from_names(self.desa.as_deref(), self.kecamatan.as_deref());
        self
    }
}
