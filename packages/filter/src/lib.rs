#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-select filter engine for OPT observations.
//!
//! A [`FilterSelection`] holds five independent selections. Four of them
//! (sub-district, village, pest type, month) gate records conjunctively;
//! the fifth picks which [`Metric`]s are displayed. The same predicate
//! subsets observations for the table and decides feature highlighting on
//! the map.

pub mod options;
pub mod selection;

use opt_map_observation_models::{Metric, Observation};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use selection::{ALL_LABEL, Selection};

/// The four record-gating filter dimensions.
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
pub enum Dimension {
    /// Sub-district.
    Kecamatan,
    /// Village.
    Desa,
    /// Pest/disease type.
    Opt,
    /// Month.
    Bulan,
}

impl Dimension {
    /// Returns all dimensions in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Kecamatan, Self::Desa, Self::Opt, Self::Bulan]
    }

    /// Prompt label for this dimension's multi-select.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kecamatan => "Filter Kecamatan",
            Self::Desa => "Filter Desa",
            Self::Opt => "Filter OPT",
            Self::Bulan => "Filter Bulan",
        }
    }
}

/// Field values a record exposes to the filter predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterFields<'a> {
    /// Sub-district name.
    pub kecamatan: Option<&'a str>,
    /// Village name.
    pub desa: Option<&'a str>,
    /// Pest/disease type.
    pub opt: Option<&'a str>,
    /// Month.
    pub bulan: Option<&'a str>,
}

impl<'a> From<&'a Observation> for FilterFields<'a> {
    fn from(observation: &'a Observation) -> Self {
        Self {
            kecamatan: observation.kecamatan.as_deref(),
            desa: observation.desa.as_deref(),
            opt: observation.opt.as_deref(),
            bulan: observation.bulan.as_deref(),
        }
    }
}

/// The five independent multi-select filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    /// Sub-district filter.
    pub kecamatan: Selection,
    /// Village filter.
    pub desa: Selection,
    /// Pest/disease type filter.
    pub opt: Selection,
    /// Month filter.
    pub bulan: Selection,
    /// Metrics to display. Does not gate records.
    pub metrics: Selection<Metric>,
}

impl FilterSelection {
    /// Returns the selection for a gating dimension.
    #[must_use]
    pub const fn dimension(&self, dimension: Dimension) -> &Selection {
        match dimension {
            Dimension::Kecamatan => &self.kecamatan,
            Dimension::Desa => &self.desa,
            Dimension::Opt => &self.opt,
            Dimension::Bulan => &self.bulan,
        }
    }

    /// Whether any gating dimension restricts records.
    #[must_use]
    pub fn is_active(&self) -> bool {
        Dimension::all()
            .iter()
            .any(|d| !self.dimension(*d).is_all())
    }

    /// Whether a record passes all four gating dimensions.
    #[must_use]
    pub fn passes(&self, fields: FilterFields<'_>) -> bool {
        self.kecamatan.matches(fields.kecamatan)
            && self.desa.matches(fields.desa)
            && self.opt.matches(fields.opt)
            && self.bulan.matches(fields.bulan)
    }

    /// Metrics to display, in canonical order.
    #[must_use]
    pub fn displayed_metrics(&self) -> Vec<Metric> {
        self.metrics.metrics()
    }
}

/// Returns the observations that pass `selection`, in input order.
#[must_use]
pub fn filter_observations<'a>(
    observations: &'a [Observation],
    selection: &FilterSelection,
) -> Vec<&'a Observation> {
    let filtered: Vec<&Observation> = observations
        .iter()
        .filter(|o| selection.passes(FilterFields::from(*o)))
        .collect();

    log::debug!(
        "Filter kept {} of {} observations",
        filtered.len(),
        observations.len()
    );

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::FilterOptions;

    fn observation(kecamatan: &str, desa: &str, opt: &str, bulan: &str) -> Observation {
        Observation {
            kecamatan: Some(kecamatan.to_string()),
            desa: Some(desa.to_string()),
            opt: Some(opt.to_string()),
            bulan: Some(bulan.to_string()),
            ..Observation::default()
        }
        .with_key()
    }

    fn sample() -> Vec<Observation> {
        vec![
            observation("Krian", "Sidorejo", "Wereng", "Januari"),
            observation("Krian", "Terik", "Tikus", "Januari"),
            observation("Balongbendo", "Bakung", "Wereng", "Februari"),
            observation("krian ", "sidorejo", "wereng", "februari"),
            Observation {
                kecamatan: Some("Krian".to_string()),
                desa: Some("Terik".to_string()),
                ..Observation::default()
            }
            .with_key(),
        ]
    }

    #[test]
    fn default_selection_is_inactive_and_passes_everything() {
        let selection = FilterSelection::default();
        assert!(!selection.is_active());
        assert_eq!(filter_observations(&sample(), &selection).len(), 5);
    }

    #[test]
    fn opt_filter_rejects_other_pests() {
        let selection = FilterSelection {
            opt: Selection::subset(["Wereng"]),
            ..FilterSelection::default()
        };
        assert!(selection.is_active());
        let tikus = observation("Krian", "Terik", "Tikus", "Januari");
        assert!(!selection.passes(FilterFields::from(&tikus)));
    }

    #[test]
    fn dimensions_combine_conjunctively() {
        let selection = FilterSelection {
            kecamatan: Selection::subset(["KRIAN"]),
            opt: Selection::subset(["wereng"]),
            ..FilterSelection::default()
        };
        let observations = sample();
        let kept = filter_observations(&observations, &selection);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|o| o.key.desa.as_deref() == Some("SIDOREJO")));
    }

    #[test]
    fn missing_value_fails_constrained_dimension() {
        let selection = FilterSelection {
            bulan: Selection::subset(["Januari", "Februari"]),
            ..FilterSelection::default()
        };
        let observations = sample();
        let kept = filter_observations(&observations, &selection);
        assert_eq!(kept.len(), 4);
        assert!(kept.iter().all(|o| o.bulan.is_some()));
    }

    #[test]
    fn all_equals_every_present_value() {
        let observations: Vec<Observation> = sample().into_iter().take(4).collect();
        let options = FilterOptions::from_observations(&observations, &Selection::All);

        let explicit = FilterSelection {
            kecamatan: Selection::subset(&options.kecamatan),
            desa: Selection::subset(&options.desa),
            opt: Selection::subset(&options.opt),
            bulan: Selection::subset(&options.bulan),
            ..FilterSelection::default()
        };

        for o in &observations {
            assert_eq!(
                explicit.passes(FilterFields::from(o)),
                FilterSelection::default().passes(FilterFields::from(o))
            );
        }
    }

    #[test]
    fn metrics_do_not_gate_records() {
        let selection = FilterSelection {
            metrics: [Metric::Serangan].into_iter().collect(),
            ..FilterSelection::default()
        };
        assert!(!selection.is_active());
        assert_eq!(selection.displayed_metrics(), vec![Metric::Serangan]);
        assert_eq!(filter_observations(&sample(), &selection).len(), 5);
    }

    #[test]
    fn dimension_names_parse() {
        assert_eq!("opt".parse::<Dimension>().unwrap(), Dimension::Opt);
        assert_eq!(Dimension::Bulan.label(), "Filter Bulan");
    }
}
