//! Option lists for the multi-select filters.
//!
//! Each list holds the sorted, de-duplicated, non-missing values present
//! in the upload. The village list cascades from the sub-district
//! selection.

use std::collections::BTreeSet;

use opt_map_observation_models::{Metric, Observation};

use crate::Selection;

/// Choices offered by each filter, excluding the "all" entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Sub-district names.
    pub kecamatan: Vec<String>,
    /// Village names within the selected sub-districts.
    pub desa: Vec<String>,
    /// Pest/disease types.
    pub opt: Vec<String>,
    /// Months.
    pub bulan: Vec<String>,
    /// Displayable metrics.
    pub metrics: Vec<Metric>,
}

impl FilterOptions {
    /// Collects option lists from the upload. Villages are limited to
    /// observations whose sub-district passes `kecamatan`.
    #[must_use]
    pub fn from_observations(observations: &[Observation], kecamatan: &Selection) -> Self {
        Self {
            kecamatan: unique(observations.iter().map(|o| o.kecamatan.as_deref())),
            desa: unique(
                observations
                    .iter()
                    .filter(|o| kecamatan.matches(o.kecamatan.as_deref()))
                    .map(|o| o.desa.as_deref()),
            ),
            opt: unique(observations.iter().map(|o| o.opt.as_deref())),
            bulan: unique(observations.iter().map(|o| o.bulan.as_deref())),
            metrics: Metric::all().to_vec(),
        }
    }

    /// Whether the upload offered nothing to filter on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kecamatan.is_empty()
            && self.desa.is_empty()
            && self.opt.is_empty()
            && self.bulan.is_empty()
    }
}

fn unique<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(kecamatan: &str, desa: &str, opt: Option<&str>) -> Observation {
        Observation {
            kecamatan: Some(kecamatan.to_string()),
            desa: Some(desa.to_string()),
            opt: opt.map(str::to_string),
            bulan: Some("Januari".to_string()),
            ..Observation::default()
        }
        .with_key()
    }

    fn sample() -> Vec<Observation> {
        vec![
            observation("Krian", "Terik", Some("Wereng")),
            observation("Krian", "Sidorejo", Some("Tikus")),
            observation("Balongbendo", "Bakung", None),
            observation("Krian", "Sidorejo", Some("Wereng")),
        ]
    }

    #[test]
    fn lists_are_sorted_and_unique() {
        let options = FilterOptions::from_observations(&sample(), &Selection::All);
        assert_eq!(options.kecamatan, vec!["Balongbendo", "Krian"]);
        assert_eq!(options.desa, vec!["Bakung", "Sidorejo", "Terik"]);
        assert_eq!(options.opt, vec!["Tikus", "Wereng"]);
        assert_eq!(options.bulan, vec!["Januari"]);
        assert_eq!(options.metrics, Metric::all());
    }

    #[test]
    fn villages_cascade_from_sub_district() {
        let options =
            FilterOptions::from_observations(&sample(), &Selection::subset(["balongbendo"]));
        assert_eq!(options.desa, vec!["Bakung"]);
        assert_eq!(options.kecamatan.len(), 2);
    }

    #[test]
    fn empty_upload_has_empty_lists() {
        let options = FilterOptions::from_observations(&[], &Selection::All);
        assert!(options.is_empty());
        assert_eq!(options.metrics.len(), 3);
    }
}
