//! Tagged multi-select values.
//!
//! "Everything" is its own variant rather than a sentinel string mixed into
//! the value domain, so a village literally named "Semua" is still just a
//! village.

use std::collections::BTreeSet;

use opt_map_observation_models::Metric;
use opt_map_region_models::normalize_key;
use serde::{Deserialize, Serialize};

/// Label shown for the "everything" entry of a multi-select.
pub const ALL_LABEL: &str = "Semua";

/// A multi-select filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T: Ord = String> {
    /// No restriction.
    All,
    /// Only the listed values. An empty subset matches nothing.
    Subset(BTreeSet<T>),
}

impl<T: Ord> Default for Selection<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: Ord> Selection<T> {
    /// Whether this selection places no restriction.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether `value` is selected.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Subset(values) => values.contains(value),
        }
    }
}

impl Selection<String> {
    /// Builds a subset of region or category names, normalized the same
    /// way as join keys. Blank entries are dropped.
    #[must_use]
    pub fn subset<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Subset(
            values
                .into_iter()
                .filter_map(|v| normalize_key(v.as_ref()))
                .collect(),
        )
    }

    /// Whether a raw field value passes this selection.
    ///
    /// Comparison uses the normalized form of `value`. A missing value
    /// passes only [`Selection::All`].
    #[must_use]
    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Subset(values) => value
                .and_then(normalize_key)
                .is_some_and(|v| values.contains(&v)),
        }
    }
}

impl Selection<Metric> {
    /// Selected metrics in canonical order.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        Metric::all()
            .iter()
            .copied()
            .filter(|m| self.contains(m))
            .collect()
    }
}

impl<T: Ord> FromIterator<T> for Selection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Subset(iter.into_iter().collect())
    }
}
