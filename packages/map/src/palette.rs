//! Categorical colours for sub-districts.
//!
//! `tab20` is resampled to one entry per distinct sub-district, taking
//! evenly spaced colours across the palette the way matplotlib's
//! `get_cmap("tab20", n)` does. Colours are assigned by position in the
//! *sorted* list of sub-district keys, so the same boundary layer always
//! yields the same colouring regardless of feature order.

use std::collections::{BTreeMap, BTreeSet};

use opt_map_region_models::Boundary;

/// The 20-colour `tab20` categorical palette.
pub const TAB20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Mapping from normalized sub-district key to fill colour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubDistrictColors {
    colors: BTreeMap<String, &'static str>,
}

impl SubDistrictColors {
    /// Assigns colours to the distinct sub-district keys of `boundaries`.
    /// With more than twenty sub-districts neighbouring keys share colours.
    #[must_use]
    pub fn from_boundaries(boundaries: &[Boundary]) -> Self {
        let keys: BTreeSet<&str> = boundaries
            .iter()
            .filter_map(|b| b.key.kecamatan.as_deref())
            .collect();

        if keys.len() > TAB20.len() {
            log::warn!(
                "{} sub-districts share a {}-colour palette; colours repeat",
                keys.len(),
                TAB20.len()
            );
        }

        let count = keys.len();
        Self {
            colors: keys
                .into_iter()
                .enumerate()
                .map(|(i, key)| (key.to_string(), TAB20[sample_index(i, count)]))
                .collect(),
        }
    }

    /// Colour assigned to a normalized sub-district key.
    #[must_use]
    pub fn get(&self, kecamatan: Option<&str>) -> Option<&'static str> {
        kecamatan.and_then(|k| self.colors.get(k).copied())
    }

    /// Number of coloured sub-districts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no sub-district has a colour.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Palette index of sample `i` out of `n` evenly spaced samples over
/// `[0, 1]`, truncated onto the twenty colours.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn sample_index(i: usize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }

    let position = if i + 1 == n {
        1.0
    } else {
        i as f64 * (1.0 / (n - 1) as f64)
    };
    ((position * TAB20.len() as f64) as usize).min(TAB20.len() - 1)
}
