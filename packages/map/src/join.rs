//! Left join of boundaries to observations.
//!
//! Every boundary appears at least once. A boundary matching several
//! observations (one per month, say) appears once per match, in the
//! observations' input order.

use std::collections::BTreeMap;

use opt_map_filter::FilterFields;
use opt_map_observation_models::Observation;
use opt_map_region_models::{Boundary, RegionKey};

/// A boundary paired with zero or one matching observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinedRecord<'a> {
    /// The boundary.
    pub boundary: &'a Boundary,
    /// The matching observation, if any.
    pub observation: Option<&'a Observation>,
}

impl<'a> JoinedRecord<'a> {
    /// Fields seen by the filter predicate when styling this feature:
    /// region names come from the boundary's join keys, pest and month
    /// from the joined observation.
    #[must_use]
    pub fn filter_fields(&self) -> FilterFields<'a> {
        FilterFields {
            kecamatan: self.boundary.key.kecamatan.as_deref(),
            desa: self.boundary.key.desa.as_deref(),
            opt: self.observation.and_then(|o| o.opt.as_deref()),
            bulan: self.observation.and_then(|o| o.bulan.as_deref()),
        }
    }
}

/// Joins boundaries to observations on `(desa, kecamatan)`.
///
/// Output order follows the boundaries; unmatched boundaries carry no
/// observation.
#[must_use]
pub fn left_join<'a>(
    boundaries: &'a [Boundary],
    observations: &'a [Observation],
) -> Vec<JoinedRecord<'a>> {
    let mut by_key: BTreeMap<&RegionKey, Vec<&Observation>> = BTreeMap::new();
    for observation in observations.iter().filter(|o| o.key.is_complete()) {
        by_key.entry(&observation.key).or_default().push(observation);
    }

    let mut joined = Vec::with_capacity(boundaries.len().max(observations.len()));
    let mut matched = 0usize;

    for boundary in boundaries {
        match by_key.get(&boundary.key).filter(|_| boundary.key.is_complete()) {
            Some(matches) => {
                matched += 1;
                joined.extend(matches.iter().map(|o| JoinedRecord {
                    boundary,
                    observation: Some(*o),
                }));
            }
            None => joined.push(JoinedRecord {
                boundary,
                observation: None,
            }),
        }
    }

    log::info!(
        "Joined {} boundaries ({matched} matched) with {} observations into {} rows",
        boundaries.len(),
        observations.len(),
        joined.len()
    );

    joined
}
