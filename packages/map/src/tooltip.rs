//! Tooltip field configuration.

use opt_map_filter::FilterSelection;
use opt_map_observation_models::{COLUMN_BULAN, COLUMN_OPT, Metric};
use serde::{Deserialize, Serialize};

use crate::join::JoinedRecord;

/// Property holding a feature's normalized village key.
pub const DESA_JOIN: &str = "DESA_JOIN";
/// Property holding a feature's normalized sub-district key.
pub const KECAMATAN_JOIN: &str = "KECAMATAN_JOIN";

/// One tooltip line: the feature property to show and its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipField {
    /// Feature property name.
    pub field: String,
    /// Label shown before the value.
    pub alias: String,
}

impl TooltipField {
    fn new(field: &str, alias: &str) -> Self {
        Self {
            field: field.to_string(),
            alias: alias.to_string(),
        }
    }
}

/// Tooltip lines for the active selection: village, sub-district, pest,
/// and month, then the selected metrics in canonical order.
#[must_use]
pub fn tooltip_fields(selection: &FilterSelection) -> Vec<TooltipField> {
    let mut fields = vec![
        TooltipField::new(DESA_JOIN, "Desa:"),
        TooltipField::new(KECAMATAN_JOIN, "Kecamatan:"),
        TooltipField::new(COLUMN_OPT, "OPT:"),
        TooltipField::new(COLUMN_BULAN, "Bulan:"),
    ];
    fields.extend(
        selection
            .displayed_metrics()
            .into_iter()
            .map(|m| TooltipField::new(m.column(), m.alias())),
    );
    fields
}

/// Tooltip values of one joined row, keyed by field name.
#[must_use]
pub fn tooltip_values(
    record: &JoinedRecord<'_>,
    fields: &[TooltipField],
) -> serde_json::Map<String, serde_json::Value> {
    let observation = record.observation;
    let text = |v: Option<&str>| v.map_or(serde_json::Value::Null, serde_json::Value::from);

    fields
        .iter()
        .map(|f| {
            let value = match f.field.as_str() {
                DESA_JOIN => text(record.boundary.key.desa.as_deref()),
                KECAMATAN_JOIN => text(record.boundary.key.kecamatan.as_deref()),
                COLUMN_OPT => text(observation.and_then(|o| o.opt.as_deref())),
                COLUMN_BULAN => text(observation.and_then(|o| o.bulan.as_deref())),
                other => other
                    .parse::<Metric>()
                    .ok()
                    .and_then(|m| observation.and_then(|o| m.value(o)))
                    .map_or(serde_json::Value::Null, serde_json::Value::from),
            };
            (f.field.clone(), value)
        })
        .collect()
}
