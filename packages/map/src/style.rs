//! Per-feature style decision.
//!
//! With no gating filter active every feature is drawn in its
//! sub-district colour ("overview"). Once a filter is active, features
//! passing it are drawn bold ("highlighted") and the rest fade to grey
//! ("dimmed"). The decision is a pure function of the feature's fields and
//! the selection.

use opt_map_filter::{FilterFields, FilterSelection};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::palette::SubDistrictColors;

/// Border colour for every feature.
pub const BORDER_COLOR: &str = "black";
/// Fill for overview features whose sub-district has no colour.
pub const OVERVIEW_FALLBACK_FILL: &str = "lightblue";
/// Fill for highlighted features whose sub-district has no colour.
pub const HIGHLIGHT_FALLBACK_FILL: &str = "#ffcc00";
/// Fill for dimmed features.
pub const DIMMED_FILL: &str = "lightgray";

/// How a feature is drawn.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StyleMode {
    /// No filter active.
    Overview,
    /// Filter active and the feature passes it.
    Highlighted,
    /// Filter active and the feature does not pass it.
    Dimmed,
}

/// Leaflet-style path options for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Fill colour.
    pub fill_color: String,
    /// Border colour.
    pub color: String,
    /// Border weight in pixels.
    pub weight: f64,
    /// Fill opacity in `0.0..=1.0`.
    pub fill_opacity: f64,
}

/// Classifies a feature as overview, highlighted, or dimmed.
#[must_use]
pub fn classify(fields: FilterFields<'_>, selection: &FilterSelection) -> StyleMode {
    if !selection.is_active() {
        StyleMode::Overview
    } else if selection.passes(fields) {
        StyleMode::Highlighted
    } else {
        StyleMode::Dimmed
    }
}

/// Builds the style for a feature in `mode`. `kecamatan` is the feature's
/// normalized sub-district key.
#[must_use]
pub fn style_for(mode: StyleMode, kecamatan: Option<&str>, colors: &SubDistrictColors) -> Style {
    let (fill, weight, fill_opacity) = match mode {
        StyleMode::Overview => (
            colors.get(kecamatan).unwrap_or(OVERVIEW_FALLBACK_FILL),
            1.0,
            0.6,
        ),
        StyleMode::Highlighted => (
            colors.get(kecamatan).unwrap_or(HIGHLIGHT_FALLBACK_FILL),
            0.5,
            0.9,
        ),
        StyleMode::Dimmed => (DIMMED_FILL, 0.5, 0.2),
    };

    Style {
        fill_color: fill.to_string(),
        color: BORDER_COLOR.to_string(),
        weight,
        fill_opacity,
    }
}

/// Classifies and styles a feature in one step.
#[must_use]
pub fn style(
    fields: FilterFields<'_>,
    selection: &FilterSelection,
    colors: &SubDistrictColors,
) -> (StyleMode, Style) {
    let mode = classify(fields, selection);
    (mode, style_for(mode, fields.kecamatan, colors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;
    use opt_map_filter::Selection;
    use opt_map_region_models::Boundary;

    fn colors() -> SubDistrictColors {
        SubDistrictColors::from_boundaries(&[Boundary::new(
            0,
            Some("Sidorejo".to_string()),
            Some("Krian".to_string()),
            MultiPolygon(vec![]),
            serde_json::Map::new(),
        )])
    }

    const TIKUS: FilterFields<'static> = FilterFields {
        kecamatan: Some("KRIAN"),
        desa: Some("SIDOREJO"),
        opt: Some("Tikus"),
        bulan: Some("Januari"),
    };

    #[test]
    fn overview_without_filters() {
        let (mode, style) = style(TIKUS, &FilterSelection::default(), &colors());
        assert_eq!(mode, StyleMode::Overview);
        assert_eq!(style.fill_color, "#1f77b4");
        assert_eq!(style.color, "black");
        assert!((style.weight - 1.0).abs() < f64::EPSILON);
        assert!((style.fill_opacity - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn non_matching_feature_is_dimmed() {
        let selection = FilterSelection {
            opt: Selection::subset(["Wereng"]),
            ..FilterSelection::default()
        };
        let (mode, style) = style(TIKUS, &selection, &colors());
        assert_eq!(mode, StyleMode::Dimmed);
        assert_eq!(style.fill_color, DIMMED_FILL);
        assert!((style.fill_opacity - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn matching_feature_is_highlighted() {
        let selection = FilterSelection {
            opt: Selection::subset(["tikus"]),
            ..FilterSelection::default()
        };
        let (mode, style) = style(TIKUS, &selection, &colors());
        assert_eq!(mode, StyleMode::Highlighted);
        assert_eq!(style.fill_color, "#1f77b4");
        assert!((style.weight - 0.5).abs() < f64::EPSILON);
        assert!((style.fill_opacity - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn uncoloured_sub_district_uses_fallbacks() {
        let fields = FilterFields {
            kecamatan: Some("TULANGAN"),
            ..TIKUS
        };
        assert_eq!(
            style_for(StyleMode::Overview, fields.kecamatan, &colors()).fill_color,
            OVERVIEW_FALLBACK_FILL
        );
        assert_eq!(
            style_for(StyleMode::Highlighted, fields.kecamatan, &colors()).fill_color,
            HIGHLIGHT_FALLBACK_FILL
        );
    }

    #[test]
    fn decision_is_deterministic() {
        let selection = FilterSelection {
            bulan: Selection::subset(["Januari"]),
            ..FilterSelection::default()
        };
        let first = style(TIKUS, &selection, &colors());
        let second = style(TIKUS, &selection, &colors());
        assert_eq!(first, second);
    }

    #[test]
    fn serializes_with_leaflet_names() {
        let style = style_for(StyleMode::Dimmed, None, &SubDistrictColors::default());
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["fillColor"], "lightgray");
        assert_eq!(json["fillOpacity"], 0.2);
        assert_eq!(StyleMode::Highlighted.to_string(), "highlighted");
    }
}
