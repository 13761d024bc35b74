//! Plain-text tabular preview of observations.

use std::collections::BTreeSet;
use std::fmt;

use opt_map_observation_models::{
    COLUMN_BULAN, COLUMN_DESA, COLUMN_KECAMATAN, COLUMN_OPT, Metric, Observation,
};

/// Number of rows shown by default, matching a dataframe `head()`.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// A rendered slice of the observation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTable {
    /// Column headers: the required columns followed by any extra columns.
    pub columns: Vec<String>,
    /// Cell text per row.
    pub rows: Vec<Vec<String>>,
    /// Total number of observations the preview was taken from.
    pub total: usize,
}

impl PreviewTable {
    /// Builds a preview of the first `limit` observations.
    #[must_use]
    pub fn new<'a, I>(observations: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let observations: Vec<&Observation> = observations.into_iter().collect();

        let extra: BTreeSet<&str> = observations
            .iter()
            .flat_map(|o| o.extra.keys().map(String::as_str))
            .collect();

        let mut columns: Vec<String> = [COLUMN_KECAMATAN, COLUMN_DESA, COLUMN_OPT, COLUMN_BULAN]
            .into_iter()
            .chain(Metric::all().iter().map(|m| m.column()))
            .map(str::to_string)
            .collect();
        columns.extend(extra.iter().map(|c| (*c).to_string()));

        let rows = observations
            .iter()
            .take(limit)
            .map(|o| {
                let mut cells = vec![
                    o.kecamatan.clone().unwrap_or_default(),
                    o.desa.clone().unwrap_or_default(),
                    o.opt.clone().unwrap_or_default(),
                    o.bulan.clone().unwrap_or_default(),
                ];
                cells.extend(
                    Metric::all()
                        .iter()
                        .map(|m| m.value(o).map(format_number).unwrap_or_default()),
                );
                cells.extend(
                    extra
                        .iter()
                        .map(|c| o.extra.get(*c).cloned().unwrap_or_default()),
                );
                cells
            })
            .collect();

        Self {
            columns,
            rows,
            total: observations.len(),
        }
    }
}

/// Formats a metric without a trailing `.0` for whole values.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

impl fmt::Display for PreviewTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let write_row = |f: &mut fmt::Formatter<'_>, cells: &[String]| -> fmt::Result {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect();
            writeln!(f, "{}", line.join(" | ").trim_end())
        };

        write_row(f, &self.columns)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &self.rows {
            write_row(f, row)?;
        }
        write!(f, "({} of {} rows)", self.rows.len(), self.total)
    }
}
