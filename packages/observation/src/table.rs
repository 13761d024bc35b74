//! Format-independent table shape and conversion into observations.

use std::collections::BTreeMap;

use opt_map_observation_models::{
    COLUMN_BULAN, COLUMN_DESA, COLUMN_KECAMATAN, COLUMN_OPT, Metric, Observation,
    REQUIRED_COLUMNS,
};

use crate::DataShapeError;

/// A header row plus data rows of cell text, as read from either upload
/// format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Header cells, trimmed.
    pub headers: Vec<String>,
    /// Data rows. Rows may be shorter than the header.
    pub rows: Vec<Vec<String>>,
}

/// Positions of the required columns within a header row.
struct ColumnIndex {
    kecamatan: usize,
    desa: usize,
    opt: usize,
    bulan: usize,
    metrics: [usize; 3],
    extra: Vec<(usize, String)>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, DataShapeError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| (*name).to_string())
            .collect();

        let (
            Some(kecamatan),
            Some(desa),
            Some(opt),
            Some(bulan),
            Some(serangan),
            Some(pengendalian),
            Some(puso),
        ) = (
            find(COLUMN_KECAMATAN),
            find(COLUMN_DESA),
            find(COLUMN_OPT),
            find(COLUMN_BULAN),
            find(Metric::Serangan.column()),
            find(Metric::Pengendalian.column()),
            find(Metric::Puso.column()),
        )
        else {
            return Err(DataShapeError::MissingColumns { columns: missing });
        };

        let metrics = [serangan, pengendalian, puso];
        let required = [kecamatan, desa, opt, bulan, serangan, pengendalian, puso];

        let extra = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| !required.contains(i) && !h.trim().is_empty())
            .map(|(i, h)| (i, h.trim().to_string()))
            .collect();

        Ok(Self {
            kecamatan,
            desa,
            opt,
            bulan,
            metrics,
            extra,
        })
    }
}

/// Converts a raw table into observations.
///
/// A table without a header row (an empty upload) yields no observations.
/// Blank cells become `None`.
///
/// # Errors
///
/// Returns [`DataShapeError::MissingColumns`] if a required column is
/// absent and [`DataShapeError::InvalidNumber`] if a metric cell does not
/// hold a number.
pub fn observations_from_table(table: &RawTable) -> Result<Vec<Observation>, DataShapeError> {
    if table.headers.is_empty() {
        log::warn!("Upload has no header row; treating it as empty");
        return Ok(Vec::new());
    }

    let columns = ColumnIndex::resolve(&table.headers)?;
    let mut observations = Vec::with_capacity(table.rows.len());

    for (row, cells) in table.rows.iter().enumerate() {
        if cells.iter().all(|c| c.trim().is_empty()) {
            log::debug!("Skipping blank row {}", row + 1);
            continue;
        }

        let text = |i: usize| cell_text(cells, i);

        let mut metrics = [None; 3];
        for (slot, (metric, &i)) in metrics
            .iter_mut()
            .zip(Metric::all().iter().zip(&columns.metrics))
        {
            *slot = parse_metric(cells.get(i).map_or("", String::as_str)).map_err(|value| {
                DataShapeError::InvalidNumber {
                    row: row + 1,
                    column: metric.column().to_string(),
                    value,
                }
            })?;
        }
        let [serangan, pengendalian, puso] = metrics;

        let extra: BTreeMap<String, String> = columns
            .extra
            .iter()
            .map(|(i, header)| (header.clone(), text(*i).unwrap_or_default()))
            .collect();

        observations.push(
            Observation {
                row,
                kecamatan: text(columns.kecamatan),
                desa: text(columns.desa),
                opt: text(columns.opt),
                bulan: text(columns.bulan),
                serangan,
                pengendalian,
                puso,
                extra,
                ..Observation::default()
            }
            .with_key(),
        );
    }

    Ok(observations)
}

fn cell_text(cells: &[String], index: usize) -> Option<String> {
    cells
        .get(index)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Parses a metric cell. Blank means missing; a lone comma is accepted as
/// the decimal separator. Returns the raw text on failure.
fn parse_metric(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let candidate = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    candidate
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| trimmed.to_string())
}
