//! CSV upload reader.

use std::io::Read;

use crate::table::RawTable;

/// Reads a comma-separated upload into a [`RawTable`].
///
/// The first record is the header row. Rows may have a different number
/// of fields than the header. An empty input yields an empty table.
///
/// # Errors
///
/// Returns [`csv::Error`] on malformed CSV or invalid UTF-8.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Ok(RawTable::default());
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    log::debug!("Parsed {} CSV rows", rows.len());

    Ok(RawTable { headers, rows })
}
