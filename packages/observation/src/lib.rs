#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Observation table loading.
//!
//! Reads a user-uploaded table of pest/disease observations from CSV or a
//! spreadsheet workbook (first worksheet), checks that the required
//! columns are present, and produces [`Observation`] records with their
//! normalized join keys.

pub mod csv_table;
pub mod preview;
pub mod spreadsheet;
pub mod table;

use std::path::Path;

use thiserror::Error;

pub use opt_map_observation_models::{Metric, Observation, REQUIRED_COLUMNS};

/// The upload does not have the shape the application expects.
#[derive(Debug, Error)]
pub enum DataShapeError {
    /// One or more required columns are missing from the header row.
    #[error("Missing required column(s): {}", columns.join(", "))]
    MissingColumns {
        /// The missing column names.
        columns: Vec<String>,
    },

    /// A metric cell is neither blank nor a number.
    #[error("Row {row}: column '{column}' is not a number: '{value}'")]
    InvalidNumber {
        /// One-based data row (the header is not counted).
        row: usize,
        /// Column header.
        column: String,
        /// The offending cell content.
        value: String,
    },

    /// The workbook contains no worksheet.
    #[error("Workbook contains no worksheet")]
    NoWorksheet,
}

/// Errors that can occur while loading an observation upload.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed (including invalid UTF-8).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The spreadsheet could not be opened or read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The file extension is not a supported upload format.
    #[error("Unsupported upload format: '{extension}' (expected csv or xlsx)")]
    UnsupportedFormat {
        /// The offending extension (empty when the path has none).
        extension: String,
    },

    /// The table is missing columns or holds malformed values.
    #[error(transparent)]
    DataShape(#[from] DataShapeError),
}

/// Upload encodings this loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    /// Comma-separated values.
    Csv,
    /// Spreadsheet workbook (`xlsx`, `xlsm`, `xls`, `ods`).
    Spreadsheet,
}

impl UploadFormat {
    /// Determines the format from a file path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(LoadError::UnsupportedFormat { extension }),
        }
    }
}

/// Loads observations from an uploaded file.
///
/// # Errors
///
/// Returns [`LoadError`] if the format is unsupported, the file cannot be
/// read, or the table does not have the required shape.
pub fn load_observations(path: &Path) -> Result<Vec<Observation>, LoadError> {
    let format = UploadFormat::from_path(path)?;
    log::info!("Loading observations from {}", path.display());

    let table = match format {
        UploadFormat::Csv => csv_table::read_csv(std::fs::File::open(path)?)?,
        UploadFormat::Spreadsheet => spreadsheet::read_first_sheet(path)?,
    };

    let observations = table::observations_from_table(&table)?;
    log::info!(
        "Loaded {} observations from {}",
        observations.len(),
        path.display()
    );
    Ok(observations)
}
