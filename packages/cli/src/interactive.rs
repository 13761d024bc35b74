//! Interactive terminal session.
//!
//! Walks the user through the same steps as the map page: pick an upload,
//! look at its first rows, narrow it down with the five multi-select
//! filters, and render. Every pass re-runs the join and styling from
//! scratch. A failed upload is reported and the previous table stays in
//! use.

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, MultiSelect, Select};
use opt_map_filter::{ALL_LABEL, Dimension, FilterSelection, Selection};
use opt_map_map::RenderMode;
use opt_map_observation::Metric;
use opt_map_observation::preview::{DEFAULT_PREVIEW_ROWS, PreviewTable};

use crate::session::Session;

/// Prompt for the metric multi-select.
const METRICS_PROMPT: &str = "Pilih Data yang Ditampilkan";

/// Runs the interactive loop until the user quits.
///
/// # Errors
///
/// Returns an error if a prompt fails (for example when stdin is not a
/// terminal).
pub fn run(session: &mut Session, out: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Visualisasi Peta Sebaran OPT");
    println!(
        "{} boundaries loaded; export written to {}",
        session.boundaries().len(),
        session.config().boundary.export_path.display()
    );
    println!();

    loop {
        prompt_upload(session)?;

        if session.data_path().is_none() {
            println!("Upload a CSV or Excel file to draw the map.");
        } else {
            println!("{}", session.preview(DEFAULT_PREVIEW_ROWS));
            println!();

            let selection = prompt_filters(session)?;
            let mode = prompt_mode()?;

            let filtered = session.filtered(&selection);
            println!("{}", PreviewTable::new(filtered.iter().copied(), filtered.len()));
            println!();

            match session.render(&selection, mode, out) {
                Ok(layer) => println!(
                    "Map layer with {} features written to {}",
                    layer.features.features.len(),
                    out.display()
                ),
                Err(e) => {
                    log::error!("Rendering failed: {e}");
                    println!("Could not render the map: {e}");
                }
            }
        }

        let again = Confirm::new()
            .with_prompt("Change the upload or filters?")
            .default(true)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}

fn prompt_upload(session: &mut Session) -> Result<(), dialoguer::Error> {
    let current = session
        .data_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    let input: String = Input::new()
        .with_prompt("Upload file Excel/CSV (leave empty to keep the current one)")
        .allow_empty(true)
        .with_initial_text(current)
        .interact_text()?;

    let input = input.trim();
    if input.is_empty() {
        return Ok(());
    }

    let path = PathBuf::from(input);
    match session.load_data(&path) {
        Ok(count) => println!("Data berhasil diupload! ({count} rows)"),
        Err(e) => {
            log::error!("Failed to load {}: {e}", path.display());
            println!("Could not load {}: {e}", path.display());
            if session.data_path().is_some() {
                println!("Keeping the previously loaded data.");
            }
        }
    }
    println!();

    Ok(())
}

fn prompt_filters(session: &Session) -> Result<FilterSelection, dialoguer::Error> {
    let mut selection = FilterSelection::default();

    let kecamatan = session.options(&Selection::All).kecamatan;
    selection.kecamatan = string_selection(choose(Dimension::Kecamatan.label(), &kecamatan)?);

    // Villages cascade from the chosen sub-districts.
    let options = session.options(&selection.kecamatan);
    selection.desa = string_selection(choose(Dimension::Desa.label(), &options.desa)?);
    selection.opt = string_selection(choose(Dimension::Opt.label(), &options.opt)?);

    let metric_labels: Vec<String> = options
        .metrics
        .iter()
        .map(|m| m.column().to_string())
        .collect();
    selection.metrics = match choose(METRICS_PROMPT, &metric_labels)? {
        None => Selection::All,
        Some(picked) => picked
            .iter()
            .filter_map(|label| label.parse::<Metric>().ok())
            .collect(),
    };

    selection.bulan = string_selection(choose(Dimension::Bulan.label(), &options.bulan)?);

    Ok(selection)
}

fn prompt_mode() -> Result<RenderMode, dialoguer::Error> {
    let modes = [RenderMode::FanOut, RenderMode::PerBoundary];
    let labels = [
        "One shape per data row",
        "One shape per village (all rows in the tooltip)",
    ];

    let idx = Select::new()
        .with_prompt("How should villages with several rows be drawn?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(modes[idx])
}

/// Shows a multi-select with a leading "all" entry, checked by default.
/// Returns `None` when the "all" entry is kept, otherwise the picked
/// options (possibly none).
fn choose(prompt: &str, options: &[String]) -> Result<Option<Vec<String>>, dialoguer::Error> {
    let items: Vec<&str> = std::iter::once(ALL_LABEL)
        .chain(options.iter().map(String::as_str))
        .collect();
    let mut defaults = vec![false; items.len()];
    defaults[0] = true;

    let picked = MultiSelect::new()
        .with_prompt(format!("{prompt} (space=toggle, enter=confirm)"))
        .items(&items)
        .defaults(&defaults)
        .max_length(20)
        .interact()?;

    if picked.contains(&0) {
        return Ok(None);
    }

    Ok(Some(
        picked.into_iter().map(|i| options[i - 1].clone()).collect(),
    ))
}

fn string_selection(choice: Option<Vec<String>>) -> Selection {
    choice.map_or(Selection::All, Selection::subset)
}
