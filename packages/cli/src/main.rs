#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pest and disease (OPT) distribution map for village boundaries.
//!
//! Loads the village boundary layer, joins it against an uploaded table
//! of OPT observations, and writes a styled `GeoJSON` layer a web map can
//! draw. Runs as one-shot subcommands or as an interactive session
//! (the default).

mod interactive;
mod session;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use opt_map_config::Config;
use opt_map_filter::options::FilterOptions;
use opt_map_filter::{ALL_LABEL, Dimension, FilterSelection, Selection};
use opt_map_map::RenderMode;
use opt_map_observation::preview::{DEFAULT_PREVIEW_ROWS, PreviewTable};
use opt_map_observation::{Metric, load_observations};

use crate::session::Session;

/// Default output path of the styled map layer.
const DEFAULT_LAYER_PATH: &str = "map.geojson";

#[derive(Parser)]
#[command(name = "opt_map", about = "OPT distribution map tool")]
struct Cli {
    /// Config file (defaults to `opt_map.toml` when present)
    #[arg(long, env = "OPT_MAP_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the boundary layer and regenerate its `GeoJSON` export
    Export,
    /// Print the first rows of an upload
    Preview {
        /// CSV or Excel file
        #[arg(long)]
        data: PathBuf,
        /// Number of rows to show
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },
    /// Print the choices each filter offers for an upload
    Options {
        /// CSV or Excel file
        #[arg(long)]
        data: PathBuf,
        /// Sub-districts the village list is limited to
        #[arg(long)]
        kecamatan: Vec<String>,
    },
    /// Filter, join, and write the styled map layer
    Render(RenderArgs),
    /// Step through upload, filters, and rendering (default)
    Interactive {
        /// Output path of the styled layer
        #[arg(long, default_value = DEFAULT_LAYER_PATH)]
        out: PathBuf,
    },
}

/// Filters for `render`. An omitted filter means "all".
#[derive(Args)]
struct RenderArgs {
    /// CSV or Excel file
    #[arg(long)]
    data: PathBuf,
    /// Sub-district to keep (repeatable)
    #[arg(long)]
    kecamatan: Vec<String>,
    /// Village to keep (repeatable)
    #[arg(long)]
    desa: Vec<String>,
    /// Pest/disease type to keep (repeatable)
    #[arg(long)]
    opt: Vec<String>,
    /// Month to keep (repeatable)
    #[arg(long)]
    bulan: Vec<String>,
    /// Metric to show in tooltips: Serangan, Pengendalian or Puso (repeatable)
    #[arg(long)]
    metric: Vec<Metric>,
    /// Draw one shape per village instead of one per data row
    #[arg(long)]
    per_boundary: bool,
    /// Rows of the filtered table to print
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    rows: usize,
    /// Output path of the styled layer
    #[arg(long, default_value = DEFAULT_LAYER_PATH)]
    out: PathBuf,
}

impl RenderArgs {
    fn selection(&self) -> FilterSelection {
        FilterSelection {
            kecamatan: flag_selection(&self.kecamatan),
            desa: flag_selection(&self.desa),
            opt: flag_selection(&self.opt),
            bulan: flag_selection(&self.bulan),
            metrics: if self.metric.is_empty() {
                Selection::All
            } else {
                self.metric.iter().copied().collect()
            },
        }
    }

    const fn mode(&self) -> RenderMode {
        if self.per_boundary {
            RenderMode::PerBoundary
        } else {
            RenderMode::FanOut
        }
    }
}

fn flag_selection(values: &[String]) -> Selection {
    if values.is_empty() {
        Selection::All
    } else {
        Selection::subset(values)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logger();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Export) => {
            let session = Session::start(config)?;
            println!(
                "Exported {} boundaries to {}",
                session.boundaries().len(),
                session.config().boundary.export_path.display()
            );
        }
        Some(Commands::Preview { data, rows }) => {
            let observations = load_observations(&data)?;
            println!("{}", PreviewTable::new(&observations, rows));
        }
        Some(Commands::Options { data, kecamatan }) => {
            let observations = load_observations(&data)?;
            let options =
                FilterOptions::from_observations(&observations, &flag_selection(&kecamatan));
            print_options(&options);
        }
        Some(Commands::Render(args)) => render(config, &args)?,
        Some(Commands::Interactive { out }) => {
            interactive::run(&mut Session::start(config)?, &out)?;
        }
        None => interactive::run(&mut Session::start(config)?, Path::new(DEFAULT_LAYER_PATH))?,
    }

    Ok(())
}

/// Initializes `pretty_env_logger` at `info` unless `RUST_LOG` says
/// otherwise.
fn init_logger() {
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();
}

fn render(config: Config, args: &RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::start(config)?;
    session.load_data(&args.data)?;

    let selection = args.selection();
    let filtered = session.filtered(&selection);
    println!("{}", PreviewTable::new(filtered.iter().copied(), args.rows));
    println!();

    let layer = session.render(&selection, args.mode(), &args.out)?;
    println!(
        "Wrote {} features to {}",
        layer.features.features.len(),
        args.out.display()
    );
    for (mode, count) in &layer.counts {
        println!("  {mode}: {count}");
    }

    Ok(())
}

fn print_options(options: &FilterOptions) {
    let line = |label: &str, values: &[String]| {
        let values: Vec<&str> = std::iter::once(ALL_LABEL)
            .chain(values.iter().map(String::as_str))
            .collect();
        println!("{label}: {}", values.join(", "));
    };

    line(Dimension::Kecamatan.label(), &options.kecamatan);
    line(Dimension::Desa.label(), &options.desa);
    line(Dimension::Opt.label(), &options.opt);
    line(Dimension::Bulan.label(), &options.bulan);

    let metrics: Vec<String> = options
        .metrics
        .iter()
        .map(|m| m.column().to_string())
        .collect();
    line("Metrics", &metrics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["opt_map"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn omitted_render_filters_mean_all() {
        let cli = Cli::try_parse_from(["opt_map", "render", "--data", "data.csv"]).unwrap();
        let Some(Commands::Render(args)) = cli.command else {
            panic!("expected render");
        };

        assert_eq!(args.selection(), FilterSelection::default());
        assert_eq!(args.mode(), RenderMode::FanOut);
        assert_eq!(args.out, Path::new(DEFAULT_LAYER_PATH));
    }

    #[test]
    fn render_flags_build_selection() {
        let cli = Cli::try_parse_from([
            "opt_map",
            "render",
            "--data",
            "data.csv",
            "--opt",
            "Wereng",
            "--opt",
            "tikus",
            "--metric",
            "puso",
            "--per-boundary",
        ])
        .unwrap();
        let Some(Commands::Render(args)) = cli.command else {
            panic!("expected render");
        };

        let selection = args.selection();
        assert_eq!(selection.opt, Selection::subset(["WERENG", "TIKUS"]));
        assert!(selection.kecamatan.is_all());
        assert_eq!(selection.displayed_metrics(), vec![Metric::Puso]);
        assert_eq!(args.mode(), RenderMode::PerBoundary);
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert!(
            Cli::try_parse_from(["opt_map", "render", "--data", "d.csv", "--metric", "Panen"])
                .is_err()
        );
    }
}
