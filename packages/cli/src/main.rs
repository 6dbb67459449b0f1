#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the bike accident map.
//!
//! Loads the configured source once, tags every accident with its
//! bike-lane status, then answers one query per subcommand. With no
//! subcommand it drops into an interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`bike_map_cli_utils::init_logger`])
//! so log lines and the loading progress bar share the terminal.

mod interactive;

use std::path::{Path, PathBuf};

use bike_map_accident_models::CategoryKey;
use bike_map_analytics_models::DensityStrategyKind;
use bike_map_app::AppState;
use bike_map_cli_utils::{IndicatifProgress, MultiProgress};
use bike_map_filter::FilterSelection;
use bike_map_source::registry::{all_sources, resolve_definition};
use bike_map_source::source_def::SourceDefinition;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "bike_map", about = "Montreal bicycle accident map engine")]
struct Cli {
    /// Source definition TOML (defaults to `BIKE_MAP_CONFIG`, then the built-in Montreal source)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Lane buffer radius in meters
    #[arg(long, global = true)]
    buffer_meters: Option<f64>,
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Density overrides shared by the analysis subcommands.
#[derive(Args, Clone, Default)]
struct DensityArgs {
    /// Densest-cluster algorithm: grid, pairwise or auto
    #[arg(long)]
    strategy: Option<DensityStrategyKind>,
    /// Grid cell size in meters
    #[arg(long)]
    cell_meters: Option<f64>,
    /// Pairwise neighbor radius in meters
    #[arg(long)]
    radius_meters: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag every accident and write the tagged `GeoJSON` collection
    Classify {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the densest cluster of the filtered accidents
    Hotspot {
        /// Filter, e.g. "severity=fatal,injury;weather=rain"
        #[arg(long)]
        filter: Option<String>,
        #[command(flatten)]
        density: DensityArgs,
    },
    /// Write heat-map points for the filtered accidents
    Heat {
        /// Filter, e.g. "`bike_lane=on_lane`"
        #[arg(long)]
        filter: Option<String>,
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
    /// Print per-label counts of the filtered accidents
    Summary {
        /// Filter, e.g. "lighting=night_unlit"
        #[arg(long)]
        filter: Option<String>,
        /// Category to count (every category if omitted)
        #[arg(long)]
        by: Option<CategoryKey>,
    },
    /// Write a full map snapshot (markers, heat, densest cluster) for a renderer
    View {
        /// Filter, e.g. "severity=fatal"
        #[arg(long)]
        filter: Option<String>,
        /// Category markers are colored by
        #[arg(long)]
        color_by: Option<CategoryKey>,
        #[command(flatten)]
        density: DensityArgs,
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
    /// List the built-in sources
    Sources,
    /// Interactive menu (default)
    Interactive,
}

/// Reads the source definition and applies command-line overrides.
fn definition(
    cli_config: Option<&Path>,
    buffer_meters: Option<f64>,
    density: &DensityArgs,
) -> Result<SourceDefinition, Box<dyn std::error::Error>> {
    let mut def = resolve_definition(cli_config)?;
    let analysis = &mut def.analysis;

    if let Some(radius) = buffer_meters {
        analysis.buffer_radius_meters = radius;
    }
    if let Some(strategy) = density.strategy {
        analysis.density_strategy = strategy;
    }
    if let Some(cell) = density.cell_meters {
        analysis.grid_cell_meters = cell;
    }
    if let Some(radius) = density.radius_meters {
        analysis.pairwise_radius_meters = radius;
    }

    log::debug!("Using source '{}' ({})", def.id, def.name);
    Ok(def)
}

/// Loads and tags the source, with a progress bar.
async fn load(multi: &MultiProgress, definition: SourceDefinition) -> AppState {
    let progress = IndicatifProgress::records_bar(multi, &format!("Loading {}", definition.name));
    AppState::load(definition, progress.as_ref()).await
}

fn parse_filter(filter: Option<&str>) -> Result<FilterSelection, Box<dyn std::error::Error>> {
    Ok(match filter {
        Some(filter) => FilterSelection::parse(filter)?,
        None => FilterSelection::new(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = bike_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let command = cli.command.unwrap_or(Commands::Interactive);

    match command {
        Commands::Sources => {
            println!("{:<20} NAME", "ID");
            println!("{}", "-".repeat(50));
            for source in all_sources() {
                println!("{:<20} {}", source.id, source.name);
            }
        }
        Commands::Classify { out } => {
            let def = definition(config, cli.buffer_meters, &DensityArgs::default())?;
            let state = load(&multi, def).await;
            let report = state.data()?.tag_report;
            write_json(&out, &state.tagged_collection()?)?;
            println!(
                "{} accidents: {} on bike lanes, {} off, {} without a position",
                report.total, report.on_lane, report.off_lane, report.skipped
            );
        }
        Commands::Hotspot { filter, density } => {
            let selection = parse_filter(filter.as_deref())?;
            let def = definition(config, cli.buffer_meters, &density)?;
            let mut state = load(&multi, def).await;
            state.set_selection(selection);

            match state.densest()? {
                Some(cluster) => println!("{}", serde_json::to_string_pretty(&cluster)?),
                None => println!("none"),
            }
        }
        Commands::Heat { filter, out } => {
            let selection = parse_filter(filter.as_deref())?;
            let def = definition(config, cli.buffer_meters, &DensityArgs::default())?;
            let mut state = load(&multi, def).await;
            state.set_selection(selection);

            let heat = state.heat()?;
            write_json(&out, &heat)?;
            println!("{} heat points", heat.len());
        }
        Commands::Summary { filter, by } => {
            let selection = parse_filter(filter.as_deref())?;
            let def = definition(config, cli.buffer_meters, &DensityArgs::default())?;
            let mut state = load(&multi, def).await;
            state.set_selection(selection);

            let keys = by.map_or_else(|| CategoryKey::all().to_vec(), |key| vec![key]);
            for key in keys {
                let breakdown = state.summary(key)?;
                println!("{} ({} accidents)", key.label(), breakdown.total);
                for count in &breakdown.counts {
                    println!("  {:<28} {:>8}", count.display, count.count);
                }
            }
        }
        Commands::View {
            filter,
            color_by,
            density,
            out,
        } => {
            let selection = parse_filter(filter.as_deref())?;
            let def = definition(config, cli.buffer_meters, &density)?;
            let mut state = load(&multi, def).await;
            state.set_selection(selection);
            state.set_color_by(color_by);

            let view = state.view()?;
            write_json(&out, &view)?;
            println!("{} of {} accidents shown", view.shown, view.total);
        }
        Commands::Interactive => {
            let def = definition(config, cli.buffer_meters, &DensityArgs::default())?;
            let mut state = load(&multi, def).await;
            interactive::run(&mut state)?;
        }
    }

    Ok(())
}
