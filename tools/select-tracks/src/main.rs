//! Select Tracks - run the track selector over a declared scenario
//!
//! # Usage
//!
//! ```bash
//! # Print one line per renderer
//! select-tracks tools/select-tracks/scenarios/movie.json
//!
//! # Prefer German audio, print the full result as JSON
//! select-tracks movie.json --parameters german.toml --json
//!
//! # Tune selection constants
//! select-tracks movie.json --config selector.toml -vv
//! ```

mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trackselect_core::capabilities::RendererCapabilities;
use trackselect_core::{DefaultTrackSelector, TrackSelector, TrackSelectorResult};

use scenario::Scenario;

/// Select Tracks - decide which tracks each renderer plays
#[derive(Parser)]
#[command(name = "select-tracks")]
#[command(author, version)]
#[command(about = "Run track selection over a JSON scenario of renderers and track groups")]
struct Args {
    /// Path to the scenario JSON file
    scenario: PathBuf,

    /// Parameters file (.json or .toml), replacing the scenario's parameters
    #[arg(short, long)]
    parameters: Option<PathBuf>,

    /// Selector configuration TOML (default: TRACKSELECT_* environment variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let scenario = Scenario::from_file(&args.scenario)?;
    let parameters = match &args.parameters {
        Some(path) => scenario::load_parameters(path)?,
        None => scenario.parameters.clone().unwrap_or_default(),
    };
    let config = scenario::load_config(args.config.as_deref())?;

    tracing::info!(
        "Selecting from {} groups for {} renderers",
        scenario.groups.len(),
        scenario.renderers.len()
    );

    let selector = DefaultTrackSelector::new(parameters)
        .with_config(config)
        .with_device(scenario.device.clone());
    let renderers = scenario.renderers();
    let result = selector.select_tracks(&renderers, &scenario.groups, &scenario.period);

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{}", json);
    } else {
        print_summary(&renderers, &result);
    }

    Ok(())
}

fn print_summary(renderers: &[&dyn RendererCapabilities], result: &TrackSelectorResult) {
    println!("period {}", result.period_id);
    for (index, renderer) in renderers.iter().enumerate() {
        let Some(config) = result.configuration(index) else {
            println!("[{}] {} ({:?}): disabled", index, renderer.name(), renderer.track_type());
            continue;
        };

        let selection = match result.selection(index) {
            Some(selection) => format!(
                "{} tracks {:?} ({:?})",
                selection.group().id(),
                selection.tracks(),
                selection.kind()
            ),
            None => "nothing selected".to_string(),
        };
        println!(
            "[{}] {} ({:?}): {}, tunneling={}, offload={:?}",
            index,
            renderer.name(),
            renderer.track_type(),
            selection,
            config.tunneling,
            config.offload_mode
        );
    }

    let unmapped = result.mapped_track_info.unmapped_track_groups();
    if !unmapped.is_empty() {
        println!("unmapped groups: {}", unmapped.len());
    }
}
