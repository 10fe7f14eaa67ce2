//! # Meadow
//!
//! Headless driver for the Meadow terrain crates.
//!
//! Flies a camera across the isometric grass/water world, streaming chunks
//! in and out of the cache, and logs what the renderer would receive.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod minimap;
mod sink;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::RunOptions;
use crate::config::{EngineConfig, CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "meadow")]
#[command(about = "Stream procedurally generated isometric grass/water terrain")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// World seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<String>,

    /// Number of camera steps (overrides the config file)
    #[arg(long)]
    steps: Option<u32>,

    /// Print an ASCII minimap of this radius around the final camera tile
    #[arg(long)]
    minimap: Option<u32>,

    /// Disable edge and corner variants
    #[arg(long)]
    no_smoothing: bool,

    /// Flip smoothing before the given step
    #[arg(long)]
    toggle_smoothing_at: Option<u32>,

    /// Write the effective config to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Log filter directive (e.g. "meadow=debug")
    #[arg(long)]
    log: Option<String>,
}

/// Main entry point.
fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let directive = args.log.as_deref().unwrap_or("meadow=info");
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    info!("Meadow starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = EngineConfig::load_or_default(&args.config);
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if args.no_smoothing {
        config.world.smoothing = false;
    }
    config.validate()?;

    if let Some(path) = args.write_config {
        config.save_to(&path)?;
        return Ok(());
    }

    app::run(
        &config,
        RunOptions {
            minimap_radius: args.minimap,
            toggle_smoothing_at: args.toggle_smoothing_at,
        },
    )?;

    info!("Meadow shutdown complete");
    Ok(())
}
