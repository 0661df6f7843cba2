#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Firefly Maze session.

mod config;
mod driver;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::driver::Simulation;

const DEFAULT_LOG_FILTER: &str = "info";

/// Headless Firefly Maze simulation.
#[derive(Debug, Parser)]
#[command(author, version, about = "Headless Firefly Maze simulation", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed overriding `[simulation] seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u32>,

    /// Simulated milliseconds per tick.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Tracing filter directive; falls back to `RUST_LOG`, then `info`.
    #[arg(long)]
    log_filter: Option<String>,

    /// Print the final maze layout.
    #[arg(long, default_value_t = false)]
    print_map: bool,
}

/// Entry point for the Firefly Maze command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_filter.as_deref())?;

    let mut settings = config::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        settings.simulation.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        settings.simulation.ticks = ticks;
    }
    if let Some(tick_ms) = args.tick_ms {
        settings.simulation.tick_ms = tick_ms;
    }

    let mut simulation = Simulation::new(&settings).context("failed to start simulation")?;
    info!(
        seed = settings.simulation.seed,
        ticks = settings.simulation.ticks,
        "simulation started"
    );
    let report = simulation.run(settings.simulation.ticks);

    println!(
        "session {:?} after {} ticks: {} layouts, {} failed regenerations, {} respawns, {} agent faults",
        report.session, report.ticks, report.layouts, report.failures, report.respawns, report.faults
    );
    println!(
        "player at {}, {} fireflies in the lamp",
        simulation.player_position(),
        simulation.lamp_count()
    );
    if args.print_map {
        if let Some(map) = simulation.map() {
            print!("{map}");
        }
    }
    Ok(())
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow!(error))
}
