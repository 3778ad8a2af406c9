//! Headless runner for the Forage ecosystem simulator.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use forage_core::SimulationConfig;
use forage_world::Simulation;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "forage-runner",
    version,
    about = "Run the foraging ecosystem simulation without a display"
)]
struct Cli {
    /// JSON configuration file; missing fields take their defaults.
    #[arg(short, long, env = "FORAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Number of ticks to run.
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Override the configured random seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop as soon as the population dies out.
    #[arg(long)]
    stop_on_extinction: bool,

    /// Write the final world snapshot as JSON to this path.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_telemetry(cli.log_json)?;

    let config = load_config(&cli)?;
    info!(
        seed = config.seed,
        ticks = cli.ticks,
        population = config.population.initial_size,
        food_slots = config.food.capacity,
        "Starting Forage runner"
    );

    let mut simulation = Simulation::new(config).context("invalid simulation configuration")?;
    let summary = simulation.run(cli.ticks);

    if let Some(path) = &cli.snapshot {
        let json = serde_json::to_string_pretty(&simulation.snapshot())?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        info!(path = %path.display(), "Snapshot written");
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.stop_on_extinction {
        config.stop_on_extinction = true;
    }

    Ok(config)
}
