//! Ring election simulator entry point
//!
//! Usage:
//!   hs-simulator 64
//!   hs-simulator 64 --runs 100 --seed 1
//!   hs-simulator --config configs/simulator.toml

use anyhow::{Context, Result};
use clap::Parser;
use hs_simulator::{init_logging, run_simulation, SimulationConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hs-simulator")]
#[command(about = "Simulate Hirschberg-Sinclair leader election on a ring of processes")]
#[command(version)]
struct Args {
    /// Number of processes on the ring
    ring_size: Option<usize>,

    /// Configuration file path (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of elections to run
    #[arg(short, long)]
    runs: Option<usize>,

    /// Seed for reproducible ring arrangements
    #[arg(short, long)]
    seed: Option<u64>,

    /// Abort a run if no leader is elected within this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// File settings (or defaults) with command-line overrides applied
    fn into_config(self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(ring_size) = self.ring_size {
            config.ring_size = ring_size;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.timeout_ms.is_some() {
            config.election_timeout_ms = self.timeout_ms;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config.json_logs |= self.json_logs;

        config.validate().context("Invalid simulation configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().into_config()?;

    init_logging(&config.log_level, config.json_logs)?;

    info!(
        ring_size = config.ring_size,
        runs = config.runs,
        seed = ?config.seed,
        "Starting ring election simulator"
    );

    let stats = run_simulation(&config).await?;

    if let [record] = stats.records.as_slice() {
        println!("Leader: {}", record.leader);
        println!("Number of messages: {}", record.messages);
    } else {
        for record in &stats.records {
            println!(
                "Run {}: leader={} messages={}",
                record.run, record.leader, record.messages
            );
        }
        println!("{}", stats);
    }

    Ok(())
}
