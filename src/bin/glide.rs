//! glide: run the thermal-soaring search and print `thermals<TAB>velocity`.
//!
//! Usage:
//!   cargo run --release --bin glide -- --thermals 100 --area 1000 --sigma 45
//!   cargo run --release --bin glide -- --sweep 10 50 100 500 --steps 50000

use anyhow::{Context, Result};
use clap::Parser;
use glider_swarm::{setup_logging, sweep_thermal_counts, RunReport, Simulation, SimulationConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glide")]
#[command(about = "Simulate gliders searching a toroidal field of thermals")]
struct Args {
    /// Number of thermals in the field
    #[arg(long)]
    thermals: Option<usize>,

    /// Side length of the square area
    #[arg(long)]
    area: Option<f64>,

    /// Spread of the search heading, in degrees
    #[arg(long)]
    sigma: Option<f64>,

    #[arg(long)]
    agents: Option<usize>,

    #[arg(long)]
    steps: Option<u64>,

    #[arg(long)]
    seed: Option<u64>,

    /// TTL of a learned thermal; 0 remembers forever
    #[arg(long)]
    forget_rate: Option<f64>,

    /// Update gliders in parallel
    #[arg(long)]
    parallel: bool,

    /// JSON config layered under the flags above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run once per listed thermal count instead of once
    #[arg(long, num_args = 1..)]
    sweep: Vec<usize>,

    /// Print each report as a JSON line
    #[arg(long)]
    json: bool,

    #[arg(long)]
    log_level: Option<String>,

    /// Log a state snapshot at debug level every N ticks
    #[arg(long)]
    diagnostics_every: Option<u64>,
}

impl Args {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_path(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(thermals) = self.thermals {
            config.thermal_count = thermals;
        }
        if let Some(area) = self.area {
            config.area_size = area;
        }
        if let Some(sigma) = self.sigma {
            config.sigma_degrees = sigma;
        }
        if let Some(agents) = self.agents {
            config.agent_count = agents;
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rate) = self.forget_rate {
            config.flight.forget_rate = rate;
        }
        config.parallel |= self.parallel;
        Ok(config)
    }
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report).context("serializing run report")?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.log_level.clone());

    let config = args.simulation_config()?;

    if !args.sweep.is_empty() {
        let reports =
            sweep_thermal_counts(&config, &args.sweep).context("invalid sweep configuration")?;
        for report in &reports {
            print_report(report, args.json)?;
        }
        return Ok(());
    }

    let mut sim = Simulation::new(config).context("invalid simulation configuration")?;
    let report = match args.diagnostics_every {
        Some(every) => sim.run_with(|s| s.log_diagnostics(every)),
        None => sim.run(),
    };
    print_report(&report, args.json)
}
