//! Glider Swarm Core - Thermal-Soaring Search Simulation
//!
//! Gliders move over a square, toroidal area scattered with thermals. Each one
//! sinks while searching on randomly drawn headings, climbs inside thermals,
//! remembers the thermals it has used and, when low, flies back to the
//! nearest one it knows. A run reports the mean horizontal velocity the
//! swarm sustained after a warm-up period.

pub mod core;
pub mod swarm;
pub mod utils;

pub use core::config::{FlightParams, Placement, SimulationConfig, StartConfig};
pub use core::error::ConfigurationError;
pub use swarm::engine::{RunOutcome, RunReport, Simulation, StepDiagnostics};
pub use swarm::thermal::{Thermal, ThermalField};
pub use utils::sweep::sweep_thermal_counts;

/// Setup logging with tracing.
///
/// `level` is an `EnvFilter` directive such as `"info"` or
/// `"glider_swarm=debug"`. Calling it twice keeps the first subscriber.
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
