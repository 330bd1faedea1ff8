pub mod config;
pub mod error;

pub use config::{FlightParams, Placement, SimulationConfig, StartConfig};
pub use error::ConfigurationError;
