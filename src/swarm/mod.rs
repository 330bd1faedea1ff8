//! Glider Swarm
//!
//! Gliders searching a toroidal field of thermals for lift. Geometry and the
//! thermal field are immutable during a run; each glider mutates only itself.

pub mod agent;
pub mod engine;
pub mod geometry;
pub mod grid;
pub mod memory;
pub mod thermal;

pub use agent::{AgentSnapshot, FlightMode, FlightRules, Glider, GliderStep, HeadingSampler};
pub use engine::{RunOutcome, RunReport, Simulation, StepDiagnostics};
pub use geometry::{Scalar, Vec3};
pub use grid::ThermalGrid;
pub use memory::{KnownThermal, Retention, ThermalMemory};
pub use thermal::{Located, Thermal, ThermalField};
