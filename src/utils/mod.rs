//! Utilities

pub mod sweep;

pub use sweep::sweep_thermal_counts;
