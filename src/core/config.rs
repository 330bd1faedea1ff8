//! Run Configuration
//!
//! Every tunable of a run, with the defaults of the reference experiment.
//! Partial JSON documents layer over the defaults.

use super::error::ConfigurationError;
use crate::swarm::geometry::Scalar;
use crate::swarm::memory::Retention;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flight model constants shared by every glider
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightParams {
    /// Altitude every glider starts at
    pub start_height: Scalar,
    /// A centred glider stops circling once it reaches this altitude
    pub ceiling_height: Scalar,
    /// Below this altitude a glider heads for the nearest known thermal
    pub min_height: Scalar,
    pub rising_rate: Scalar,
    pub falling_rate: Scalar,
    /// Horizontal speed while choosing a heading ("xy-norm")
    pub xy_norm: Scalar,
    pub thermal_radius: Scalar,
    pub center_radius: Scalar,
    /// TTL given to a learned thermal; 0 keeps it forever
    pub forget_rate: Scalar,
    /// Any glider below this altitude aborts the run
    pub crash_floor: Scalar,
}

impl Default for FlightParams {
    fn default() -> Self {
        FlightParams {
            start_height: 10.0,
            ceiling_height: 10.0,
            min_height: 5.0,
            rising_rate: 0.2,
            falling_rate: -0.1,
            xy_norm: 1.0,
            thermal_radius: 1.0,
            center_radius: 0.5,
            forget_rate: 0.0,
            crash_floor: -2.0,
        }
    }
}

impl FlightParams {
    pub fn retention(&self) -> Retention {
        if self.forget_rate == 0.0 {
            Retention::Forever
        } else {
            Retention::Ttl(self.forget_rate)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let finite = |v: Scalar| v.is_finite();
        if !(finite(self.thermal_radius)
            && finite(self.center_radius)
            && self.center_radius > 0.0
            && self.center_radius < self.thermal_radius)
        {
            return Err(ConfigurationError::InvalidRadii {
                thermal: self.thermal_radius,
                center: self.center_radius,
            });
        }
        if !(finite(self.rising_rate)
            && finite(self.falling_rate)
            && self.rising_rate > 0.0
            && self.falling_rate < 0.0)
        {
            return Err(ConfigurationError::InvalidClimbRates {
                rise: self.rising_rate,
                fall: self.falling_rate,
            });
        }
        if !(finite(self.xy_norm) && self.xy_norm > 0.0) {
            return Err(ConfigurationError::InvalidSpeed(self.xy_norm));
        }
        if !(finite(self.min_height)
            && finite(self.ceiling_height)
            && finite(self.start_height)
            && finite(self.crash_floor)
            && self.min_height <= self.ceiling_height)
        {
            return Err(ConfigurationError::InvalidHeights {
                min: self.min_height,
                ceiling: self.ceiling_height,
            });
        }
        if !(finite(self.forget_rate) && self.forget_rate >= 0.0) {
            return Err(ConfigurationError::InvalidForgetRate(self.forget_rate));
        }
        Ok(())
    }
}

/// Where gliders are put before the first step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Every glider at (0, 0)
    Origin,
    /// Uniform over the area
    Random,
    /// Uniform in a `scatter`-wide square centred on the nearest thermal
    NearKnownThermal { scatter: Scalar },
}

/// Initial conditions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartConfig {
    pub placement: Placement,
    /// Each glider starts out knowing the field thermal nearest to it
    pub seed_nearest_thermal: bool,
}

impl Default for StartConfig {
    fn default() -> Self {
        StartConfig {
            placement: Placement::NearKnownThermal { scatter: 20.0 },
            seed_nearest_thermal: true,
        }
    }
}

/// Main configuration for one simulation run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub agent_count: usize,
    pub thermal_count: usize,
    /// Side length of the square, toroidal area
    pub area_size: Scalar,
    /// Standard deviation of the heading resample, in degrees
    pub sigma_degrees: Scalar,
    /// Mean of the heading resample, in degrees
    pub bias_degrees: Scalar,
    pub steps: u64,
    pub step_length: Scalar,
    /// Share of the run discarded before velocities are accumulated
    pub warmup_fraction: Scalar,
    /// Searching gliders redraw their heading every this many steps
    pub resample_interval: u64,
    pub seed: u64,
    /// Update gliders with rayon; results are identical either way
    pub parallel: bool,
    /// Serve thermal radius queries from a spatial hash grid
    pub spatial_index: bool,
    pub flight: FlightParams,
    pub start: StartConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            agent_count: 1,
            thermal_count: 100,
            area_size: 1000.0,
            sigma_degrees: 45.0,
            bias_degrees: 0.0,
            steps: 200_000,
            step_length: 0.5,
            warmup_fraction: 0.1,
            resample_interval: 10,
            seed: 0,
            parallel: false,
            spatial_index: true,
            flight: FlightParams::default(),
            start: StartConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a (possibly partial) JSON document layered over the defaults.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.agent_count == 0 {
            return Err(ConfigurationError::NoAgents);
        }
        if !(self.area_size.is_finite() && self.area_size > 0.0) {
            return Err(ConfigurationError::InvalidAreaSize(self.area_size));
        }
        if self.steps == 0 {
            return Err(ConfigurationError::NoSteps);
        }
        if !(self.step_length.is_finite() && self.step_length > 0.0) {
            return Err(ConfigurationError::InvalidStepLength(self.step_length));
        }
        if !(self.warmup_fraction.is_finite() && (0.0..1.0).contains(&self.warmup_fraction)) {
            return Err(ConfigurationError::InvalidWarmup(self.warmup_fraction));
        }
        if self.resample_interval == 0 {
            return Err(ConfigurationError::InvalidResampleInterval);
        }
        if !(self.sigma_degrees.is_finite() && self.sigma_degrees >= 0.0) {
            return Err(ConfigurationError::InvalidSpread(self.sigma_degrees));
        }
        if !self.bias_degrees.is_finite() {
            return Err(ConfigurationError::InvalidBias(self.bias_degrees));
        }
        self.flight.validate()?;

        match self.start.placement {
            Placement::NearKnownThermal { scatter } => {
                if !(scatter.is_finite() && scatter >= 0.0) {
                    return Err(ConfigurationError::InvalidScatter(scatter));
                }
                if !self.start.seed_nearest_thermal {
                    return Err(ConfigurationError::PlacementNeedsKnownThermal);
                }
            }
            Placement::Origin | Placement::Random => {}
        }
        if self.start.seed_nearest_thermal && self.thermal_count == 0 {
            return Err(ConfigurationError::NoThermals);
        }
        Ok(())
    }

    /// First tick whose velocities count towards the result.
    pub fn warmup_steps(&self) -> u64 {
        (self.steps as Scalar * self.warmup_fraction).ceil() as u64
    }
}
