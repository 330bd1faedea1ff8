//! Glider Agent
//!
//! One glider: position, velocity, a private thermal memory and its own RNG
//! stream. `step` runs the flight decision state machine for a single tick:
//! random search, approach of a remembered thermal when low, and a centred
//! climb inside a thermal until the ceiling is reached.

use super::geometry::{direction_toward, wrap, Scalar, Vec3};
use super::memory::{Retention, ThermalMemory};
use super::thermal::{nearest, Thermal, ThermalField};
use crate::core::config::{FlightParams, SimulationConfig};
use crate::core::error::ConfigurationError;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Draws search headings from Normal(bias, spread) and turns them into a
/// horizontal velocity of fixed magnitude.
#[derive(Clone, Copy, Debug)]
pub struct HeadingSampler {
    normal: Normal<Scalar>,
    xy_norm: Scalar,
}

impl HeadingSampler {
    pub fn new(bias_degrees: Scalar, sigma_degrees: Scalar, xy_norm: Scalar) -> Result<Self, ConfigurationError> {
        if !bias_degrees.is_finite() {
            return Err(ConfigurationError::InvalidBias(bias_degrees));
        }
        if !(sigma_degrees.is_finite() && sigma_degrees >= 0.0) {
            return Err(ConfigurationError::InvalidSpread(sigma_degrees));
        }
        let Ok(normal) = Normal::new(bias_degrees.to_radians(), sigma_degrees.to_radians()) else {
            return Err(ConfigurationError::InvalidSpread(sigma_degrees));
        };
        Ok(HeadingSampler { normal, xy_norm })
    }

    /// Heading angle in `[0, 2π)`.
    pub fn sample_angle<R: Rng + ?Sized>(&self, rng: &mut R) -> Scalar {
        let angle = self.normal.sample(rng).rem_euclid(TAU);
        if angle >= TAU {
            0.0
        } else {
            angle
        }
    }

    /// Horizontal velocity `(vx, vy)` with magnitude `xy_norm`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (Scalar, Scalar) {
        let angle = self.sample_angle(rng);
        (self.xy_norm * angle.cos(), self.xy_norm * angle.sin())
    }
}

/// Everything a glider needs to take a step, fixed for the whole run.
#[derive(Clone, Debug)]
pub struct FlightRules {
    pub params: FlightParams,
    pub heading: HeadingSampler,
    pub step_length: Scalar,
    pub resample_interval: u64,
}

impl FlightRules {
    pub fn from_config(cfg: &SimulationConfig) -> Result<Self, ConfigurationError> {
        cfg.validate()?;
        Ok(FlightRules {
            params: cfg.flight.clone(),
            heading: HeadingSampler::new(cfg.bias_degrees, cfg.sigma_degrees, cfg.flight.xy_norm)?,
            step_length: cfg.step_length,
            resample_interval: cfg.resample_interval,
        })
    }

    pub fn retention(&self) -> Retention {
        self.params.retention()
    }
}

/// What the glider was doing during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightMode {
    RandomSearch,
    /// Low and outside any thermal, heading for the nearest remembered one
    Approach,
    /// Centred in a thermal below the ceiling
    CenteredClimb,
}

/// Result of one glider step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GliderStep {
    /// vx flown during this step
    pub forward_velocity: Scalar,
    pub mode: FlightMode,
    /// Altitude fell below the crash floor
    pub crashed: bool,
}

#[derive(Clone, Debug)]
pub struct Glider {
    id: usize,
    position: Vec3,
    velocity: Vec3,
    memory: ThermalMemory,
    searching: bool,
    mode: FlightMode,
    rng: StdRng,
}

impl Glider {
    pub fn new(id: usize, position: Vec3, velocity: Vec3, memory: ThermalMemory, rng: StdRng) -> Self {
        Glider {
            id,
            position,
            velocity,
            memory,
            searching: true,
            mode: FlightMode::RandomSearch,
            rng,
        }
    }

    /// A glider at `(x, y, start_height)`, sinking on a freshly sampled heading.
    pub fn launch(id: usize, x: Scalar, y: Scalar, rules: &FlightRules, mut rng: StdRng) -> Self {
        let (vx, vy) = rules.heading.sample(&mut rng);
        Glider::new(
            id,
            Vec3::new(x, y, rules.params.start_height),
            Vec3::new(vx, vy, rules.params.falling_rate),
            ThermalMemory::new(rules.retention()),
            rng,
        )
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn position(&self) -> &Vec3 {
        &self.position
    }

    pub fn velocity(&self) -> &Vec3 {
        &self.velocity
    }

    pub fn memory(&self) -> &ThermalMemory {
        &self.memory
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn mode(&self) -> FlightMode {
        self.mode
    }

    pub fn learn(&mut self, thermal: Thermal) -> bool {
        self.memory.learn(thermal)
    }

    /// Move horizontally to `(x, y)` (wrapped into the area), keeping altitude.
    pub fn relocate(&mut self, x: Scalar, y: Scalar, area_size: Scalar) {
        self.position.x = wrap(x, area_size);
        self.position.y = wrap(y, area_size);
    }

    /// Advance this glider by one tick.
    pub fn step(&mut self, tick: u64, field: &ThermalField, rules: &FlightRules) -> GliderStep {
        let p = &rules.params;
        let area = field.area_size();
        let altitude = self.position.z;

        self.searching = true;
        self.mode = FlightMode::RandomSearch;

        let inside = field.within(&self.position, p.thermal_radius);
        if !inside.is_empty() {
            self.velocity.z = p.rising_rate;
            for thermal in inside {
                self.memory.learn(*thermal);
            }
            if altitude < p.ceiling_height && field.any_within(&self.position, p.center_radius) {
                self.searching = false;
                self.mode = FlightMode::CenteredClimb;
                if altitude < p.min_height {
                    self.velocity = Vec3::new(0.0, 0.0, p.rising_rate);
                }
            }
            if altitude >= p.ceiling_height {
                self.searching = true;
            }
        } else {
            self.velocity.z = p.falling_rate;
            if altitude < p.min_height {
                let here = (self.position.x, self.position.y);
                if let Some(target) = nearest(&self.position, self.memory.entries(), area) {
                    let (vx, vy) = direction_toward(here, target.thermal.xy(), p.xy_norm, area);
                    self.velocity.x = vx;
                    self.velocity.y = vy;
                    self.searching = false;
                    self.mode = FlightMode::Approach;
                }
            }
        }

        if self.searching && tick % rules.resample_interval == 0 {
            let (vx, vy) = rules.heading.sample(&mut self.rng);
            self.velocity.x = vx;
            self.velocity.y = vy;
        }

        self.position = self.position.add_scaled(&self.velocity, rules.step_length);
        self.position.x = wrap(self.position.x, area);
        self.position.y = wrap(self.position.y, area);

        self.memory.decay(rules.step_length);

        GliderStep {
            forward_velocity: self.velocity.x,
            mode: self.mode,
            crashed: self.position.z < p.crash_floor,
        }
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            mode: self.mode,
            known_thermals: self.memory.len(),
        }
    }
}

/// Serializable per-glider state for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    pub mode: FlightMode,
    pub known_thermals: usize,
}
