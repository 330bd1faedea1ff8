//! Simulation Driver
//!
//! Owns the thermal field and the gliders, advances time in fixed steps,
//! accumulates forward velocity after the warm-up and stops the whole run as
//! soon as any glider drops below the crash floor.

use super::agent::{AgentSnapshot, FlightRules, Glider, GliderStep};
use super::geometry::Scalar;
use super::thermal::ThermalField;
use crate::core::config::{Placement, SimulationConfig};
use crate::core::error::ConfigurationError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed { mean_velocity: Scalar, steps: u64 },
    /// A glider fell below the crash floor during `tick`
    Crashed { tick: u64, agent: usize },
}

impl RunOutcome {
    /// Mean net velocity; a crashed run counts as zero.
    pub fn mean_velocity(&self) -> Scalar {
        match self {
            RunOutcome::Completed { mean_velocity, .. } => *mean_velocity,
            RunOutcome::Crashed { .. } => 0.0,
        }
    }

    pub fn crashed(&self) -> bool {
        matches!(self, RunOutcome::Crashed { .. })
    }
}

/// Result line of one configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub thermal_count: usize,
    pub outcome: RunOutcome,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.thermal_count, self.outcome.mean_velocity())
    }
}

/// Serializable view of the whole simulation after a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepDiagnostics {
    pub tick: u64,
    pub forward_sum: Scalar,
    pub agents: Vec<AgentSnapshot>,
}

pub struct Simulation {
    config: SimulationConfig,
    rules: FlightRules,
    field: ThermalField,
    agents: Vec<Glider>,
    /// Ticks completed so far
    tick: u64,
    warmup_steps: u64,
    forward_sum: Scalar,
    crash: Option<RunOutcome>,
}

impl Simulation {
    /// Generate the thermal field from `config.seed` and launch the gliders.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut field = ThermalField::generate(config.thermal_count, config.area_size, &mut rng)?;
        if config.spatial_index {
            field = field.indexed(config.flight.thermal_radius);
        }
        Self::launch(config, field, rng)
    }

    /// Launch gliders into an existing field. The field's area size wins over the config's.
    pub fn with_field(mut config: SimulationConfig, field: ThermalField) -> Result<Self, ConfigurationError> {
        config.area_size = field.area_size();
        config.thermal_count = field.len();
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Self::launch(config, field, rng)
    }

    fn launch(config: SimulationConfig, field: ThermalField, mut rng: StdRng) -> Result<Self, ConfigurationError> {
        let rules = FlightRules::from_config(&config)?;
        let area = field.area_size();

        let mut agents = Vec::with_capacity(config.agent_count);
        for id in 0..config.agent_count {
            // Each glider owns its stream so update order never matters
            let agent_rng = StdRng::seed_from_u64(rng.gen());
            let (x, y) = match config.start.placement {
                Placement::Origin => (0.0, 0.0),
                Placement::Random | Placement::NearKnownThermal { .. } => {
                    (rng.gen::<Scalar>() * area, rng.gen::<Scalar>() * area)
                }
            };
            let mut glider = Glider::launch(id, x, y, &rules, agent_rng);
            glider.relocate(x, y, area);

            if config.start.seed_nearest_thermal {
                let known = *field.nearest_in_field(glider.position())?;
                glider.learn(known);
                if let Placement::NearKnownThermal { scatter } = config.start.placement {
                    let dx = rng.gen::<Scalar>() * scatter - scatter * 0.5;
                    let dy = rng.gen::<Scalar>() * scatter - scatter * 0.5;
                    glider.relocate(known.x + dx, known.y + dy, area);
                }
            }
            agents.push(glider);
        }

        info!(
            "🪂 [Simulation] Launched {} gliders over {} thermals (area={}, sigma={}°, seed={})",
            agents.len(),
            field.len(),
            area,
            config.sigma_degrees,
            config.seed
        );

        let warmup_steps = config.warmup_steps();
        Ok(Simulation {
            config,
            rules,
            field,
            agents,
            tick: 0,
            warmup_steps,
            forward_sum: 0.0,
            crash: None,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn field(&self) -> &ThermalField {
        &self.field
    }

    pub fn agents(&self) -> &[Glider] {
        &self.agents
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn forward_sum(&self) -> Scalar {
        self.forward_sum
    }

    pub fn is_finished(&self) -> bool {
        self.crash.is_some() || self.tick >= self.config.steps
    }

    /// Run one tick for every glider. Returns the crash outcome if one happened.
    ///
    /// A crashing tick still completes for every glider before the run stops.
    /// Past the configured step count this does nothing.
    pub fn step(&mut self) -> Option<RunOutcome> {
        if let Some(crash) = self.crash {
            return Some(crash);
        }
        if self.tick >= self.config.steps {
            return None;
        }
        let tick = self.tick;
        let field = &self.field;
        let rules = &self.rules;

        let results: Vec<GliderStep> = if self.config.parallel {
            self.agents
                .par_iter_mut()
                .map(|glider| glider.step(tick, field, rules))
                .collect()
        } else {
            self.agents
                .iter_mut()
                .map(|glider| glider.step(tick, field, rules))
                .collect()
        };
        self.tick += 1;

        if tick >= self.warmup_steps {
            self.forward_sum += results.iter().map(|r| r.forward_velocity).sum::<Scalar>();
        }

        if let Some(agent) = results.iter().position(|r| r.crashed) {
            let outcome = RunOutcome::Crashed { tick, agent };
            warn!(
                "💥 [Simulation] Glider {} fell below the crash floor at tick {}, aborting",
                agent, tick
            );
            self.crash = Some(outcome);
            return Some(outcome);
        }
        None
    }

    /// Run to completion.
    pub fn run(&mut self) -> RunReport {
        self.run_with(|_| {})
    }

    /// Run to completion, handing the simulation to `observer` after every tick.
    pub fn run_with<F>(&mut self, mut observer: F) -> RunReport
    where
        F: FnMut(&Simulation),
    {
        while !self.is_finished() {
            let crashed = self.step();
            observer(self);
            if crashed.is_some() {
                break;
            }
        }
        let report = self.report();
        info!(
            "🏁 [Simulation] {} thermals -> mean velocity {:.6} ({} ticks)",
            report.thermal_count,
            report.outcome.mean_velocity(),
            self.tick
        );
        report
    }

    /// Outcome so far; mean velocity uses the configured step count.
    pub fn report(&self) -> RunReport {
        let outcome = match self.crash {
            Some(crash) => crash,
            None => {
                let cfg = &self.config;
                let flown = cfg.steps as Scalar * cfg.step_length * (1.0 - cfg.warmup_fraction);
                RunOutcome::Completed {
                    mean_velocity: self.forward_sum / self.agents.len() as Scalar / flown,
                    steps: self.tick,
                }
            }
        };
        RunReport {
            thermal_count: self.field.len(),
            outcome,
        }
    }

    pub fn snapshot(&self) -> StepDiagnostics {
        StepDiagnostics {
            tick: self.tick,
            forward_sum: self.forward_sum,
            agents: self.agents.iter().map(Glider::snapshot).collect(),
        }
    }

    /// Emit a snapshot at debug level every `every` ticks.
    pub fn log_diagnostics(&self, every: u64) {
        if every == 0 || self.tick % every != 0 {
            return;
        }
        match serde_json::to_string(&self.snapshot()) {
            Ok(json) => debug!(target: "glider_swarm::diagnostics", "{}", json),
            Err(e) => warn!("[Simulation] Could not serialize diagnostics: {}", e),
        }
    }
}
