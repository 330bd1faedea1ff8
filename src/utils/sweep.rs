//! Parameter Sweep
//!
//! Runs one simulation per thermal count and collects the result lines in
//! input order. Runs are independent, so rayon spreads them over the pool.

use crate::core::config::SimulationConfig;
use crate::core::error::ConfigurationError;
use crate::swarm::engine::{RunReport, Simulation};
use rayon::prelude::*;
use tracing::info;

/// Run `base` once for every entry of `thermal_counts`.
///
/// Every run reuses `base.seed`, so two sweeps over the same counts agree line
/// for line.
pub fn sweep_thermal_counts(
    base: &SimulationConfig,
    thermal_counts: &[usize],
) -> Result<Vec<RunReport>, ConfigurationError> {
    info!(
        "📊 [Sweep] {} configurations, {} steps each",
        thermal_counts.len(),
        base.steps
    );

    let reports = thermal_counts
        .par_iter()
        .map(|&count| {
            let mut config = base.clone();
            config.thermal_count = count;
            Simulation::new(config).map(|mut sim| sim.run())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let crashed = reports.iter().filter(|r| r.outcome.crashed()).count();
    info!("📈 [Sweep] Complete. {} of {} runs crashed", crashed, reports.len());
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> SimulationConfig {
        let mut cfg = SimulationConfig::default();
        cfg.area_size = 200.0;
        cfg.steps = 2_000;
        cfg.seed = 17;
        cfg.flight.crash_floor = -1.0e9;
        cfg
    }

    #[test]
    fn reports_come_back_in_input_order() {
        let counts = [5, 50, 1, 20];
        let reports = sweep_thermal_counts(&quick_config(), &counts).unwrap();
        let got: Vec<usize> = reports.iter().map(|r| r.thermal_count).collect();
        assert_eq!(got, counts);
    }

    #[test]
    fn sweep_matches_individual_runs() {
        let base = quick_config();
        let reports = sweep_thermal_counts(&base, &[10, 40]).unwrap();
        for report in reports {
            let mut cfg = base.clone();
            cfg.thermal_count = report.thermal_count;
            let single = Simulation::new(cfg).unwrap().run();
            assert_eq!(report, single);
        }
    }

    #[test]
    fn invalid_count_fails_the_sweep() {
        // Seeding the nearest thermal needs at least one
        let err = sweep_thermal_counts(&quick_config(), &[10, 0]).unwrap_err();
        assert_eq!(err, ConfigurationError::NoThermals);
    }
}
