use thiserror::Error;

/// Setup failures. Always raised before the first step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("nearest-thermal query on a field without thermals")]
    NoThermals,
    #[error("area size must be positive and finite, got {0}")]
    InvalidAreaSize(f64),
    #[error("agent count must be at least 1")]
    NoAgents,
    #[error("step count must be at least 1")]
    NoSteps,
    #[error("step length must be positive and finite, got {0}")]
    InvalidStepLength(f64),
    #[error("warm-up fraction must lie in [0, 1), got {0}")]
    InvalidWarmup(f64),
    #[error("heading resample interval must be at least 1")]
    InvalidResampleInterval,
    #[error("search-angle spread must be non-negative and finite, got {0} degrees")]
    InvalidSpread(f64),
    #[error("heading bias must be finite, got {0} degrees")]
    InvalidBias(f64),
    #[error("centre radius ({center}) must be positive and below the thermal radius ({thermal})")]
    InvalidRadii { thermal: f64, center: f64 },
    #[error("rising rate must be positive and falling rate negative (rise {rise}, fall {fall})")]
    InvalidClimbRates { rise: f64, fall: f64 },
    #[error("horizontal speed must be positive and finite, got {0}")]
    InvalidSpeed(f64),
    #[error("min height ({min}) must not exceed ceiling height ({ceiling})")]
    InvalidHeights { min: f64, ceiling: f64 },
    #[error("forget rate must be non-negative and finite, got {0}")]
    InvalidForgetRate(f64),
    #[error("start scatter must be non-negative and finite, got {0}")]
    InvalidScatter(f64),
    #[error("placing gliders near a known thermal requires seeding the nearest thermal")]
    PlacementNeedsKnownThermal,
}
