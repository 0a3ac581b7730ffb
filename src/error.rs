use thiserror::Error;

/// Malformed or inconsistent static parameters, detected before any model is built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Horizon has no time steps")]
    EmptyHorizon,
    #[error("Step duration must be positive and finite: {0}h")]
    InvalidStepDuration(f64),
    #[error("Series '{name}' has {actual} entries, horizon has {expected}")]
    SeriesLength {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("'{name}' must be a finite value >= 0, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("Capacity factor at step {step} outside [0, 1]: {value}")]
    CapacityFactorOutOfRange { step: usize, value: f64 },
    #[error("'{name}' must lie in (0, 1], got {value}")]
    EfficiencyOutOfRange { name: &'static str, value: f64 },
    #[error("Minimum efficiency {min} exceeds maximum efficiency {max}")]
    EfficiencyOrder { min: f64, max: f64 },
    #[error("Minimum partial load must lie in [0, 1), got {0}")]
    PartialLoadOutOfRange(f64),
    #[error("Binary formulation requires a [commitment] section")]
    MissingCommitment,
    #[error("Unit capacity must be positive and finite, got {0}")]
    InvalidUnitCapacity(f64),
    #[error("Unit capacity {unit} exceeds the plant capacity limit {limit}")]
    UnitAbovePlantLimit { unit: f64, limit: f64 },
    #[error("Export cap must be finite, got {0}")]
    UnboundedExport(f64),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<validator::ValidationErrors> for ConfigurationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ConfigurationError::Invalid(errors.to_string())
    }
}

/// Terminal outcome of a single build-solve cycle
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Model is infeasible: no dispatch satisfies every constraint")]
    Infeasible,
    #[error("Model is unbounded")]
    Unbounded,
    #[error("Solver failure: {0}")]
    SolverFailure(String),
}

impl From<good_lp::ResolutionError> for ModelError {
    fn from(error: good_lp::ResolutionError) -> Self {
        match error {
            good_lp::ResolutionError::Infeasible => ModelError::Infeasible,
            good_lp::ResolutionError::Unbounded => ModelError::Unbounded,
            other => ModelError::SolverFailure(other.to_string()),
        }
    }
}
