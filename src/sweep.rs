//! Parameter sweeps
//!
//! Each value of the swept parameter yields an independent scenario that is
//! built, solved and reported on its own blocking task. Scenarios share no
//! state, so they run concurrently; a failure in one does not affect the rest.

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::domain::Scenario;
use crate::error::{ConfigurationError, ModelError};
use crate::optimizer::DispatchOptimizer;
use crate::report::DispatchReport;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
    strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SweepParameter {
    FuelCost,
    StartupCost,
    PlantInvestmentCost,
    RenewableInvestmentCost,
    ExportPrice,
}

impl SweepParameter {
    /// Copy of `base` with this parameter set to `value`
    pub fn apply(self, base: &Scenario, value: f64) -> Result<Scenario, ConfigurationError> {
        let mut scenario = base.clone();
        match self {
            SweepParameter::FuelCost => scenario.plant.fuel_cost = value,
            SweepParameter::StartupCost => scenario.plant.startup_cost = value,
            SweepParameter::PlantInvestmentCost => scenario.plant.investment_cost = value,
            SweepParameter::RenewableInvestmentCost => scenario.renewable.investment_cost = value,
            SweepParameter::ExportPrice => match scenario.export.as_mut() {
                Some(market) => market.price = value,
                None => {
                    return Err(ConfigurationError::Invalid(
                        "export_price sweep needs an [export] section".to_string(),
                    ))
                }
            },
        }
        scenario.validate()?;
        Ok(scenario)
    }
}

#[derive(Debug)]
pub struct SweepOutcome {
    pub parameter: SweepParameter,
    pub value: f64,
    pub result: Result<DispatchReport, ModelError>,
}

/// Solve one scenario per value, concurrently. Outcomes keep the order of `values`.
pub async fn run_sweep(
    optimizer: &DispatchOptimizer,
    base: &Scenario,
    parameter: SweepParameter,
    values: &[f64],
) -> Vec<SweepOutcome> {
    let mut tasks = JoinSet::new();
    for (index, &value) in values.iter().enumerate() {
        let optimizer = optimizer.clone();
        let scenario = parameter.apply(base, value);
        tasks.spawn_blocking(move || {
            let result = scenario
                .map_err(ModelError::from)
                .and_then(|scenario| optimizer.optimize(&scenario));
            (index, result)
        });
    }

    let mut results: Vec<Option<Result<DispatchReport, ModelError>>> =
        values.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            Err(err) => error!(%parameter, error = %err, "sweep task did not complete"),
        }
    }

    let outcomes: Vec<SweepOutcome> = values
        .iter()
        .zip(results)
        .map(|(&value, result)| SweepOutcome {
            parameter,
            value,
            result: result.unwrap_or_else(|| {
                Err(ModelError::SolverFailure("sweep task aborted".to_string()))
            }),
        })
        .collect();

    info!(
        %parameter,
        scenarios = outcomes.len(),
        solved = outcomes.iter().filter(|o| o.result.is_ok()).count(),
        "sweep finished"
    );
    outcomes
}
