use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::plant::ensure_non_negative;
use super::{
    ControllablePlant, ExportMarket, PartialLoadCurve, RenewableSource, TimeSeries, Timeline,
    UnitCommitment,
};
use crate::config::Config;
use crate::error::ConfigurationError;
use crate::optimizer::Formulation;

/// Everything needed to build one dispatch model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub formulation: Formulation,
    pub timeline: Timeline,
    pub demand: TimeSeries<f64>,
    pub renewable: RenewableSource,
    pub plant: ControllablePlant,
    /// Required by the binary formulation, ignored by the continuous one
    pub commitment: Option<UnitCommitment>,
    pub export: Option<ExportMarket>,
}

impl Scenario {
    pub fn from_config(config: &Config) -> Result<Self, ConfigurationError> {
        let mut timeline = Timeline::new(config.demand.series.len(), config.horizon.step_hours)?;
        if let Some(start) = config.horizon.start {
            timeline = timeline.starting_at(start);
        }

        let demand = TimeSeries::try_new("demand", &timeline, config.demand.series.clone())?;
        let capacity_factor = TimeSeries::try_new(
            "renewable.capacity_factor",
            &timeline,
            config.renewable.capacity_factor.clone(),
        )?;
        let renewable = RenewableSource {
            investment_cost: config.renewable.investment_cost,
            capacity_factor,
            max_capacity: config.renewable.max_capacity,
        };

        let p = &config.plant;
        let curve = PartialLoadCurve::new(p.efficiency_min, p.efficiency_max, p.partial_load_min)?;
        let plant = ControllablePlant {
            investment_cost: p.investment_cost,
            fuel_cost: p.fuel_cost,
            startup_cost: p.startup_cost,
            curve,
            cold_start: p.cold_start,
            max_capacity: p.max_capacity,
        };

        let commitment = config.commitment.as_ref().map(|c| UnitCommitment {
            capacity_max: c.capacity_max,
            fixed_cost: c.fixed_cost,
            shutdown_cost: c.shutdown_cost,
            initially_online: c.initially_online,
        });
        let export = config.export.as_ref().map(|e| ExportMarket {
            price: e.price,
            max_per_step: e.max_per_step,
        });

        let scenario = Self {
            formulation: config.model.formulation,
            timeline,
            demand,
            renewable,
            plant,
            commitment,
            export,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Cross-field consistency checks run before every build
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let expected = self.timeline.len();
        for (name, actual) in [
            ("demand", self.demand.len()),
            ("renewable.capacity_factor", self.renewable.capacity_factor.len()),
        ] {
            if actual != expected {
                return Err(ConfigurationError::SeriesLength { name, expected, actual });
            }
        }
        for &value in &self.demand {
            ensure_non_negative("demand", value)?;
        }

        self.renewable.validate()?;
        self.plant.validate()?;
        if let Some(export) = &self.export {
            export.validate()?;
        }
        match (&self.commitment, self.formulation) {
            (Some(commitment), Formulation::Binary) => {
                commitment.validate()?;
                match self.plant.max_capacity {
                    Some(limit) if commitment.capacity_max > limit => {
                        Err(ConfigurationError::UnitAbovePlantLimit {
                            unit: commitment.capacity_max,
                            limit,
                        })
                    }
                    _ => Ok(()),
                }
            }
            (Some(commitment), Formulation::Continuous) => commitment.validate(),
            (None, Formulation::Binary) => Err(ConfigurationError::MissingCommitment),
            (None, Formulation::Continuous) => Ok(()),
        }
    }

    pub fn with_formulation(mut self, formulation: Formulation) -> Self {
        self.formulation = formulation;
        self
    }

    pub fn peak_demand(&self) -> f64 {
        self.demand
            .iter()
            .copied()
            .map(OrderedFloat)
            .max()
            .map_or(0.0, |peak| peak.0)
    }

    /// Finite per-step export limit, or `None` without an export market.
    ///
    /// An uncapped market is limited to the peak demand so a positive price can
    /// never make the program unbounded.
    pub fn export_cap(&self) -> Option<f64> {
        let market = self.export.as_ref()?;
        Some(market.max_per_step.unwrap_or_else(|| self.peak_demand()))
    }
}
