use serde::{Deserialize, Serialize};

use super::{PartialLoadCurve, TimeSeries, TimeStep};
use crate::error::ConfigurationError;

pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::Negative { name, value })
    }
}

/// Variable renewable generator whose size is chosen by the optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewableSource {
    /// Cost per unit of installed capacity over the horizon
    pub investment_cost: f64,
    /// Available output per unit of installed capacity, in [0, 1]
    pub capacity_factor: TimeSeries<f64>,
    pub max_capacity: Option<f64>,
}

impl RenewableSource {
    pub fn new(investment_cost: f64, capacity_factor: TimeSeries<f64>) -> Self {
        Self {
            investment_cost,
            capacity_factor,
            max_capacity: None,
        }
    }

    /// Output at `step` for a given installed capacity
    pub fn output(&self, step: TimeStep, installed_capacity: f64) -> f64 {
        self.capacity_factor[step] * installed_capacity
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_non_negative("renewable.investment_cost", self.investment_cost)?;
        if let Some(max) = self.max_capacity {
            ensure_non_negative("renewable.max_capacity", max)?;
        }
        for (index, &value) in self.capacity_factor.iter().enumerate() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::CapacityFactorOutOfRange {
                    step: index + 1,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Fuel-fired plant with partial-load losses and startup costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllablePlant {
    /// Cost per unit of installed capacity over the horizon
    pub investment_cost: f64,
    /// Cost per unit of fuel energy
    pub fuel_cost: f64,
    /// Cost per unit of capacity brought online
    pub startup_cost: f64,
    pub curve: PartialLoadCurve,
    /// Online capacity is forced to zero at the first step
    pub cold_start: bool,
    pub max_capacity: Option<f64>,
}

impl ControllablePlant {
    pub fn new(
        investment_cost: f64,
        fuel_cost: f64,
        startup_cost: f64,
        curve: PartialLoadCurve,
    ) -> Self {
        Self {
            investment_cost,
            fuel_cost,
            startup_cost,
            curve,
            cold_start: true,
            max_capacity: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        ensure_non_negative("plant.investment_cost", self.investment_cost)?;
        ensure_non_negative("plant.fuel_cost", self.fuel_cost)?;
        ensure_non_negative("plant.startup_cost", self.startup_cost)?;
        if let Some(max) = self.max_capacity {
            ensure_non_negative("plant.max_capacity", max)?;
        }
        // Re-derive so hand-built curves get the same checks as configured ones
        PartialLoadCurve::new(
            self.curve.efficiency_min(),
            self.curve.efficiency_max(),
            self.curve.partial_load_min(),
        )?;
        Ok(())
    }
}

/// Fixed-size unit scheduled with on/off decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCommitment {
    /// Output of the unit at full load
    pub capacity_max: f64,
    /// Cost per hour the unit is online
    pub fixed_cost: f64,
    /// Cost per shutdown event
    pub shutdown_cost: f64,
    /// Commitment state before the first step
    pub initially_online: bool,
}

impl UnitCommitment {
    pub fn new(capacity_max: f64) -> Self {
        Self {
            capacity_max,
            fixed_cost: 0.0,
            shutdown_cost: 0.0,
            initially_online: false,
        }
    }

    /// Lowest output while online, derived from the plant's turndown
    pub fn capacity_min(&self, curve: &PartialLoadCurve) -> f64 {
        curve.partial_load_min() * self.capacity_max
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.capacity_max.is_finite() && self.capacity_max > 0.0) {
            return Err(ConfigurationError::InvalidUnitCapacity(self.capacity_max));
        }
        ensure_non_negative("commitment.fixed_cost", self.fixed_cost)?;
        ensure_non_negative("commitment.shutdown_cost", self.shutdown_cost)
    }
}

/// Market for surplus energy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMarket {
    /// Revenue per unit of exported energy
    pub price: f64,
    /// Maximum export per step; a default cap is imposed when absent
    pub max_per_step: Option<f64>,
}

impl ExportMarket {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.price.is_finite() {
            return Err(ConfigurationError::Invalid(format!(
                "export price is not finite: {}",
                self.price
            )));
        }
        match self.max_per_step {
            Some(cap) if !cap.is_finite() => Err(ConfigurationError::UnboundedExport(cap)),
            Some(cap) => ensure_non_negative("export.max_per_step", cap),
            None => Ok(()),
        }
    }
}
