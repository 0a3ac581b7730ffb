//! Constraint families shared by the continuous and binary formulations

use good_lp::{constraint, variable, Expression, Variable, VariableDefinition};

use super::LinearProgram;
use crate::domain::{PartialLoadCurve, Scenario, TimeSeries, TimeStep, Timeline};

/// State of a time-coupled quantity before the first step of the horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// Nothing online before the horizon starts
    Cold,
    /// A given level carried into the first step
    Level(f64),
}

impl Boundary {
    pub fn level(self) -> f64 {
        match self {
            Boundary::Cold => 0.0,
            Boundary::Level(level) => level,
        }
    }
}

/// `series[t-1]`, or the boundary level at the first step
pub fn previous_level(
    timeline: &Timeline,
    series: &TimeSeries<Variable>,
    step: TimeStep,
    boundary: Boundary,
) -> Expression {
    match timeline.predecessor(step) {
        Some(prev) => series[prev].into(),
        None => Expression::from(boundary.level()),
    }
}

/// Non-negative variable, optionally capped
pub fn capacity_variable(max_capacity: Option<f64>) -> VariableDefinition {
    match max_capacity {
        Some(max) => variable().min(0.0).max(max),
        None => variable().min(0.0),
    }
}

/// `p * online <= output <= online`
pub fn add_operating_range(
    program: &mut LinearProgram,
    partial_load_min: f64,
    online: Expression,
    output: Variable,
) {
    let floor = online.clone() * partial_load_min;
    program.add_constraint(constraint!(output <= online));
    program.add_constraint(constraint!(output >= floor));
}

/// `fuel == a * online + b * output`
pub fn add_fuel_relation(
    program: &mut LinearProgram,
    curve: &PartialLoadCurve,
    online: Expression,
    output: Variable,
    fuel: Variable,
) {
    let burn = online * curve.online_coefficient() + output * curve.output_coefficient();
    program.add_constraint(constraint!(fuel == burn));
}

/// `renewable + output - export >= demand`; shortfall is never allowed
pub fn add_demand_balance(
    program: &mut LinearProgram,
    scenario: &Scenario,
    step: TimeStep,
    renewable_capacity: Variable,
    output: Variable,
    export: Option<Variable>,
) {
    let mut supply = scenario.renewable.capacity_factor[step] * renewable_capacity + output;
    if let Some(export) = export {
        supply -= export;
    }
    let demand = scenario.demand[step];
    program.add_constraint(constraint!(supply >= demand));
}

/// Export variables bounded by the scenario's finite cap
pub fn add_export(program: &mut LinearProgram, scenario: &Scenario) -> Option<TimeSeries<Variable>> {
    let cap = scenario.export_cap()?;
    if scenario.export.as_ref().is_some_and(|e| e.max_per_step.is_none()) {
        tracing::warn!(cap, "export market has no cap, limiting exports to peak demand");
    }
    Some(program.add_series(&scenario.timeline, variable().min(0.0).max(cap)))
}

/// Export revenue over the horizon, zero without an export market
pub fn export_revenue(scenario: &Scenario, export: Option<&TimeSeries<Variable>>) -> Expression {
    let (Some(export), Some(market)) = (export, scenario.export.as_ref()) else {
        return Expression::default();
    };
    let weight = market.price * scenario.timeline.step_hours();
    export.iter().map(|&e| weight * e).sum()
}
