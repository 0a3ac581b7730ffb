//! # Dispatch Report
//!
//! Derives the cost ledger, per-step dispatch and summary statistics from an
//! optimal assignment. All quantities are recomputed from variable values and
//! scenario parameters, so the report can be checked independently of the
//! solver's own objective.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use good_lp::Variable;

use crate::domain::{Scenario, Timeline};
use crate::error::ModelError;
use crate::optimizer::{
    Assignment, CommitmentVariables, DispatchVariables, Formulation, PlantCapacity,
};

/// Quantities below this are treated as zero when counting events
pub const EVENT_THRESHOLD: f64 = 1e-6;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CostBucket {
    InvestmentRenewable,
    InvestmentPlant,
    Startup,
    Fuel,
    Fixed,
    Shutdown,
    ExportRevenue,
}

/// Non-negative cost totals; export revenue is kept apart and subtracted
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostLedger {
    pub investment_renewable: f64,
    pub investment_plant: f64,
    pub startup: f64,
    pub fuel: f64,
    pub fixed: f64,
    pub shutdown: f64,
    pub export_revenue: f64,
}

impl CostLedger {
    pub fn get(&self, bucket: CostBucket) -> f64 {
        match bucket {
            CostBucket::InvestmentRenewable => self.investment_renewable,
            CostBucket::InvestmentPlant => self.investment_plant,
            CostBucket::Startup => self.startup,
            CostBucket::Fuel => self.fuel,
            CostBucket::Fixed => self.fixed,
            CostBucket::Shutdown => self.shutdown,
            CostBucket::ExportRevenue => self.export_revenue,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.investment_renewable
            + self.investment_plant
            + self.startup
            + self.fuel
            + self.fixed
            + self.shutdown
    }

    /// Objective value: total cost net of export revenue
    pub fn net_cost(&self) -> f64 {
        self.total_cost() - self.export_revenue
    }
}

/// Dispatch of a single time step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchEntry {
    /// 1-based step number
    pub step: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<DateTime<Utc>>,
    pub demand: f64,
    pub renewable_output: f64,
    pub plant_output: f64,
    pub online_capacity: f64,
    pub fuel_input: f64,
    pub startup_capacity: f64,
    pub export: f64,
    /// Over-supply after demand and export
    pub surplus: f64,
    pub realized_efficiency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_event: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_event: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub demand_energy: f64,
    pub renewable_energy: f64,
    pub plant_energy: f64,
    pub fuel_energy: f64,
    pub exported_energy: f64,
    pub surplus_energy: f64,
    /// Share of demand covered by renewable output in the same step
    pub renewable_share: Option<f64>,
    /// Plant energy over installed capacity times horizon length
    pub plant_utilization: Option<f64>,
    /// Plant energy over fuel energy
    pub average_efficiency: Option<f64>,
    pub startup_count: usize,
    pub shutdown_count: usize,
    pub started_capacity: f64,
}

/// Startup and shutdown implied by consecutive commitment states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub startup: bool,
    pub shutdown: bool,
}

/// Transitions of a commitment sequence, with `initially_online` as the state before the first step
pub fn transitions(states: &[bool], initially_online: bool) -> Vec<Transition> {
    std::iter::once(initially_online)
        .chain(states.iter().copied())
        .tuple_windows()
        .map(|(previous, current)| Transition {
            startup: current && !previous,
            shutdown: previous && !current,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ViolationKind {
    OutputAboveOnline,
    OutputBelowMinimumLoad,
    OnlineAboveInstalled,
    StartupUndercounted,
    EventMismatch,
    DemandShortfall,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Violation {
    pub step: usize,
    pub kind: ViolationKind,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub formulation: Formulation,
    pub renewable_capacity: f64,
    pub plant_capacity: f64,
    pub partial_load_min: f64,
    /// Online capacity before the first step
    pub initial_online_capacity: f64,
    pub costs: CostLedger,
    pub objective: f64,
    pub entries: Vec<DispatchEntry>,
    pub summary: DispatchSummary,
}

impl DispatchReport {
    /// Derive the report from solved variable values.
    ///
    /// Fails with `SolverFailure` if the assignment lacks any variable of the model.
    pub fn from_assignment(
        scenario: &Scenario,
        vars: &DispatchVariables,
        assignment: &Assignment,
    ) -> Result<Self, ModelError> {
        let timeline = &scenario.timeline;
        let plant = &scenario.plant;
        let hours = timeline.step_hours();
        let value = |var: Variable| {
            assignment.value(var).ok_or_else(|| {
                ModelError::SolverFailure(format!("no value returned for {var:?}"))
            })
        };

        let renewable_capacity = value(vars.renewable_capacity)?;
        let plant_capacity = match vars.plant_capacity {
            PlantCapacity::Sized(var) => value(var)?,
            PlantCapacity::Fixed(capacity) => capacity,
        };
        let (formulation, initial_online_capacity) = match &vars.commitment {
            CommitmentVariables::Continuous { .. } => (Formulation::Continuous, 0.0),
            CommitmentVariables::Binary { unit_capacity, .. } => {
                let online = scenario.commitment.as_ref().is_some_and(|c| c.initially_online);
                (Formulation::Binary, if online { *unit_capacity } else { 0.0 })
            }
        };

        let entries = timeline
            .steps()
            .map(|step| {
                let demand = scenario.demand[step];
                let renewable_output = scenario.renewable.output(step, renewable_capacity);
                let plant_output = value(vars.output[step])?;
                let fuel_input = value(vars.fuel[step])?;
                let export = match &vars.export {
                    Some(export) => value(export[step])?,
                    None => 0.0,
                };

                let (online_capacity, startup_capacity, commitment, startup_event, shutdown_event) =
                    match &vars.commitment {
                        CommitmentVariables::Continuous { online, startup } => (
                            value(online[step])?,
                            value(startup[step])?,
                            None,
                            None,
                            None,
                        ),
                        CommitmentVariables::Binary {
                            state,
                            startup,
                            shutdown,
                            unit_capacity,
                        } => {
                            let on = value(state[step])? > 0.5;
                            let started = value(startup[step])? > 0.5;
                            let stopped = value(shutdown[step])? > 0.5;
                            (
                                if on { *unit_capacity } else { 0.0 },
                                if started { *unit_capacity } else { 0.0 },
                                Some(on),
                                Some(started),
                                Some(stopped),
                            )
                        }
                    };

                let (time_start, time_end) = timeline.interval(step).unzip();
                Ok(DispatchEntry {
                    step: step.number(),
                    time_start,
                    time_end,
                    demand,
                    renewable_output,
                    plant_output,
                    online_capacity,
                    fuel_input,
                    startup_capacity,
                    export,
                    surplus: renewable_output + plant_output - export - demand,
                    realized_efficiency: (fuel_input > EVENT_THRESHOLD)
                        .then(|| plant_output / fuel_input),
                    commitment,
                    startup_event,
                    shutdown_event,
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        let count = |flag: fn(&DispatchEntry) -> Option<bool>| {
            entries.iter().filter(|e| flag(e) == Some(true)).count() as f64
        };
        let (fixed_cost, shutdown_cost) = scenario
            .commitment
            .as_ref()
            .map_or((0.0, 0.0), |c| (c.fixed_cost, c.shutdown_cost));
        let export_price = scenario.export.as_ref().map_or(0.0, |m| m.price);

        let costs = CostLedger {
            investment_renewable: scenario.renewable.investment_cost * renewable_capacity,
            investment_plant: plant.investment_cost * plant_capacity,
            startup: plant.startup_cost * entries.iter().map(|e| e.startup_capacity).sum::<f64>(),
            fuel: plant.fuel_cost * hours * entries.iter().map(|e| e.fuel_input).sum::<f64>(),
            fixed: fixed_cost * hours * count(|e| e.commitment),
            shutdown: shutdown_cost * count(|e| e.shutdown_event),
            export_revenue: export_price * hours * entries.iter().map(|e| e.export).sum::<f64>(),
        };

        let summary = summarize(&entries, timeline, plant_capacity, initial_online_capacity);

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            formulation,
            renewable_capacity,
            plant_capacity,
            partial_load_min: plant.curve.partial_load_min(),
            initial_online_capacity,
            objective: costs.net_cost(),
            costs,
            entries,
            summary,
        })
    }

    /// Commitment states of a binary solution, `None` for the continuous formulation
    pub fn commitment_states(&self) -> Option<Vec<bool>> {
        self.entries.iter().map(|e| e.commitment).collect()
    }

    /// Re-check the dispatch invariants on the reported values.
    ///
    /// `tolerance` is relative to the largest capacity or demand in the report.
    pub fn violations(&self, tolerance: f64) -> Vec<Violation> {
        let peak_demand = self.entries.iter().map(|e| e.demand).fold(0.0, f64::max);
        let scale = 1.0 + self.plant_capacity.max(self.renewable_capacity).max(peak_demand);
        let limit = tolerance * scale;

        let expected_events = self
            .commitment_states()
            .map(|states| transitions(&states, self.initial_online_capacity > 0.0));

        let mut found = Vec::new();
        let mut previous_online = self.initial_online_capacity;
        for (index, e) in self.entries.iter().enumerate() {
            let mut check = |kind, amount: f64| {
                if amount > limit {
                    found.push(Violation { step: e.step, kind, amount });
                }
            };

            check(ViolationKind::OutputAboveOnline, e.plant_output - e.online_capacity);
            check(
                ViolationKind::OutputBelowMinimumLoad,
                self.partial_load_min * e.online_capacity - e.plant_output,
            );
            check(ViolationKind::OnlineAboveInstalled, e.online_capacity - self.plant_capacity);
            check(
                ViolationKind::DemandShortfall,
                e.demand - (e.renewable_output + e.plant_output - e.export),
            );

            let change = e.online_capacity - previous_online;
            match (e.startup_event, e.shutdown_event) {
                (Some(started), Some(stopped)) => {
                    let consistent = expected_events
                        .as_ref()
                        .and_then(|expected| expected.get(index))
                        .is_some_and(|t| t.startup == started && t.shutdown == stopped);
                    // one whole unit switched the wrong way
                    let amount = if consistent { 0.0 } else { self.plant_capacity.max(1.0) };
                    check(ViolationKind::EventMismatch, amount);
                }
                _ => check(ViolationKind::StartupUndercounted, change - e.startup_capacity),
            }
            previous_online = e.online_capacity;
        }
        found
    }
}

fn summarize(
    entries: &[DispatchEntry],
    timeline: &Timeline,
    plant_capacity: f64,
    initial_online_capacity: f64,
) -> DispatchSummary {
    let hours = timeline.step_hours();
    let energy = |f: fn(&DispatchEntry) -> f64| hours * entries.iter().map(f).sum::<f64>();

    let demand_energy = energy(|e| e.demand);
    let plant_energy = energy(|e| e.plant_output);
    let fuel_energy = energy(|e| e.fuel_input);
    let renewable_served = energy(|e| e.renewable_output.min(e.demand));

    // Event counts come from the binary event variables when present and
    // from changes in online capacity otherwise
    let changes: Vec<f64> = std::iter::once(initial_online_capacity)
        .chain(entries.iter().map(|e| e.online_capacity))
        .tuple_windows()
        .map(|(previous, current)| current - previous)
        .collect();
    let binary = entries.iter().all(|e| e.startup_event.is_some());
    let (startup_count, shutdown_count) = if binary {
        (
            entries.iter().filter(|e| e.startup_event == Some(true)).count(),
            entries.iter().filter(|e| e.shutdown_event == Some(true)).count(),
        )
    } else {
        (
            changes.iter().filter(|&&c| c > EVENT_THRESHOLD).count(),
            changes.iter().filter(|&&c| c < -EVENT_THRESHOLD).count(),
        )
    };

    DispatchSummary {
        demand_energy,
        renewable_energy: energy(|e| e.renewable_output),
        plant_energy,
        fuel_energy,
        exported_energy: energy(|e| e.export),
        surplus_energy: energy(|e| e.surplus),
        renewable_share: (demand_energy > EVENT_THRESHOLD).then(|| renewable_served / demand_energy),
        plant_utilization: (plant_capacity > EVENT_THRESHOLD)
            .then(|| plant_energy / (plant_capacity * timeline.total_hours())),
        average_efficiency: (fuel_energy > EVENT_THRESHOLD).then(|| plant_energy / fuel_energy),
        startup_count,
        shutdown_count,
        started_capacity: changes.iter().filter(|&&c| c > 0.0).sum(),
    }
}
