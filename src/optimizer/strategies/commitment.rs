//! Binary unit-commitment formulation (MILP)
//!
//! The plant is a fixed-size unit switched on and off per step. Its online
//! capacity is `capacity_max * state[t]` and its output lies in
//! `[capacity_min, capacity_max] * state[t]`, which collapses to zero when the
//! unit is off. The fuel relation is the same row as in the continuous
//! formulation.
//!
//! Startup and shutdown events are tied to the state change by an equality,
//! and at most one of them may fire per step. Both events are therefore exact
//! whatever the cost coefficients, including an unpenalized shutdown.

use good_lp::{constraint, variable, Expression};

use crate::domain::Scenario;
use crate::error::{ConfigurationError, ModelError};
use crate::optimizer::constraints::{
    add_demand_balance, add_export, add_fuel_relation, capacity_variable, export_revenue,
    previous_level, Boundary,
};
use crate::optimizer::{
    CommitmentVariables, DispatchFormulation, DispatchModel, DispatchVariables, Formulation,
    LinearProgram, PlantCapacity, Sense,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CommitmentFormulation;

impl DispatchFormulation for CommitmentFormulation {
    fn formulation(&self) -> Formulation {
        Formulation::Binary
    }

    fn build(&self, scenario: &Scenario) -> Result<DispatchModel, ModelError> {
        let unit = scenario
            .commitment
            .as_ref()
            .ok_or(ConfigurationError::MissingCommitment)?;
        let timeline = &scenario.timeline;
        let plant = &scenario.plant;
        let curve = &plant.curve;
        let hours = timeline.step_hours();
        let capacity = unit.capacity_max;
        let capacity_min = unit.capacity_min(curve);
        let boundary = if unit.initially_online {
            Boundary::Level(1.0)
        } else {
            Boundary::Cold
        };

        let mut program = LinearProgram::new(Sense::Minimise);

        let renewable_capacity =
            program.add_variable(capacity_variable(scenario.renewable.max_capacity));
        let state = program.add_binary_series(timeline);
        let startup = program.add_binary_series(timeline);
        let shutdown = program.add_binary_series(timeline);
        let output = program.add_series(timeline, variable().min(0.0));
        let fuel = program.add_series(timeline, variable().min(0.0));
        let export = add_export(&mut program, scenario);

        for step in timeline.steps() {
            let online = capacity * state[step];
            program.add_constraint(constraint!(output[step] <= online.clone()));
            program.add_constraint(constraint!(output[step] >= capacity_min * state[step]));
            add_fuel_relation(&mut program, curve, online, output[step], fuel[step]);

            let change =
                Expression::from(state[step]) - previous_level(timeline, &state, step, boundary);
            program.add_constraint(constraint!(startup[step] - shutdown[step] == change));
            program.add_constraint(constraint!(startup[step] + shutdown[step] <= 1.0));

            add_demand_balance(
                &mut program,
                scenario,
                step,
                renewable_capacity,
                output[step],
                export.as_ref().map(|e| e[step]),
            );
        }

        // The unit's investment is sunk in this encoding: a constant offset
        let mut objective = Expression::from(plant.investment_cost * capacity);
        objective += scenario.renewable.investment_cost * renewable_capacity;
        for step in timeline.steps() {
            objective += plant.startup_cost * capacity * startup[step];
            objective += unit.shutdown_cost * shutdown[step];
            objective += unit.fixed_cost * hours * state[step];
            objective += plant.fuel_cost * hours * fuel[step];
        }
        objective -= export_revenue(scenario, export.as_ref());
        program.set_objective(objective);

        Ok(DispatchModel {
            program,
            variables: DispatchVariables {
                renewable_capacity,
                plant_capacity: PlantCapacity::Fixed(capacity),
                output,
                fuel,
                export,
                commitment: CommitmentVariables::Binary {
                    state,
                    startup,
                    shutdown,
                    unit_capacity: capacity,
                },
            },
        })
    }
}
