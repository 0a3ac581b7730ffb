//! Continuous partial-load / startup formulation (LP)
//!
//! Online capacity is a continuous quantity bounded by the installed plant
//! capacity, which is sized together with the renewable capacity.
//!
//! The formulation considers:
//! - Renewable and plant investment (first-stage capacities)
//! - Partial-load operating range and linearized fuel burn
//! - Startup cost on every increase of online capacity
//! - Hard demand balance, with optional capped export

use good_lp::{constraint, variable, Expression};

use crate::domain::Scenario;
use crate::error::ModelError;
use crate::optimizer::constraints::{
    add_demand_balance, add_export, add_fuel_relation, add_operating_range, capacity_variable,
    export_revenue, previous_level, Boundary,
};
use crate::optimizer::{
    CommitmentVariables, DispatchFormulation, DispatchModel, DispatchVariables, Formulation,
    LinearProgram, PlantCapacity, Sense,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousFormulation;

impl DispatchFormulation for ContinuousFormulation {
    fn formulation(&self) -> Formulation {
        Formulation::Continuous
    }

    fn build(&self, scenario: &Scenario) -> Result<DispatchModel, ModelError> {
        let timeline = &scenario.timeline;
        let plant = &scenario.plant;
        let curve = &plant.curve;
        let hours = timeline.step_hours();

        let mut program = LinearProgram::new(Sense::Minimise);

        let renewable_capacity =
            program.add_variable(capacity_variable(scenario.renewable.max_capacity));
        let plant_capacity = program.add_variable(capacity_variable(plant.max_capacity));
        let online = program.add_series(timeline, variable().min(0.0));
        let output = program.add_series(timeline, variable().min(0.0));
        let fuel = program.add_series(timeline, variable().min(0.0));
        let startup = program.add_series(timeline, variable().min(0.0));
        let export = add_export(&mut program, scenario);

        for step in timeline.steps() {
            program.add_constraint(constraint!(online[step] <= plant_capacity));
            let p = curve.partial_load_min();
            add_operating_range(&mut program, p, online[step].into(), output[step]);
            add_fuel_relation(&mut program, curve, online[step].into(), output[step], fuel[step]);

            // Lower bound only: minimisation keeps it tight on increases and at zero on decreases
            let increase = Expression::from(online[step])
                - previous_level(timeline, &online, step, Boundary::Cold);
            program.add_constraint(constraint!(startup[step] >= increase));

            add_demand_balance(
                &mut program,
                scenario,
                step,
                renewable_capacity,
                output[step],
                export.as_ref().map(|e| e[step]),
            );
        }

        if plant.cold_start {
            let first = timeline.first();
            program.add_constraint(constraint!(online[first] == 0.0));
        }

        let mut objective = scenario.renewable.investment_cost * renewable_capacity
            + plant.investment_cost * plant_capacity;
        for step in timeline.steps() {
            objective += plant.startup_cost * startup[step];
            objective += plant.fuel_cost * hours * fuel[step];
        }
        objective -= export_revenue(scenario, export.as_ref());
        program.set_objective(objective);

        Ok(DispatchModel {
            program,
            variables: DispatchVariables {
                renewable_capacity,
                plant_capacity: PlantCapacity::Sized(plant_capacity),
                output,
                fuel,
                export,
                commitment: CommitmentVariables::Continuous { online, startup },
            },
        })
    }
}
