pub mod constraints;
pub mod solver;
pub mod strategies;
pub mod types;

pub use solver::*;
pub use strategies::*;
pub use types::*;

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::Scenario;
use crate::error::ModelError;
use crate::report::DispatchReport;

/// Tolerance used when re-checking invariants on a returned solution
pub const VERIFY_TOLERANCE: f64 = 1e-6;

/// Runs one build-solve-report cycle per scenario
#[derive(Clone)]
pub struct DispatchOptimizer {
    solver: Arc<dyn SolverAdapter>,
}

impl Default for DispatchOptimizer {
    fn default() -> Self {
        Self::new(Arc::new(MicroLpSolver))
    }
}

impl DispatchOptimizer {
    pub fn new(solver: Arc<dyn SolverAdapter>) -> Self {
        Self { solver }
    }

    pub fn optimize(&self, scenario: &Scenario) -> Result<DispatchReport, ModelError> {
        scenario.validate()?;

        let strategy = formulation_for(scenario.formulation);
        let DispatchModel { program, variables } = strategy.build(scenario)?;
        info!(
            formulation = %strategy.formulation(),
            steps = scenario.timeline.len(),
            variables = program.num_variables(),
            binaries = program.num_binaries(),
            constraints = program.num_constraints(),
            solver = self.solver.name(),
            "model built"
        );

        let assignment = self.solver.solve(program)?;
        let report = DispatchReport::from_assignment(scenario, &variables, &assignment)?;

        for violation in report.violations(VERIFY_TOLERANCE) {
            warn!(
                step = violation.step,
                kind = %violation.kind,
                amount = violation.amount,
                "invariant violated by solution"
            );
        }
        info!(
            formulation = %report.formulation,
            objective = report.objective,
            renewable_capacity = report.renewable_capacity,
            plant_capacity = report.plant_capacity,
            "dispatch solved"
        );
        Ok(report)
    }
}
