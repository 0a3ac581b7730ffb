//! good_lp-backed solver adapter
//!
//! Uses the pure-Rust `microlp` backend, which handles both the continuous LP
//! and the branch-and-bound needed by the binary commitment formulation.

use std::time::Instant;

use good_lp::{Solution, SolverModel};

use super::{Assignment, LinearProgram, Sense, SolverAdapter};
use crate::error::ModelError;

#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl SolverAdapter for MicroLpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, program: LinearProgram) -> Result<Assignment, ModelError> {
        let (variables, declared, constraints, objective, sense) = program.into_parts();
        let started = Instant::now();

        let unsolved = match sense {
            Sense::Minimise => variables.minimise(objective),
            Sense::Maximise => variables.maximise(objective),
        };
        let mut model = unsolved.using(good_lp::microlp);
        for constraint in constraints {
            model = model.with(constraint);
        }

        let solution = model.solve().map_err(|err| {
            tracing::warn!(solver = self.name(), error = %err, "solve failed");
            ModelError::from(err)
        })?;

        tracing::debug!(
            solver = self.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solve finished"
        );

        Ok(declared
            .into_iter()
            .map(|var| (var, solution.value(var)))
            .collect())
    }
}
