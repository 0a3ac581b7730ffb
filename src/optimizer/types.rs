use std::collections::HashMap;

use good_lp::{variable, Constraint, Expression, ProblemVariables, Variable, VariableDefinition};
use serde::{Deserialize, Serialize};

use crate::domain::{Scenario, TimeSeries, Timeline};
use crate::error::ModelError;

/// Which encoding of the commitment decision to build
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
    strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Formulation {
    /// Continuous online capacity with a startup lower bound (LP)
    #[default]
    Continuous,
    /// 0/1 commitment with exact startup/shutdown events (MILP)
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimise,
    Maximise,
}

/// A complete LP/MILP, owned by whoever built it and handed to a solver by value
pub struct LinearProgram {
    variables: ProblemVariables,
    declared: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Expression,
    sense: Sense,
    binaries: usize,
}

impl LinearProgram {
    pub fn new(sense: Sense) -> Self {
        Self {
            variables: ProblemVariables::new(),
            declared: Vec::new(),
            constraints: Vec::new(),
            objective: Expression::default(),
            sense,
            binaries: 0,
        }
    }

    pub fn add_variable(&mut self, definition: VariableDefinition) -> Variable {
        let var = self.variables.add(definition);
        self.declared.push(var);
        var
    }

    /// One variable per time step, all sharing `definition`
    pub fn add_series(
        &mut self,
        timeline: &Timeline,
        definition: VariableDefinition,
    ) -> TimeSeries<Variable> {
        TimeSeries::from_fn(timeline, |_| self.add_variable(definition.clone()))
    }

    pub fn add_binary_series(&mut self, timeline: &Timeline) -> TimeSeries<Variable> {
        self.binaries += timeline.len();
        self.add_series(timeline, variable().binary())
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn set_objective(&mut self, objective: Expression) {
        self.objective = objective;
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn num_variables(&self) -> usize {
        self.declared.len()
    }

    pub fn num_binaries(&self) -> usize {
        self.binaries
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn into_parts(self) -> (ProblemVariables, Vec<Variable>, Vec<Constraint>, Expression, Sense) {
        (
            self.variables,
            self.declared,
            self.constraints,
            self.objective,
            self.sense,
        )
    }
}

/// Optimal value of every declared variable
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    values: HashMap<Variable, f64>,
}

impl Assignment {
    /// Value of `var`, `None` for a variable the solver never saw
    pub fn value(&self, var: Variable) -> Option<f64> {
        self.values.get(&var).copied()
    }
}

impl FromIterator<(Variable, f64)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (Variable, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// External solver: takes a complete program, returns an optimal assignment.
///
/// Implementations block until the solve finishes.
pub trait SolverAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, program: LinearProgram) -> Result<Assignment, ModelError>;
}

/// Installed plant capacity: a first-stage decision or a fixed unit size
#[derive(Debug, Clone, Copy)]
pub enum PlantCapacity {
    Sized(Variable),
    Fixed(f64),
}

/// Per-step variables that carry the commitment decision
#[derive(Debug, Clone)]
pub enum CommitmentVariables {
    Continuous {
        online: TimeSeries<Variable>,
        startup: TimeSeries<Variable>,
    },
    Binary {
        state: TimeSeries<Variable>,
        startup: TimeSeries<Variable>,
        shutdown: TimeSeries<Variable>,
        unit_capacity: f64,
    },
}

/// Handles to the variables of a built model, used to read the solution back
#[derive(Debug, Clone)]
pub struct DispatchVariables {
    pub renewable_capacity: Variable,
    pub plant_capacity: PlantCapacity,
    pub output: TimeSeries<Variable>,
    pub fuel: TimeSeries<Variable>,
    pub export: Option<TimeSeries<Variable>>,
    pub commitment: CommitmentVariables,
}

pub struct DispatchModel {
    pub program: LinearProgram,
    pub variables: DispatchVariables,
}

/// One encoding of the dispatch and capacity-commitment problem
pub trait DispatchFormulation: Send + Sync {
    fn formulation(&self) -> Formulation;

    fn build(&self, scenario: &Scenario) -> Result<DispatchModel, ModelError>;
}
