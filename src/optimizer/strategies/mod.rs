//! Dispatch formulations
//!
//! - Continuous: online capacity relaxation with a startup lower bound (LP)
//! - Commitment: binary on/off scheduling with exact startup/shutdown events (MILP)

pub mod commitment;
pub mod continuous;

pub use commitment::*;
pub use continuous::*;

use super::{DispatchFormulation, Formulation};

pub fn formulation_for(formulation: Formulation) -> Box<dyn DispatchFormulation> {
    match formulation {
        Formulation::Continuous => Box::new(ContinuousFormulation),
        Formulation::Binary => Box::new(CommitmentFormulation),
    }
}
