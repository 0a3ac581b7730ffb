//! Open Energy Planner
//!
//! Time-coupled generator dispatch and capacity commitment as LP/MILP models:
//! a continuous partial-load/startup formulation and a binary unit-commitment
//! formulation, built from a validated [`domain::Scenario`] and solved through
//! a [`optimizer::SolverAdapter`].

pub mod config;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod report;
pub mod sweep;
pub mod telemetry;

pub use error::{ConfigurationError, ModelError};
