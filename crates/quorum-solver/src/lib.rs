//! Solver-facing abstractions for compiled decision programs.
//!
//! Backends receive a [`quorum_core::Program`] prepared by
//! [`prepare_program`], search its outermost variable space, and hand the
//! result back through [`recover_solution`] to obtain one value per choice.
//!
//! # Overview
//!
//! - [`SolverConfig`]: Configuration options for solver behavior
//! - [`Linearization`]: Which linearization pass runs before a solve
//! - [`SolverStatus`]: Common status values across solvers
//! - [`SolverError`]: Error types for solver operations
//! - [`Solve`]: Trait for solver implementations
//! - [`SolutionView`]: Trait for accessing solution data

mod config;
mod error;
mod prepare;
mod recover;
mod status;
mod traits;

pub use config::{Linearization, SolverConfig};
pub use error::SolverError;
pub use prepare::{ensure_linear, prepare_program};
pub use recover::{recover_from_bridge, recover_selection, recover_solution, selected_choices};
pub use status::SolverStatus;
pub use traits::{SolutionView, Solve};
