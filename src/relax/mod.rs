//! Force-based path relaxation.
//!
//! [`RelaxationSolver`] moves the movable nodes of a [`WorkingPath`](crate::path::WorkingPath)
//! a bounded step per round until the largest step falls below the
//! convergence tolerance or the iteration cap is reached.

mod forces;
mod solver;

pub use forces::{ForceModel, Push};
pub use solver::{RelaxationSolver, SolverReport, SolverState, MAX_BACKOFF_HALVINGS};
