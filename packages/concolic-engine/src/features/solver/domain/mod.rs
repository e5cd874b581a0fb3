//! Solver domain models

pub mod error;
pub mod query;
pub mod solution;
pub mod stats;

pub use error::{SolverError, SolverResult};
pub use query::SolverQuery;
pub use solution::{Solution, SolverOutcome};
pub use stats::SolverStats;
