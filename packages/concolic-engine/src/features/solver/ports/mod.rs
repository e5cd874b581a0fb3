//! Solver ports

use std::time::Instant;

use crate::features::solver::domain::{SolverOutcome, SolverQuery, SolverResult};

/// Downstream constraint solver
///
/// A backend must give up with `SolverError::Timeout` once `deadline`
/// passes; it is never retried.
pub trait SolverBackend: Send {
    /// Name of this backend
    fn name(&self) -> &'static str;

    /// Answer one query
    fn solve(&mut self, query: &SolverQuery, deadline: Instant) -> SolverResult<SolverOutcome>;

    /// Queries answered without reaching a backend
    fn cache_hits(&self) -> u64 {
        0
    }
}
