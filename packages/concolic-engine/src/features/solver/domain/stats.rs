//! Solver statistics

use serde::Serialize;

use super::error::SolverError;
use super::solution::SolverOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    pub queries: u64,
    pub sat: u64,
    pub unsat: u64,
    pub timeouts: u64,
    /// Parse, backend, empty-query and inconclusive failures
    pub errors: u64,
    pub cache_hits: u64,
}

impl SolverStats {
    pub fn record(&mut self, result: &Result<SolverOutcome, SolverError>) {
        self.queries += 1;
        match result {
            Ok(SolverOutcome::Sat(_)) => self.sat += 1,
            Ok(SolverOutcome::Unsat) => self.unsat += 1,
            Err(SolverError::Timeout) => self.timeouts += 1,
            Err(_) => self.errors += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::solver::domain::Solution;

    #[test]
    fn test_record() {
        let mut stats = SolverStats::default();
        stats.record(&Ok(SolverOutcome::Sat(Solution::new())));
        stats.record(&Ok(SolverOutcome::Unsat));
        stats.record(&Err(SolverError::Timeout));
        stats.record(&Err(SolverError::EmptyQuery));
        assert_eq!(
            stats,
            SolverStats {
                queries: 4,
                sat: 1,
                unsat: 1,
                timeouts: 1,
                errors: 1,
                cache_hits: 0,
            }
        );
    }
}
