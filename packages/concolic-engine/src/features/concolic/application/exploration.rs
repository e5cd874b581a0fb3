/*
 * Path Exploration
 *
 * For every recorded decision k of a finished run, asks the solver for
 * inputs that keep decisions 0..k and flip decision k. Unsatisfiable and
 * failed queries mean "no new test for this decision"; the search moves on.
 */

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::features::concolic::domain::RunResult;
use crate::features::concolic::ports::TestPatcher;
use crate::features::solver::domain::{Solution, SolverOutcome, SolverStats};
use crate::features::solver::SolverBridge;

pub struct Explorer {
    bridge: SolverBridge,
    slice: bool,
}

impl Explorer {
    pub fn new(bridge: SolverBridge, slice: bool) -> Self {
        Self { bridge, slice }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            SolverBridge::from_config(&config.solver),
            config.concolic.slice_queries,
        )
    }

    pub fn bridge(&self) -> &SolverBridge {
        &self.bridge
    }

    pub fn stats(&self) -> SolverStats {
        self.bridge.stats()
    }

    /// Solve the alternative of decision `k`
    ///
    /// A solution that does not satisfy the query under the engine's own
    /// semantics (possible when a backend approximates an operator) is
    /// dropped.
    pub fn solve_alternative(&mut self, run: &RunResult, k: usize) -> Option<Solution> {
        let query = run.path_condition.alternative_query(k, self.slice)?;
        let solution = match self.bridge.solve(&query) {
            Ok(SolverOutcome::Sat(solution)) => solution,
            Ok(SolverOutcome::Unsat) => {
                debug!(decision = k, "alternative infeasible");
                return None;
            }
            // Already reported by the bridge
            Err(_) => return None,
        };

        let assignment = solution.assignment();
        if !query.iter().all(|c| c.is_satisfied_by(assignment)) {
            debug!(decision = k, "solution does not replay, dropped");
            return None;
        }
        Some(solution)
    }

    /// Alternatives of every decision, in program order
    pub fn explore(&mut self, run: &RunResult) -> Vec<(usize, Solution)> {
        let found: Vec<(usize, Solution)> = (0..run.path_condition.len())
            .filter_map(|k| self.solve_alternative(run, k).map(|s| (k, s)))
            .collect();
        info!(
            decisions = run.path_condition.len(),
            solved = found.len(),
            "explored run alternatives"
        );
        found
    }

    /// New candidate tests from every solved alternative
    pub fn patch_all<P: TestPatcher>(
        &mut self,
        run: &RunResult,
        original: &P::Candidate,
        patcher: &mut P,
    ) -> Vec<P::Candidate> {
        self.explore(run)
            .into_iter()
            .filter_map(|(_, solution)| patcher.patch(original, &solution))
            .collect()
    }
}
