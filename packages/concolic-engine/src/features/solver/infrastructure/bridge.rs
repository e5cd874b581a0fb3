//! Solver Bridge
//!
//! Single entry point from exploration to whichever backend is configured.
//!
//! ```text
//! constraints ──> SolverQuery ──> [CachingSolver] ──> AvmSolver | SmtLibSolver
//!                                                              │
//!      Solution (every query variable bound) <── completion <──┘
//! ```
//!
//! Every query gets a fresh deadline of `timeout` from the moment it is
//! submitted. Variables the backend leaves unconstrained keep the value they
//! held in the original run.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::avm::AvmSolver;
use super::cache::CachingSolver;
use super::smtlib::SmtLibSolver;
use crate::config::{SolverBackendKind, SolverConfig};
use crate::features::path_constraint::domain::Constraint;
use crate::features::solver::domain::{
    SolverError, SolverOutcome, SolverQuery, SolverResult, SolverStats,
};
use crate::features::solver::ports::SolverBackend;

pub struct SolverBridge {
    backend: Box<dyn SolverBackend>,
    timeout: Duration,
    stats: SolverStats,
}

impl SolverBridge {
    pub fn new(backend: Box<dyn SolverBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            stats: SolverStats::default(),
        }
    }

    /// Backend chosen by `config.backend`, behind a cache unless capacity is 0
    pub fn from_config(config: &SolverConfig) -> Self {
        let backend: Box<dyn SolverBackend> = match config.backend {
            SolverBackendKind::Avm => Box::new(AvmSolver::new(config.avm.clone())),
            SolverBackendKind::SmtLib => Box::new(SmtLibSolver::new(config.smtlib.clone())),
        };
        let backend = match NonZeroUsize::new(config.cache_capacity) {
            Some(capacity) => Box::new(CachingSolver::new(backend, capacity)),
            None => backend,
        };
        Self::new(backend, config.timeout())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Solve the conjunction of `constraints` under the configured timeout
    pub fn solve(&mut self, constraints: &[Constraint]) -> SolverResult<SolverOutcome> {
        self.solve_with_timeout(constraints, self.timeout)
    }

    pub fn solve_with_timeout(
        &mut self,
        constraints: &[Constraint],
        timeout: Duration,
    ) -> SolverResult<SolverOutcome> {
        let result = self.dispatch(constraints, timeout);
        self.stats.record(&result);
        result
    }

    fn dispatch(&mut self, constraints: &[Constraint], timeout: Duration) -> SolverResult<SolverOutcome> {
        if constraints.is_empty() {
            return Err(SolverError::EmptyQuery);
        }
        let query = SolverQuery::new(constraints.to_vec());
        let started = Instant::now();
        let deadline = started + timeout;

        debug!(
            backend = self.backend.name(),
            constraints = query.len(),
            timeout_ms = timeout.as_millis() as u64,
            "solving query"
        );

        match self.backend.solve(&query, deadline) {
            Ok(SolverOutcome::Sat(mut solution)) => {
                for var in query.variables() {
                    if !solution.contains(&var.name) {
                        solution.insert(var.name.clone(), var.initial.clone());
                    }
                }
                debug!(
                    elapsed_us = started.elapsed().as_micros() as u64,
                    values = solution.len(),
                    "query satisfiable"
                );
                Ok(SolverOutcome::Sat(solution))
            }
            Ok(SolverOutcome::Unsat) => {
                debug!(elapsed_us = started.elapsed().as_micros() as u64, "query unsatisfiable");
                Ok(SolverOutcome::Unsat)
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "query not answered");
                Err(e)
            }
        }
    }

    /// Counters so far, including cache hits reported by the backend
    pub fn stats(&self) -> SolverStats {
        SolverStats {
            cache_hits: self.backend.cache_hits(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AvmConfig, Preset};
    use crate::features::expression::domain::{Comparator, Expr, Operator, Sort, Value, VariableFactory};

    #[test]
    fn test_empty_query_is_an_error() {
        let mut bridge = SolverBridge::from_config(&SolverConfig::default());
        assert_eq!(bridge.solve(&[]), Err(SolverError::EmptyQuery));
        assert_eq!(bridge.stats().errors, 1);
    }

    #[test]
    fn test_unconstrained_variables_keep_initial_values() {
        let mut f = VariableFactory::new();
        let x = Expr::variable(f.fresh(Sort::Int32, Value::Int(0), i32::MIN as i64, i32::MAX as i64));
        let y = Expr::variable(f.fresh(Sort::Int32, Value::Int(42), i32::MIN as i64, i32::MAX as i64));
        // y * 0 drags y into the query without constraining it
        let zeroed = Expr::binary(Operator::Mul, Sort::Int32, y, Expr::int32(0), Value::Int(0));
        let sum = Expr::binary(Operator::Plus, Sort::Int32, x, zeroed, Value::Int(0));
        let mut bridge = SolverBridge::from_config(&SolverConfig::default());
        let outcome = bridge
            .solve(&[Constraint::new(sum, Comparator::Gt, Expr::int32(5))])
            .unwrap();
        let solution = outcome.solution().unwrap();
        assert!(solution.int("var0").unwrap() > 5);
        assert_eq!(solution.int("var1"), Some(42));
    }

    #[test]
    fn test_from_config_wraps_cache() {
        let config = SolverConfig::for_preset(Preset::Fast).cache_capacity(8);
        let mut bridge = SolverBridge::from_config(&config);
        assert_eq!(bridge.backend_name(), "avm");

        let mut f = VariableFactory::new();
        let v = Expr::variable(f.fresh(Sort::Int32, Value::Int(0), i32::MIN as i64, i32::MAX as i64));
        let constraints = vec![Constraint::new(v, Comparator::Gt, Expr::int32(0))];
        bridge.solve(&constraints).unwrap();
        bridge.solve(&constraints).unwrap();
        let stats = bridge.stats();
        assert_eq!(stats.queries, 2);
        assert_eq!(stats.sat, 2);
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn test_uncached_backend() {
        let config = SolverConfig::default()
            .cache_capacity(0)
            .avm(|a: AvmConfig| a.max_iterations(10));
        let mut bridge = SolverBridge::from_config(&config);

        let mut f = VariableFactory::new();
        let v = Expr::variable(f.fresh(Sort::Int32, Value::Int(0), i32::MIN as i64, i32::MAX as i64));
        let constraints = vec![Constraint::new(v, Comparator::Eq, Expr::int32(3))];
        bridge.solve(&constraints).unwrap();
        bridge.solve(&constraints).unwrap();
        assert_eq!(bridge.stats().cache_hits, 0);
    }
}
