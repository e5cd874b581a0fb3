//! Alternating Variable Method solver
//!
//! Search-based backend that needs no external process:
//!
//! 1. **Interval pass**: bounds of the form `var <cmp> constant` are
//!    intersected per variable; an empty interval proves the query UNSAT.
//! 2. **Seeding**: constants appearing in the query (and their neighbours)
//!    are tried as values for each variable.
//! 3. **Alternating search**: one variable at a time is moved along the
//!    branch-distance gradient (exploratory ±step, then doubling pattern
//!    moves) until every constraint holds or a full cycle makes no progress.
//!
//! A search that stalls answers `Inconclusive`, never `Unsat`: only the
//! interval pass proves unsatisfiability.

mod integer;
mod real;
mod string;

use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

use super::distance::{constraint_distance, normalize};
use super::interval_tracker::IntervalTracker;
use crate::config::AvmConfig;
use crate::features::expression::domain::{Domain, Expr, Value, Variable};
use crate::features::expression::infrastructure::{Assignment, ExpressionEvaluator};
use crate::features::path_constraint::domain::Constraint;
use crate::features::solver::domain::{
    Solution, SolverError, SolverOutcome, SolverQuery, SolverResult,
};
use crate::features::solver::ports::SolverBackend;

/// Constraints evaluated between two deadline checks
const DEADLINE_CHECK_INTERVAL: usize = 64;

/// Seeding never tries more than this many constants per domain
const MAX_SEED_CONSTANTS: usize = 64;

/// Search-based solver over integers, reals and strings
#[derive(Debug, Clone)]
pub struct AvmSolver {
    config: AvmConfig,
}

impl AvmSolver {
    pub fn new(config: AvmConfig) -> Self {
        Self { config }
    }
}

impl Default for AvmSolver {
    fn default() -> Self {
        Self::new(AvmConfig::default())
    }
}

impl SolverBackend for AvmSolver {
    fn name(&self) -> &'static str {
        "avm"
    }

    fn solve(&mut self, query: &SolverQuery, deadline: Instant) -> SolverResult<SolverOutcome> {
        if Instant::now() >= deadline {
            return Err(SolverError::Timeout);
        }

        let variables: Vec<Arc<Variable>> = query.variables().into_iter().collect();
        let mut intervals = IntervalTracker::new();
        for var in &variables {
            intervals.seed(var);
        }
        for (i, constraint) in query.constraints().iter().enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                return Err(SolverError::Timeout);
            }
            if !intervals.add_constraint(constraint) {
                debug!(constraint = %constraint, "interval pass proved query unsatisfiable");
                return Ok(SolverOutcome::Unsat);
            }
        }

        let mut search = Search::new(query.constraints(), &variables, intervals, &self.config, deadline);
        let outcome = search.run(&variables);
        trace!(evaluations = search.evaluations, "avm search finished");
        outcome
    }
}

/// Mutable state of one search
pub(super) struct Search<'q> {
    constraints: &'q [Constraint],
    assignment: Assignment,
    intervals: IntervalTracker,
    /// Fitness of `assignment`; zero when every constraint holds
    best: f64,
    evaluations: u64,
    max_iterations: u64,
    deadline: Instant,
    span: u32,
    precision_digits: u32,
}

impl<'q> Search<'q> {
    fn new(
        constraints: &'q [Constraint],
        variables: &[Arc<Variable>],
        intervals: IntervalTracker,
        config: &AvmConfig,
        deadline: Instant,
    ) -> Self {
        let mut assignment = Assignment::new();
        for var in variables {
            let start = match (&var.initial, intervals.get_interval(&var.name)) {
                (Value::Int(v), Some(interval)) => Value::Int(interval.clamp(*v)),
                (Value::Int(v), None) => Value::Int(var.clamp_to_bounds(*v)),
                (other, _) => other.clone(),
            };
            assignment.insert(var.name.clone(), start);
        }
        Self {
            constraints,
            assignment,
            intervals,
            best: f64::MAX,
            evaluations: 0,
            max_iterations: config.max_iterations,
            deadline,
            span: config.string_alphabet_span,
            precision_digits: config.real_precision_digits,
        }
    }

    fn run(&mut self, variables: &[Arc<Variable>]) -> SolverResult<SolverOutcome> {
        self.best = self.fitness()?;
        if self.is_solved() {
            return Ok(SolverOutcome::Sat(self.solution(variables)));
        }
        if variables.is_empty() {
            // Nothing to move: the constraints are fixed and violated
            return Ok(SolverOutcome::Unsat);
        }

        self.seed_constants(variables)?;

        loop {
            if self.is_solved() {
                return Ok(SolverOutcome::Sat(self.solution(variables)));
            }
            let before = self.best;
            for var in variables {
                match var.sort.domain() {
                    Domain::Integer => self.search_integer(var)?,
                    Domain::Real => self.search_real(var)?,
                    Domain::String => self.search_string(var)?,
                }
                if self.is_solved() {
                    return Ok(SolverOutcome::Sat(self.solution(variables)));
                }
            }
            if self.best >= before {
                debug!(fitness = self.best, "avm search stalled");
                return Err(SolverError::Inconclusive);
            }
        }
    }

    fn is_solved(&self) -> bool {
        self.best == 0.0
    }

    /// Sum of normalized branch distances of the current assignment
    ///
    /// Every call counts against the iteration budget.
    fn fitness(&mut self) -> SolverResult<f64> {
        self.evaluations += 1;
        if self.evaluations > self.max_iterations {
            return Err(SolverError::Inconclusive);
        }
        if Instant::now() >= self.deadline {
            return Err(SolverError::Timeout);
        }

        let mut evaluator = ExpressionEvaluator::new(&self.assignment);
        let mut total = 0.0;
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 && i % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= self.deadline {
                return Err(SolverError::Timeout);
            }
            total += normalize(constraint_distance(constraint, &mut evaluator));
        }
        Ok(total)
    }

    /// Move `name` to `value` if that strictly lowers the fitness
    fn try_value(&mut self, name: &str, value: Value) -> SolverResult<bool> {
        self.try_value_with(name, value, false)
    }

    /// Move `name` to `value` if the fitness improves (or stays equal when
    /// `accept_equal`); otherwise restore the previous value
    fn try_value_with(&mut self, name: &str, value: Value, accept_equal: bool) -> SolverResult<bool> {
        let previous = self.assignment.insert(name.to_string(), value);
        let fitness = self.fitness()?;
        if fitness < self.best || (accept_equal && fitness == self.best) {
            self.best = fitness;
            return Ok(true);
        }
        match previous {
            Some(old) => {
                self.assignment.insert(name.to_string(), old);
            }
            None => {
                self.assignment.remove(name);
            }
        }
        Ok(false)
    }

    /// Set `name` unconditionally and re-evaluate
    fn force_value(&mut self, name: &str, value: Value) -> SolverResult<()> {
        self.assignment.insert(name.to_string(), value);
        self.best = self.fitness()?;
        Ok(())
    }

    fn current(&self, var: &Variable) -> Value {
        self.assignment
            .get(&var.name)
            .cloned()
            .unwrap_or_else(|| var.initial.clone())
    }

    /// Try every constant of the variable's domain found in the query
    fn seed_constants(&mut self, variables: &[Arc<Variable>]) -> SolverResult<()> {
        let constants = QueryConstants::collect(self.constraints);
        for var in variables {
            match var.sort.domain() {
                Domain::Integer => {
                    for c in constants.ints.iter().take(MAX_SEED_CONSTANTS) {
                        for candidate in [*c, c.saturating_sub(1), c.saturating_add(1)] {
                            let candidate = self.clamp_int(var, candidate);
                            self.try_value(&var.name, Value::Int(candidate))?;
                            if self.is_solved() {
                                return Ok(());
                            }
                        }
                    }
                }
                Domain::Real => {
                    for c in constants.reals.iter().take(MAX_SEED_CONSTANTS) {
                        self.try_value(&var.name, Value::Real(*c))?;
                        if self.is_solved() {
                            return Ok(());
                        }
                    }
                }
                Domain::String => {
                    for c in constants.strings.iter().take(MAX_SEED_CONSTANTS) {
                        self.try_value(&var.name, Value::Str(c.clone()))?;
                        if self.is_solved() {
                            return Ok(());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Clamp into the variable's interval (its declared bounds at least)
    fn clamp_int(&self, var: &Variable, value: i64) -> i64 {
        let value = var.clamp_to_bounds(value);
        match self.intervals.get_interval(&var.name) {
            Some(interval) => interval.clamp(value),
            None => value,
        }
    }

    fn solution(&self, variables: &[Arc<Variable>]) -> Solution {
        let mut solution = Solution::new();
        for var in variables {
            let value = match self.current(var) {
                Value::Int(v) => Value::Int(var.sort.wrap(v)),
                other => other,
            };
            solution.insert(var.name.clone(), value);
        }
        solution
    }
}

/// Constants appearing in a query, per domain
#[derive(Debug, Default)]
struct QueryConstants {
    ints: BTreeSet<i64>,
    reals: Vec<f64>,
    strings: BTreeSet<String>,
}

impl QueryConstants {
    /// Variable-free subtrees count as constants (their observed value)
    fn collect(constraints: &[Constraint]) -> Self {
        let mut out = Self::default();
        let mut visited = FxHashSet::default();
        let mut stack: Vec<&Expr> = constraints.iter().flat_map(|c| [&c.left, &c.right]).collect();
        while let Some(expr) = stack.pop() {
            if !visited.insert(expr.node_id()) {
                continue;
            }
            if !expr.contains_symbolic_variable() {
                match expr.concrete_value() {
                    Value::Int(v) => {
                        out.ints.insert(*v);
                    }
                    Value::Real(v) if v.is_finite() && !out.reals.contains(v) => out.reals.push(*v),
                    Value::Real(_) => {}
                    Value::Str(s) => {
                        out.strings.insert(s.clone());
                    }
                }
                continue;
            }
            stack.extend(expr.children());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expression::domain::{Comparator, Operator, Sort, VariableFactory};
    use std::time::Duration;

    fn solve(constraints: Vec<Constraint>) -> SolverResult<SolverOutcome> {
        let mut solver = AvmSolver::default();
        let deadline = Instant::now() + Duration::from_secs(5);
        solver.solve(&SolverQuery::new(constraints), deadline)
    }

    fn int_var(f: &mut VariableFactory, initial: i64) -> Expr {
        Expr::variable(f.fresh(Sort::Int32, Value::Int(initial), i32::MIN as i64, i32::MAX as i64))
    }

    #[test]
    fn test_sat_by_clamping_into_interval() {
        let mut f = VariableFactory::new();
        let v = int_var(&mut f, 0);
        let outcome = solve(vec![
            Constraint::new(v.clone(), Comparator::Gt, Expr::int32(0)),
            Constraint::new(v, Comparator::Lt, Expr::int32(10)),
        ])
        .unwrap();
        let value = outcome.solution().unwrap().int("var0").unwrap();
        assert!(value > 0 && value < 10);
    }

    #[test]
    fn test_unsat_from_intervals() {
        let mut f = VariableFactory::new();
        let v = int_var(&mut f, 0);
        let outcome = solve(vec![
            Constraint::new(v.clone(), Comparator::Gt, Expr::int32(0)),
            Constraint::new(v.clone(), Comparator::Lt, Expr::int32(10)),
            Constraint::new(v, Comparator::Gt, Expr::int32(100)),
        ])
        .unwrap();
        assert_eq!(outcome, SolverOutcome::Unsat);
    }

    #[test]
    fn test_linear_equation_follows_gradient() {
        let mut f = VariableFactory::new();
        let x = int_var(&mut f, 0);
        // 3 * x + 7 == 52
        let times = Expr::binary(Operator::Mul, Sort::Int32, Expr::int32(3), x, Value::Int(0));
        let sum = Expr::binary(Operator::Plus, Sort::Int32, times, Expr::int32(7), Value::Int(7));
        let outcome = solve(vec![Constraint::new(sum, Comparator::Eq, Expr::int32(52))]).unwrap();
        assert_eq!(outcome.solution().unwrap().int("var0"), Some(15));
    }

    #[test]
    fn test_real_search() {
        let mut f = VariableFactory::new();
        let r = Expr::variable(f.fresh(Sort::Real, Value::Real(0.0), i64::MIN, i64::MAX));
        let outcome = solve(vec![
            Constraint::new(r.clone(), Comparator::Gt, Expr::real(2.5)),
            Constraint::new(r, Comparator::Lt, Expr::real(2.6)),
        ])
        .unwrap();
        let value = outcome.solution().unwrap().real("var0").unwrap();
        assert!(value > 2.5 && value < 2.6);
    }

    #[test]
    fn test_string_equality_search() {
        let mut f = VariableFactory::new();
        let s = Expr::variable(f.fresh(Sort::String, Value::from("xyz"), i64::MIN, i64::MAX));
        let eq = Expr::binary(Operator::Equals, Sort::Int32, s, Expr::string("ab"), Value::Int(0));
        let outcome = solve(vec![Constraint::new(eq, Comparator::Ne, Expr::int32(0))]).unwrap();
        assert_eq!(outcome.solution().unwrap().string("var0"), Some("ab"));
    }

    #[test]
    fn test_fixed_violated_constraint_without_variables() {
        let outcome = solve(vec![Constraint::new(Expr::int32(1), Comparator::Eq, Expr::int32(2))]).unwrap();
        assert_eq!(outcome, SolverOutcome::Unsat);
    }

    #[test]
    fn test_iteration_budget_is_inconclusive() {
        let mut f = VariableFactory::new();
        let x = int_var(&mut f, 1);
        // x * x == 2 has no integer solution and no interval proof
        let square = Expr::binary(Operator::Mul, Sort::Int32, x.clone(), x, Value::Int(1));
        let mut solver = AvmSolver::new(AvmConfig::default().max_iterations(50));
        let result = solver.solve(
            &SolverQuery::new(vec![Constraint::new(square, Comparator::Eq, Expr::int32(2))]),
            Instant::now() + Duration::from_secs(5),
        );
        assert_eq!(result, Err(SolverError::Inconclusive));
    }

    #[test]
    fn test_expired_deadline_times_out() {
        let mut f = VariableFactory::new();
        let v = int_var(&mut f, 0);
        let mut solver = AvmSolver::default();
        let result = solver.solve(
            &SolverQuery::new(vec![Constraint::new(v, Comparator::Gt, Expr::int32(0))]),
            Instant::now(),
        );
        assert_eq!(result, Err(SolverError::Timeout));
    }
}
