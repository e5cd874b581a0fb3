//! Integer moves

use super::Search;
use crate::features::expression::domain::{Value, Variable};
use crate::features::solver::domain::SolverResult;

impl Search<'_> {
    /// Move one integer variable until neither direction improves
    pub(super) fn search_integer(&mut self, var: &Variable) -> SolverResult<()> {
        loop {
            if self.is_solved() {
                return Ok(());
            }
            let improved = self.pattern_move_int(var, 1)? || self.pattern_move_int(var, -1)?;
            if !improved {
                return Ok(());
            }
        }
    }

    /// Exploratory step of 1, then doubling steps while they keep improving
    fn pattern_move_int(&mut self, var: &Variable, direction: i64) -> SolverResult<bool> {
        if !self.step_int(var, direction)? {
            return Ok(false);
        }
        let mut step = direction;
        loop {
            step = step.saturating_mul(2);
            if self.is_solved() || !self.step_int(var, step)? {
                return Ok(true);
            }
        }
    }

    fn step_int(&mut self, var: &Variable, delta: i64) -> SolverResult<bool> {
        let current = self.current(var).as_int().unwrap_or(0);
        let candidate = self.clamp_int(var, current.saturating_add(delta));
        if candidate == current {
            return Ok(false);
        }
        self.try_value(&var.name, Value::Int(candidate))
    }
}
