//! Real moves
//!
//! Same exploratory/pattern scheme as integers, repeated at steps of
//! 1, 0.1, 0.01, ... down to the configured precision.

use super::Search;
use crate::features::expression::domain::{Value, Variable};
use crate::features::solver::domain::SolverResult;

impl Search<'_> {
    pub(super) fn search_real(&mut self, var: &Variable) -> SolverResult<()> {
        let start = self.current(var).as_real().unwrap_or(0.0);
        if !start.is_finite() {
            self.force_value(&var.name, Value::Real(0.0))?;
        }

        for precision in 0..=self.precision_digits {
            let unit = 10f64.powi(-(precision as i32));
            loop {
                if self.is_solved() {
                    return Ok(());
                }
                let improved = self.pattern_move_real(var, unit, precision)?
                    || self.pattern_move_real(var, -unit, precision)?;
                if !improved {
                    break;
                }
            }
        }
        Ok(())
    }

    fn pattern_move_real(&mut self, var: &Variable, unit: f64, precision: u32) -> SolverResult<bool> {
        if !self.step_real(var, unit, precision)? {
            return Ok(false);
        }
        let mut step = unit;
        loop {
            step *= 2.0;
            if self.is_solved() || !step.is_finite() || !self.step_real(var, step, precision)? {
                return Ok(true);
            }
        }
    }

    fn step_real(&mut self, var: &Variable, delta: f64, precision: u32) -> SolverResult<bool> {
        let current = self.current(var).as_real().unwrap_or(0.0);
        let candidate = round_to(current + delta, precision);
        if !candidate.is_finite() || candidate == current {
            return Ok(false);
        }
        self.try_value(&var.name, Value::Real(candidate))
    }
}

/// Round to `precision` decimal places, leaving huge magnitudes alone
fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= 1e15 {
        return value;
    }
    scaled.round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_precision() {
        assert_eq!(round_to(2.5 + 0.01, 2), 2.51);
        assert_eq!(round_to(0.1 + 0.2, 1), 0.3);
        assert_eq!(round_to(1e300, 6), 1e300);
    }
}
