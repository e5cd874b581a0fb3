//! String moves
//!
//! Three phases per variable: drop trailing characters while the fitness
//! does not get worse, search each remaining character's code point, then
//! append characters while appending helps.

use super::Search;
use crate::features::expression::domain::{Value, Variable};
use crate::features::solver::domain::SolverResult;

/// Case flip distance in ASCII
const CASE_OFFSET: i64 = 32;

impl Search<'_> {
    pub(super) fn search_string(&mut self, var: &Variable) -> SolverResult<()> {
        self.remove_characters(var)?;
        if self.is_solved() {
            return Ok(());
        }

        let len = self.chars(var).len();
        for index in 0..len {
            self.search_char(var, index)?;
            if self.is_solved() {
                return Ok(());
            }
        }

        self.append_characters(var)
    }

    fn chars(&self, var: &Variable) -> Vec<char> {
        match self.current(var) {
            Value::Str(s) => s.chars().collect(),
            _ => Vec::new(),
        }
    }

    fn remove_characters(&mut self, var: &Variable) -> SolverResult<()> {
        loop {
            let mut chars = self.chars(var);
            if chars.pop().is_none() {
                return Ok(());
            }
            let shorter: String = chars.into_iter().collect();
            if !self.try_value_with(&var.name, Value::Str(shorter), true)? || self.is_solved() {
                return Ok(());
            }
        }
    }

    fn append_characters(&mut self, var: &Variable) -> SolverResult<()> {
        let middle = char::from_u32(self.span / 2).unwrap_or('?');
        loop {
            let mut chars = self.chars(var);
            chars.push(middle);
            let index = chars.len() - 1;
            let longer: String = chars.into_iter().collect();
            if !self.try_value(&var.name, Value::Str(longer))? {
                return Ok(());
            }
            self.search_char(var, index)?;
            if self.is_solved() {
                return Ok(());
            }
        }
    }

    /// Alternating search on one code point, bounded to the alphabet
    fn search_char(&mut self, var: &Variable, index: usize) -> SolverResult<()> {
        loop {
            if self.is_solved() {
                return Ok(());
            }
            let improved = self.pattern_move_char(var, index, 1)?
                || self.pattern_move_char(var, index, -1)?
                || self.step_char(var, index, CASE_OFFSET)?
                || self.step_char(var, index, -CASE_OFFSET)?;
            if !improved {
                return Ok(());
            }
        }
    }

    fn pattern_move_char(&mut self, var: &Variable, index: usize, direction: i64) -> SolverResult<bool> {
        if !self.step_char(var, index, direction)? {
            return Ok(false);
        }
        let mut step = direction;
        loop {
            step = step.saturating_mul(2);
            if self.is_solved() || !self.step_char(var, index, step)? {
                return Ok(true);
            }
        }
    }

    fn step_char(&mut self, var: &Variable, index: usize, delta: i64) -> SolverResult<bool> {
        let mut chars = self.chars(var);
        let Some(current) = chars.get(index).map(|c| *c as i64) else {
            return Ok(false);
        };
        let upper = (self.span as i64).max(current);
        let code = current.saturating_add(delta).clamp(0, upper);
        if code == current {
            return Ok(false);
        }
        // Surrogate code points are not characters
        let Some(replacement) = u32::try_from(code).ok().and_then(char::from_u32) else {
            return Ok(false);
        };
        chars[index] = replacement;
        let candidate: String = chars.into_iter().collect();
        self.try_value(&var.name, Value::Str(candidate))
    }
}
