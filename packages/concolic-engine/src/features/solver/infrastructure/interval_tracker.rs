//! Interval Tracker - Range-based infeasibility detection
//!
//! Tracks the integer range of every variable compared directly against a
//! constant. An empty range proves the whole query unsatisfiable; a
//! non-empty range bounds where the search looks.
//!
//! # Examples
//!
//! ```rust,ignore
//! let mut tracker = IntervalTracker::new();
//! tracker.add_constraint(&Constraint::new(v0.clone(), Comparator::Gt, Expr::int32(0)));
//! tracker.add_constraint(&Constraint::new(v0, Comparator::Lt, Expr::int32(10)));
//! assert!(tracker.is_feasible());
//! ```

use rustc_hash::FxHashMap;
use std::sync::Arc;

use crate::features::expression::domain::{Comparator, Domain, Variable};
use crate::features::path_constraint::domain::Constraint;

/// Integer interval; `None` bounds are infinite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntInterval {
    pub lower: Option<i64>,
    pub upper: Option<i64>,
    /// Is interval open on lower bound?
    pub lower_open: bool,
    /// Is interval open on upper bound?
    pub upper_open: bool,
}

impl IntInterval {
    /// Create unbounded interval (-∞, +∞)
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
            lower_open: true,
            upper_open: true,
        }
    }

    /// Create bounded interval [lower, upper]
    pub fn bounded(lower: i64, upper: i64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
            lower_open: false,
            upper_open: false,
        }
    }

    /// Create lower-bounded interval [lower, +∞) or (lower, +∞)
    pub fn lower_bounded(lower: i64, open: bool) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
            lower_open: open,
            upper_open: true,
        }
    }

    /// Create upper-bounded interval (-∞, upper] or (-∞, upper)
    pub fn upper_bounded(upper: i64, open: bool) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
            lower_open: true,
            upper_open: open,
        }
    }

    /// Interval of values `x` with `x <cmp> value`; `None` for `!=`
    pub fn from_comparison(cmp: Comparator, value: i64) -> Option<Self> {
        Some(match cmp {
            Comparator::Eq => Self::bounded(value, value),
            Comparator::Ne => return None,
            Comparator::Lt => Self::upper_bounded(value, true),
            Comparator::Le => Self::upper_bounded(value, false),
            Comparator::Gt => Self::lower_bounded(value, true),
            Comparator::Ge => Self::lower_bounded(value, false),
        })
    }

    /// Smallest member, if bounded below
    pub fn min_value(&self) -> Option<i128> {
        self.lower
            .map(|l| l as i128 + i128::from(self.lower_open))
    }

    /// Largest member, if bounded above
    pub fn max_value(&self) -> Option<i128> {
        self.upper
            .map(|u| u as i128 - i128::from(self.upper_open))
    }

    /// No integer lies inside
    pub fn is_empty(&self) -> bool {
        match (self.min_value(), self.max_value()) {
            (Some(l), Some(u)) => l > u,
            _ => false,
        }
    }

    /// Intersect with another interval
    pub fn intersect(&self, other: &IntInterval) -> IntInterval {
        let (lower, lower_open) = match (self.lower, other.lower) {
            (None, None) => (None, true),
            (None, Some(l)) => (Some(l), other.lower_open),
            (Some(l), None) => (Some(l), self.lower_open),
            (Some(l1), Some(l2)) if l1 > l2 => (Some(l1), self.lower_open),
            (Some(l1), Some(l2)) if l1 < l2 => (Some(l2), other.lower_open),
            (Some(l1), Some(_)) => (Some(l1), self.lower_open || other.lower_open),
        };

        let (upper, upper_open) = match (self.upper, other.upper) {
            (None, None) => (None, true),
            (None, Some(u)) => (Some(u), other.upper_open),
            (Some(u), None) => (Some(u), self.upper_open),
            (Some(u1), Some(u2)) if u1 < u2 => (Some(u1), self.upper_open),
            (Some(u1), Some(u2)) if u1 > u2 => (Some(u2), other.upper_open),
            (Some(u1), Some(_)) => (Some(u1), self.upper_open || other.upper_open),
        };

        IntInterval {
            lower,
            upper,
            lower_open,
            upper_open,
        }
    }

    /// Remove one point; only boundary points can be excluded exactly
    pub fn exclude(&self, value: i64) -> IntInterval {
        let mut out = self.clone();
        if self.min_value() == Some(value as i128) {
            out.lower = Some(value);
            out.lower_open = true;
        }
        if self.max_value() == Some(value as i128) {
            out.upper = Some(value);
            out.upper_open = true;
        }
        out
    }

    /// Check if value is in interval
    pub fn contains(&self, value: i64) -> bool {
        let v = value as i128;
        self.min_value().map_or(true, |l| v >= l) && self.max_value().map_or(true, |u| v <= u)
    }

    /// Nearest member to `value` (the value itself if it is a member)
    pub fn clamp(&self, value: i64) -> i64 {
        let mut v = value as i128;
        if let Some(l) = self.min_value() {
            v = v.max(l);
        }
        if let Some(u) = self.max_value() {
            v = v.min(u);
        }
        v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

/// `var <cmp> constant`, normalized so the variable is on the left
pub fn as_bound(constraint: &Constraint) -> Option<(&Arc<Variable>, Comparator, i64)> {
    if constraint.domain() != Domain::Integer {
        return None;
    }
    let (left, right) = (&constraint.left, &constraint.right);
    if let (Some(var), false) = (left.as_variable(), right.contains_symbolic_variable()) {
        return Some((var, constraint.comparator, right.concrete_value().as_int()?));
    }
    if let (false, Some(var)) = (left.contains_symbolic_variable(), right.as_variable()) {
        return Some((var, constraint.comparator.swap(), left.concrete_value().as_int()?));
    }
    None
}

/// Interval-based constraint tracker
#[derive(Debug)]
pub struct IntervalTracker {
    /// Variable intervals by name
    intervals: FxHashMap<String, IntInterval>,
    /// Maximum variables to track
    max_vars: usize,
}

impl Default for IntervalTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalTracker {
    pub fn new() -> Self {
        Self {
            intervals: FxHashMap::default(),
            max_vars: 4096,
        }
    }

    /// Start a variable at its declared bounds
    pub fn seed(&mut self, var: &Variable) {
        if var.sort.domain() == Domain::Integer && self.intervals.len() < self.max_vars {
            self.intervals
                .insert(var.name.clone(), IntInterval::bounded(var.min, var.max));
        }
    }

    /// Add constraint to tracker
    ///
    /// Returns false if the constraint empties a variable's interval.
    /// Constraints that are not a bound on a single variable are ignored.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> bool {
        let Some((var, cmp, value)) = as_bound(constraint) else {
            return true;
        };

        // Check capacity
        if !self.intervals.contains_key(&var.name) && self.intervals.len() >= self.max_vars {
            return true;
        }

        let existing = self
            .intervals
            .entry(var.name.clone())
            .or_insert_with(IntInterval::unbounded);

        let result = match IntInterval::from_comparison(cmp, value) {
            Some(interval) => existing.intersect(&interval),
            None => existing.exclude(value),
        };
        let feasible = !result.is_empty();
        *existing = result;
        feasible
    }

    /// Check if all tracked intervals are non-empty
    pub fn is_feasible(&self) -> bool {
        !self.intervals.values().any(IntInterval::is_empty)
    }

    pub fn get_interval(&self, name: &str) -> Option<&IntInterval> {
        self.intervals.get(name)
    }

    /// Get number of tracked variables
    pub fn var_count(&self) -> usize {
        self.intervals.len()
    }
}
