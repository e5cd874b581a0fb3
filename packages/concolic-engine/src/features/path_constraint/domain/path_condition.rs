//! Path Condition Domain Models
//!
//! Ordered branch conditions of one concolic run, and the alternative
//! queries derived from them by negating one decision.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constraint::Constraint;
use crate::features::expression::infrastructure::{Assignment, ExpressionEvaluator};

/// Location of a branch instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchSite {
    pub owner: String,
    pub method: String,
    pub index: u32,
}

impl BranchSite {
    pub fn new(owner: impl Into<String>, method: impl Into<String>, index: u32) -> Self {
        Self {
            owner: owner.into(),
            method: method.into(),
            index,
        }
    }
}

impl fmt::Display for BranchSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.owner, self.method, self.index)
    }
}

/// One observed branch decision
#[derive(Debug, Clone, PartialEq)]
pub struct BranchCondition {
    pub site: BranchSite,
    /// Whether the branch jumped
    pub taken: bool,
    /// Predicate that held on the observed path
    pub constraint: Constraint,
    /// Side conditions recorded since the previous branch (divisor checks,
    /// index bounds)
    pub supporting: Vec<Constraint>,
}

/// Ordered path condition of one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathCondition {
    conditions: Vec<BranchCondition>,
}

impl PathCondition {
    pub fn new(conditions: Vec<BranchCondition>) -> Self {
        Self { conditions }
    }

    pub fn conditions(&self) -> &[BranchCondition] {
        &self.conditions
    }

    /// Branch constraints in program order
    pub fn constraints(&self) -> Vec<&Constraint> {
        self.conditions.iter().map(|c| &c.constraint).collect()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// First `k` branch conditions
    pub fn prefix(&self, k: usize) -> &[BranchCondition] {
        &self.conditions[..k.min(self.conditions.len())]
    }

    /// Every branch and supporting constraint, in program order
    pub fn all_constraints(&self) -> Vec<Constraint> {
        let mut out = Vec::new();
        for condition in &self.conditions {
            out.extend(condition.supporting.iter().cloned());
            out.push(condition.constraint.clone());
        }
        out
    }

    /// Query steering execution down the other arm of decision `k` (0-based)
    ///
    /// Keeps decisions `0..k` and the supporting constraints up to and
    /// including `k`, then appends the negation of decision `k`. With `slice`
    /// set, only constraints transitively sharing variables with the negated
    /// decision survive.
    pub fn alternative_query(&self, k: usize, slice: bool) -> Option<Vec<Constraint>> {
        let target = self.conditions.get(k)?;
        let negated = target.constraint.negate();

        let mut query = Vec::new();
        for condition in &self.conditions[..k] {
            query.extend(condition.supporting.iter().cloned());
            query.push(condition.constraint.clone());
        }
        query.extend(target.supporting.iter().cloned());

        if slice {
            query = dependency_slice(query, &negated);
        }
        query.push(negated);
        Some(query)
    }

    /// Do all recorded constraints hold under the assignment
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        let mut evaluator = ExpressionEvaluator::new(assignment);
        self.conditions.iter().all(|c| {
            c.supporting.iter().all(|s| s.is_satisfied_with(&mut evaluator))
                && c.constraint.is_satisfied_with(&mut evaluator)
        })
    }

    /// Whether each recorded predicate holds under an assignment (a
    /// degenerate evaluation counts as not holding)
    pub fn replay(&self, assignment: &Assignment) -> Vec<bool> {
        let mut evaluator = ExpressionEvaluator::new(assignment);
        self.conditions
            .iter()
            .map(|c| c.constraint.is_satisfied_with(&mut evaluator))
            .collect()
    }
}

/// Constraints transitively sharing a variable with `seed`
fn dependency_slice(constraints: Vec<Constraint>, seed: &Constraint) -> Vec<Constraint> {
    let mut names: FxHashSet<String> = seed.variables().iter().map(|v| v.name.clone()).collect();
    let vars: Vec<FxHashSet<String>> = constraints
        .iter()
        .map(|c| c.variables().iter().map(|v| v.name.clone()).collect())
        .collect();
    let mut keep = vec![false; constraints.len()];

    loop {
        let mut changed = false;
        for (i, set) in vars.iter().enumerate() {
            if !keep[i] && set.iter().any(|n| names.contains(n)) {
                keep[i] = true;
                names.extend(set.iter().cloned());
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    constraints
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect()
}
