//! Path constraint collector
//!
//! Appends a branch condition each time a branch predicate is observed with
//! at least one symbolic operand, strictly in program order. Predicates
//! larger than the size limit are skipped; once the count limit is reached
//! nothing more is kept, side conditions included.

use tracing::{debug, trace, warn};

use crate::features::path_constraint::domain::{
    BranchCondition, BranchSite, Constraint, PathCondition,
};

#[derive(Debug)]
pub struct PathConstraintCollector {
    conditions: Vec<BranchCondition>,
    pending_supporting: Vec<Constraint>,
    max_conditions: usize,
    max_constraint_size: usize,
    ignored: usize,
    oversized: usize,
}

impl Default for PathConstraintCollector {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl PathConstraintCollector {
    pub fn new(max_conditions: usize) -> Self {
        Self {
            conditions: Vec::new(),
            pending_supporting: Vec::new(),
            max_conditions,
            max_constraint_size: usize::MAX,
            ignored: 0,
            oversized: 0,
        }
    }

    /// Builder: Skip predicates with more than `max` nodes
    pub fn with_max_constraint_size(mut self, max: usize) -> Self {
        self.max_constraint_size = max;
        self
    }

    fn is_full(&self) -> bool {
        self.conditions.len() >= self.max_conditions
    }

    /// Record the predicate that held at a branch
    ///
    /// Returns whether a condition was appended. Fully concrete predicates
    /// are dropped, as are oversized ones and everything past the count
    /// limit. A dropped symbolic predicate takes its side conditions with it.
    pub fn append_branch(&mut self, site: BranchSite, taken: bool, constraint: Constraint) -> bool {
        if !constraint.contains_symbolic_variable() {
            return false;
        }
        if self.is_full() {
            if self.ignored == 0 {
                warn!(
                    "Path condition limit {} reached at {}; further branches ignored",
                    self.max_conditions, site
                );
            }
            self.ignored += 1;
            return false;
        }
        let size = constraint.size();
        if size > self.max_constraint_size {
            debug!(
                "Skipping condition of size {} at {} (limit {})",
                size, site, self.max_constraint_size
            );
            self.oversized += 1;
            self.pending_supporting.clear();
            return false;
        }

        trace!("PC[{}] {} at {} (taken={})", self.conditions.len(), constraint, site, taken);
        self.conditions.push(BranchCondition {
            site,
            taken,
            constraint,
            supporting: std::mem::take(&mut self.pending_supporting),
        });
        true
    }

    /// Side condition attached to the next appended branch
    pub fn add_supporting(&mut self, constraint: Constraint) {
        if !self.is_full() && constraint.contains_symbolic_variable() {
            self.pending_supporting.push(constraint);
        }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Branches dropped because of the limit
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Branches dropped because of their size
    pub fn oversized(&self) -> usize {
        self.oversized
    }

    /// Side conditions waiting for the next branch
    pub fn pending_supporting(&self) -> usize {
        self.pending_supporting.len()
    }

    pub fn conditions(&self) -> &[BranchCondition] {
        &self.conditions
    }

    pub fn finish(self) -> PathCondition {
        PathCondition::new(self.conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expression::domain::{
        Comparator, Expr, Operator, Sort, Value, VariableFactory,
    };

    fn symbolic() -> Expr {
        let mut f = VariableFactory::new();
        Expr::variable(f.fresh(Sort::Int32, Value::Int(1), i32::MIN as i64, i32::MAX as i64))
    }

    #[test]
    fn test_concrete_branches_are_dropped() {
        let mut collector = PathConstraintCollector::default();
        let c = Constraint::new(Expr::int32(1), Comparator::Eq, Expr::int32(1));
        assert!(!collector.append_branch(BranchSite::new("T", "m", 0), true, c));
        assert!(collector.is_empty());
    }

    #[test]
    fn test_supporting_attach_to_next_branch() {
        let mut collector = PathConstraintCollector::default();
        let v = symbolic();
        collector.add_supporting(Constraint::new(v.clone(), Comparator::Ne, Expr::int32(0)));
        collector.add_supporting(Constraint::new(Expr::int32(2), Comparator::Ne, Expr::int32(0)));
        collector.append_branch(
            BranchSite::new("T", "m", 0),
            false,
            Constraint::new(v.clone(), Comparator::Gt, Expr::int32(0)),
        );
        collector.append_branch(
            BranchSite::new("T", "m", 1),
            true,
            Constraint::new(v, Comparator::Lt, Expr::int32(5)),
        );
        let pc = collector.finish();
        assert_eq!(pc.conditions()[0].supporting.len(), 1);
        assert!(pc.conditions()[1].supporting.is_empty());
    }

    #[test]
    fn test_limit() {
        let mut collector = PathConstraintCollector::new(1);
        let v = symbolic();
        for i in 0..3 {
            collector.append_branch(
                BranchSite::new("T", "m", i),
                true,
                Constraint::new(v.clone(), Comparator::Gt, Expr::int32(0)),
            );
        }
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.ignored(), 2);
    }

    #[test]
    fn test_side_conditions_stop_at_limit() {
        let mut collector = PathConstraintCollector::new(1);
        let v = symbolic();
        collector.append_branch(
            BranchSite::new("T", "m", 0),
            true,
            Constraint::new(v.clone(), Comparator::Gt, Expr::int32(0)),
        );
        for _ in 0..10_000 {
            collector.add_supporting(Constraint::new(v.clone(), Comparator::Ne, Expr::int32(0)));
            collector.append_branch(
                BranchSite::new("T", "m", 1),
                true,
                Constraint::new(v.clone(), Comparator::Gt, Expr::int32(0)),
            );
        }
        assert_eq!(collector.pending_supporting(), 0);
        assert_eq!(collector.ignored(), 10_000);
    }

    #[test]
    fn test_oversized_condition_skipped_with_its_side_conditions() {
        let mut collector = PathConstraintCollector::new(10).with_max_constraint_size(3);
        let v = symbolic();
        let sum = Expr::binary(Operator::Plus, Sort::Int32, v.clone(), v.clone(), Value::Int(2));

        collector.add_supporting(Constraint::new(v.clone(), Comparator::Ne, Expr::int32(0)));
        assert!(!collector.append_branch(
            BranchSite::new("T", "m", 0),
            true,
            Constraint::new(sum, Comparator::Gt, Expr::int32(0)),
        ));
        assert!(collector.append_branch(
            BranchSite::new("T", "m", 1),
            true,
            Constraint::new(v, Comparator::Gt, Expr::int32(0)),
        ));
        assert_eq!(collector.oversized(), 1);
        assert_eq!(collector.ignored(), 0);
        assert!(collector.conditions()[0].supporting.is_empty());
    }
}
