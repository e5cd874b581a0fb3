//! Constraints
//!
//! A constraint compares two expressions of the same domain. String
//! predicates reach here as 0/1 integers compared against zero.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::features::expression::domain::{Comparator, Domain, Expr, Value, Variable};
use crate::features::expression::infrastructure::{Assignment, ExpressionEvaluator};

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub left: Expr,
    pub comparator: Comparator,
    pub right: Expr,
}

impl Constraint {
    pub fn new(left: Expr, comparator: Comparator, right: Expr) -> Self {
        debug_assert_eq!(left.domain(), right.domain(), "constraint over mixed domains");
        Self {
            left,
            comparator,
            right,
        }
    }

    pub fn domain(&self) -> Domain {
        self.left.domain()
    }

    pub fn negate(&self) -> Self {
        Self {
            left: self.left.clone(),
            comparator: self.comparator.negate(),
            right: self.right.clone(),
        }
    }

    pub fn contains_symbolic_variable(&self) -> bool {
        self.left.contains_symbolic_variable() || self.right.contains_symbolic_variable()
    }

    /// Node count of both sides, shared subterms counted at every use
    pub fn size(&self) -> usize {
        self.left.size().saturating_add(self.right.size())
    }

    pub fn variables(&self) -> BTreeSet<Arc<Variable>> {
        self.left
            .variables()
            .iter()
            .chain(self.right.variables().iter())
            .cloned()
            .collect()
    }

    /// Does the comparison hold between two values
    pub fn holds(&self, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Int(l), Value::Int(r)) => self.comparator.holds_int(*l, *r),
            (Value::Real(l), Value::Real(r)) => self.comparator.holds_real(*l, *r),
            (Value::Str(l), Value::Str(r)) => self.comparator.holds_int(
                match l.cmp(r) {
                    std::cmp::Ordering::Less => -1,
                    std::cmp::Ordering::Equal => 0,
                    std::cmp::Ordering::Greater => 1,
                },
                0,
            ),
            _ => false,
        }
    }

    /// Does the constraint hold over the values observed during the run
    pub fn holds_concretely(&self) -> bool {
        self.holds(self.left.concrete_value(), self.right.concrete_value())
    }

    /// Evaluate under an assignment; a degenerate evaluation does not satisfy
    pub fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        let mut evaluator = ExpressionEvaluator::new(assignment);
        self.is_satisfied_with(&mut evaluator)
    }

    pub fn is_satisfied_with(&self, evaluator: &mut ExpressionEvaluator<'_>) -> bool {
        match (evaluator.evaluate(&self.left), evaluator.evaluate(&self.right)) {
            (Ok(l), Ok(r)) => self.holds(&l, &r),
            _ => false,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.comparator, self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::expression::domain::{Operator, Sort, VariableFactory};

    fn setup() -> (Expr, Constraint) {
        let mut factory = VariableFactory::new();
        let v = Expr::variable(factory.fresh(Sort::Int32, Value::Int(5), i32::MIN as i64, i32::MAX as i64));
        let c = Constraint::new(v.clone(), Comparator::Gt, Expr::int32(0));
        (v, c)
    }

    #[test]
    fn test_holds_concretely_and_negation() {
        let (_, c) = setup();
        assert!(c.holds_concretely());
        assert!(!c.negate().holds_concretely());
        assert_eq!(c.to_string(), "var0 > 0");
        assert_eq!(c.negate().to_string(), "var0 <= 0");
    }

    #[test]
    fn test_size_counts_both_sides() {
        let (v, c) = setup();
        assert_eq!(c.size(), 2);
        let sum = Expr::binary(Operator::Plus, Sort::Int32, v.clone(), v, Value::Int(10));
        assert_eq!(Constraint::new(sum, Comparator::Gt, Expr::int32(0)).size(), 4);
    }

    #[test]
    fn test_is_satisfied_by_assignment() {
        let (_, c) = setup();
        let mut assignment = Assignment::new();
        assert!(c.is_satisfied_by(&assignment));
        assignment.insert("var0".into(), Value::Int(-1));
        assert!(!c.is_satisfied_by(&assignment));
    }

    #[test]
    fn test_degenerate_evaluation_is_unsatisfied() {
        let (v, _) = setup();
        let quotient = Expr::binary(Operator::Div, Sort::Int32, Expr::int32(10), v, Value::Int(2));
        let c = Constraint::new(quotient, Comparator::Ne, Expr::int32(99));
        let mut assignment = Assignment::new();
        assignment.insert("var0".into(), Value::Int(0));
        assert!(!c.is_satisfied_by(&assignment));
    }
}
