//! Expression evaluator
//!
//! Recomputes an expression under a variable assignment. Variables missing
//! from the assignment take their initial concrete value, so evaluating
//! under an empty assignment replays the original run.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use super::semantics::{self, EvalResult};
use crate::features::expression::domain::{Expr, ExprKind, Value, Variable};

/// Variable name -> value
pub type Assignment = BTreeMap<String, Value>;

/// Evaluates expressions against one assignment, memoizing shared nodes
pub struct ExpressionEvaluator<'a> {
    assignment: &'a Assignment,
    memo: FxHashMap<usize, Value>,
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(assignment: &'a Assignment) -> Self {
        Self {
            assignment,
            memo: FxHashMap::default(),
        }
    }

    /// One-shot evaluation
    pub fn evaluate_once(expr: &Expr, assignment: &Assignment) -> EvalResult<Value> {
        ExpressionEvaluator::new(assignment).evaluate(expr)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        if !expr.contains_symbolic_variable() {
            return Ok(expr.concrete_value().clone());
        }
        if let Some(hit) = self.memo.get(&expr.node_id()) {
            return Ok(hit.clone());
        }

        // Post-order ends with `expr`, which is not memoized yet
        let mut value = expr.concrete_value().clone();
        for node in expr.symbolic_post_order() {
            if self.memo.contains_key(&node.node_id()) {
                continue;
            }
            value = self.evaluate_node(&node)?;
            self.memo.insert(node.node_id(), value.clone());
        }
        Ok(value)
    }

    /// One node whose symbolic children are already memoized
    fn evaluate_node(&self, expr: &Expr) -> EvalResult<Value> {
        match expr.kind() {
            ExprKind::Constant => Ok(expr.concrete_value().clone()),
            ExprKind::Variable(var) => Ok(self.lookup(var)),
            ExprKind::Unary { op, operand } => {
                semantics::apply(*op, expr.sort(), &[self.child(operand)])
            }
            ExprKind::Binary { op, left, right } => {
                semantics::apply(*op, expr.sort(), &[self.child(left), self.child(right)])
            }
            ExprKind::Nary {
                op,
                left,
                right,
                others,
            } => {
                let mut args = Vec::with_capacity(2 + others.len());
                args.push(self.child(left));
                args.push(self.child(right));
                args.extend(others.iter().map(|other| self.child(other)));
                semantics::apply(*op, expr.sort(), &args)
            }
        }
    }

    fn child(&self, expr: &Expr) -> Value {
        match self.memo.get(&expr.node_id()) {
            Some(value) => value.clone(),
            None => expr.concrete_value().clone(),
        }
    }

    fn lookup(&self, var: &Variable) -> Value {
        match self.assignment.get(&var.name) {
            Some(Value::Int(v)) => Value::Int(var.sort.wrap(*v)),
            Some(other) => other.clone(),
            None => var.initial.clone(),
        }
    }
}
