//! Solver queries

use std::collections::BTreeSet;
use std::fmt::Write;
use std::sync::Arc;

use crate::features::expression::domain::{Expr, ExprKind, Variable};
use crate::features::path_constraint::domain::Constraint;

/// A finite constraint set submitted together
#[derive(Debug, Clone, Default)]
pub struct SolverQuery {
    constraints: Vec<Constraint>,
}

impl SolverQuery {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Every variable the constraints reference, in natural name order
    pub fn variables(&self) -> BTreeSet<Arc<Variable>> {
        self.constraints
            .iter()
            .flat_map(|c| {
                c.left
                    .variables()
                    .iter()
                    .chain(c.right.variables().iter())
                    .cloned()
            })
            .collect()
    }

    /// Cache key: two queries with the same text have the same answers
    ///
    /// Subtrees without variables collapse to their observed value, and
    /// variables carry their sort and bounds.
    pub fn canonical_text(&self) -> String {
        let mut out = String::new();
        for var in self.variables() {
            let _ = write!(out, "{}:{}[{},{}] ", var.name, var.sort, var.min, var.max);
        }
        for constraint in &self.constraints {
            out.push('|');
            canonical_expr(&constraint.left, &mut out);
            let _ = write!(out, " {} ", constraint.comparator);
            canonical_expr(&constraint.right, &mut out);
        }
        out
    }
}

/// Key text of one side of a constraint
///
/// Written from an explicit work stack, so chain depth is unbounded.
fn canonical_expr(expr: &Expr, out: &mut String) {
    enum Piece<'a> {
        Node(&'a Expr),
        Text(&'static str),
    }

    let mut pending = vec![Piece::Node(expr)];
    while let Some(piece) = pending.pop() {
        let node = match piece {
            Piece::Text(text) => {
                out.push_str(text);
                continue;
            }
            Piece::Node(node) => node,
        };
        if !node.contains_symbolic_variable() {
            // Strings display quoted and escaped
            let _ = write!(out, "{}:{}", node.concrete_value(), node.sort());
            continue;
        }
        if let ExprKind::Variable(v) = node.kind() {
            out.push_str(&v.name);
            continue;
        }
        if let Some(op) = node.operator() {
            let _ = write!(out, "{}:{}(", op.name(), node.sort());
        }
        pending.push(Piece::Text(")"));
        for (i, child) in node.children().into_iter().enumerate().rev() {
            pending.push(Piece::Node(child));
            if i > 0 {
                pending.push(Piece::Text(","));
            }
        }
    }
}
