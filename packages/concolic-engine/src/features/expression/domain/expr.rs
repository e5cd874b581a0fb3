//! Expression DAG
//!
//! Nodes are immutable and shared through `Arc`, so the same sub-expression
//! can appear under many parents (and many constraints) without copying.
//! Every node carries the concrete value observed when it was built. That
//! value is never recomputed here; it is the ground truth replay checks
//! against.
//!
//! Long runs build very deep chains (an accumulator updated in a loop), so
//! every walk over the DAG uses an explicit stack, dropping included.

use once_cell::sync::OnceCell;
use rustc_hash::FxHashSet;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::operator::Operator;
use super::sort::{Domain, Sort, Value};
use super::variable::Variable;

/// Shape of an expression node
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Literal; the value is the node's concrete value
    Constant,
    Variable(Arc<Variable>),
    Unary {
        op: Operator,
        operand: Expr,
    },
    Binary {
        op: Operator,
        left: Expr,
        right: Expr,
    },
    Nary {
        op: Operator,
        left: Expr,
        right: Expr,
        others: Vec<Expr>,
    },
}

struct ExprNode {
    kind: ExprKind,
    sort: Sort,
    concrete: Value,
    symbolic: bool,
    /// Tree-unfolded node count, saturating
    size: usize,
    variables: OnceCell<BTreeSet<Arc<Variable>>>,
}

impl Drop for ExprNode {
    fn drop(&mut self) {
        let mut orphans = take_children(&mut self.kind);
        while let Some(child) = orphans.pop() {
            // Only the last owner unlinks; the node then drops with no children
            if let Ok(mut node) = Arc::try_unwrap(child.0) {
                orphans.extend(take_children(&mut node.kind));
            }
        }
    }
}

fn take_children(kind: &mut ExprKind) -> Vec<Expr> {
    match std::mem::replace(kind, ExprKind::Constant) {
        ExprKind::Constant | ExprKind::Variable(_) => Vec::new(),
        ExprKind::Unary { operand, .. } => vec![operand],
        ExprKind::Binary { left, right, .. } => vec![left, right],
        ExprKind::Nary {
            left,
            right,
            mut others,
            ..
        } => {
            others.push(left);
            others.push(right);
            others
        }
    }
}

/// Reference-counted handle to an expression node
#[derive(Clone)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    fn build(kind: ExprKind, sort: Sort, concrete: Value, symbolic: bool) -> Self {
        debug_assert_eq!(
            sort.domain(),
            concrete.domain(),
            "observed value does not match node sort"
        );
        let size = match &kind {
            ExprKind::Constant | ExprKind::Variable(_) => 1,
            ExprKind::Unary { operand, .. } => operand.size().saturating_add(1),
            ExprKind::Binary { left, right, .. } => {
                left.size().saturating_add(right.size()).saturating_add(1)
            }
            ExprKind::Nary {
                left,
                right,
                others,
                ..
            } => others
                .iter()
                .fold(left.size().saturating_add(right.size()), |acc, e| {
                    acc.saturating_add(e.size())
                })
                .saturating_add(1),
        };
        Self(Arc::new(ExprNode {
            kind,
            sort,
            concrete,
            symbolic,
            size,
            variables: OnceCell::new(),
        }))
    }

    // ━━━ Leaves ━━━

    pub fn constant(sort: Sort, value: Value) -> Self {
        let value = match value {
            Value::Int(v) => Value::Int(sort.wrap(v)),
            other => other,
        };
        Self::build(ExprKind::Constant, sort, value, false)
    }

    pub fn int32(value: i32) -> Self {
        Self::constant(Sort::Int32, Value::Int(value as i64))
    }

    pub fn int64(value: i64) -> Self {
        Self::constant(Sort::Int64, Value::Int(value))
    }

    pub fn real(value: f64) -> Self {
        Self::constant(Sort::Real, Value::Real(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::constant(Sort::String, Value::Str(value.into()))
    }

    pub fn variable(var: Arc<Variable>) -> Self {
        let sort = var.sort;
        let concrete = var.initial.clone();
        Self::build(ExprKind::Variable(var), sort, concrete, true)
    }

    // ━━━ Composites ━━━

    pub fn unary(op: Operator, sort: Sort, operand: Expr, observed: Value) -> Self {
        let symbolic = operand.contains_symbolic_variable();
        Self::build(ExprKind::Unary { op, operand }, sort, observed, symbolic)
    }

    pub fn binary(op: Operator, sort: Sort, left: Expr, right: Expr, observed: Value) -> Self {
        let symbolic = left.contains_symbolic_variable() || right.contains_symbolic_variable();
        Self::build(
            ExprKind::Binary { op, left, right },
            sort,
            observed,
            symbolic,
        )
    }

    pub fn nary(
        op: Operator,
        sort: Sort,
        left: Expr,
        right: Expr,
        others: Vec<Expr>,
        observed: Value,
    ) -> Self {
        let symbolic = left.contains_symbolic_variable()
            || right.contains_symbolic_variable()
            || others.iter().any(Expr::contains_symbolic_variable);
        Self::build(
            ExprKind::Nary {
                op,
                left,
                right,
                others,
            },
            sort,
            observed,
            symbolic,
        )
    }

    // ━━━ Accessors ━━━

    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    pub fn sort(&self) -> Sort {
        self.0.sort
    }

    pub fn domain(&self) -> Domain {
        self.0.sort.domain()
    }

    pub fn concrete_value(&self) -> &Value {
        &self.0.concrete
    }

    pub fn contains_symbolic_variable(&self) -> bool {
        self.0.symbolic
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.0.kind, ExprKind::Constant)
    }

    pub fn as_variable(&self) -> Option<&Arc<Variable>> {
        match &self.0.kind {
            ExprKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match &self.0.kind {
            ExprKind::Constant | ExprKind::Variable(_) => None,
            ExprKind::Unary { op, .. }
            | ExprKind::Binary { op, .. }
            | ExprKind::Nary { op, .. } => Some(*op),
        }
    }

    /// Children in argument order
    pub fn children(&self) -> Vec<&Expr> {
        match &self.0.kind {
            ExprKind::Constant | ExprKind::Variable(_) => Vec::new(),
            ExprKind::Unary { operand, .. } => vec![operand],
            ExprKind::Binary { left, right, .. } => vec![left, right],
            ExprKind::Nary {
                left,
                right,
                others,
                ..
            } => {
                let mut out = vec![left, right];
                out.extend(others.iter());
                out
            }
        }
    }

    /// Free variables, computed on first request
    pub fn variables(&self) -> &BTreeSet<Arc<Variable>> {
        if let Some(set) = self.0.variables.get() {
            return set;
        }
        // Children first, so each node only reads already-filled sets
        for node in self.symbolic_post_order() {
            node.collect_variables();
        }
        self.collect_variables()
    }

    fn collect_variables(&self) -> &BTreeSet<Arc<Variable>> {
        self.0.variables.get_or_init(|| match &self.0.kind {
            ExprKind::Constant => BTreeSet::new(),
            ExprKind::Variable(v) => BTreeSet::from([Arc::clone(v)]),
            _ if !self.0.symbolic => BTreeSet::new(),
            _ => {
                let mut set = BTreeSet::new();
                for child in self.children() {
                    if let Some(vars) = child.0.variables.get() {
                        set.extend(vars.iter().cloned());
                    } else if child.0.symbolic {
                        set.extend(child.variables().iter().cloned());
                    }
                }
                set
            }
        })
    }

    /// Distinct nodes carrying a variable, each after all of its children
    ///
    /// The expression itself comes last when it is symbolic. Nodes without
    /// variables are never entered.
    pub fn symbolic_post_order(&self) -> Vec<Expr> {
        let mut order = Vec::new();
        let mut seen = FxHashSet::default();
        let mut pending: Vec<(&Expr, bool)> = vec![(self, false)];
        while let Some((node, expanded)) = pending.pop() {
            if expanded {
                order.push(node.clone());
                continue;
            }
            if !node.contains_symbolic_variable() || !seen.insert(node.node_id()) {
                continue;
            }
            pending.push((node, true));
            for child in node.children().into_iter().rev() {
                pending.push((child, false));
            }
        }
        order
    }

    /// Stable address of the shared node (for memo tables)
    pub fn node_id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Node count of the DAG unfolded as a tree (saturating)
    pub fn size(&self) -> usize {
        self.0.size
    }
}

impl PartialEq for Expr {
    /// Structural equality; observed reals compare bitwise
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        let mut checked = FxHashSet::default();
        while let Some((a, b)) = pending.pop() {
            if a.ptr_eq(b) || !checked.insert((a.node_id(), b.node_id())) {
                continue;
            }
            if a.sort() != b.sort() || !a.concrete_value().same_as(b.concrete_value()) {
                return false;
            }
            match (a.kind(), b.kind()) {
                (ExprKind::Constant, ExprKind::Constant) => {}
                (ExprKind::Variable(x), ExprKind::Variable(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (ExprKind::Constant | ExprKind::Variable(_), _)
                | (_, ExprKind::Constant | ExprKind::Variable(_)) => return false,
                _ => {
                    let (left, right) = (a.children(), b.children());
                    if a.operator() != b.operator() || left.len() != right.len() {
                        return false;
                    }
                    pending.extend(left.into_iter().zip(right));
                }
            }
        }
        true
    }
}

/// Rendering work item: a node still to expand, or literal text
enum Piece<'a> {
    Node(&'a Expr),
    Text(Cow<'static, str>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Node(self)];
        while let Some(piece) = pending.pop() {
            let node = match piece {
                Piece::Text(text) => {
                    f.write_str(&text)?;
                    continue;
                }
                Piece::Node(node) => node,
            };
            match node.kind() {
                ExprKind::Constant => write!(f, "{}", node.concrete_value())?,
                ExprKind::Variable(v) => f.write_str(&v.name)?,
                ExprKind::Unary { op, operand } => {
                    write!(f, "{}(", op)?;
                    pending.push(Piece::Text(Cow::Borrowed(")")));
                    pending.push(Piece::Node(operand));
                }
                ExprKind::Binary { op, left, right } if op.is_infix() => {
                    f.write_str("(")?;
                    pending.push(Piece::Text(Cow::Borrowed(")")));
                    pending.push(Piece::Node(right));
                    pending.push(Piece::Text(Cow::Owned(format!(" {} ", op))));
                    pending.push(Piece::Node(left));
                }
                ExprKind::Binary { op, left, right } => {
                    write!(f, "{}(", op)?;
                    pending.push(Piece::Text(Cow::Borrowed(")")));
                    pending.push(Piece::Node(right));
                    pending.push(Piece::Text(Cow::Borrowed(", ")));
                    pending.push(Piece::Node(left));
                }
                ExprKind::Nary {
                    op,
                    left,
                    right,
                    others,
                } => {
                    write!(f, "{}(", op)?;
                    pending.push(Piece::Text(Cow::Borrowed(")")));
                    for other in others.iter().rev() {
                        pending.push(Piece::Node(other));
                        pending.push(Piece::Text(Cow::Borrowed(", ")));
                    }
                    pending.push(Piece::Node(right));
                    pending.push(Piece::Text(Cow::Borrowed(", ")));
                    pending.push(Piece::Node(left));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({}: {})", self, self.sort())
    }
}
