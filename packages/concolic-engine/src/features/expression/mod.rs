//! Expression Model
//!
//! Immutable expression DAG over three domains (integer, real, string).
//! Leaves are constants or run-scoped input variables; composites are
//! operator-tagged nodes carrying the concrete value observed when they were
//! built.

pub mod domain;
pub mod infrastructure;

pub use domain::{
    Comparator, Domain, Expr, ExprKind, ObjectId, Operator, Reference, Sort, Value, Variable,
    VariableFactory,
};
pub use infrastructure::{Assignment, EvalError, ExpressionEvaluator};
