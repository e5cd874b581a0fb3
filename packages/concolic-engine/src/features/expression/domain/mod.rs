//! Expression domain models

pub mod expr;
pub mod operator;
pub mod reference;
pub mod sort;
pub mod variable;

pub use expr::{Expr, ExprKind};
pub use operator::{Comparator, Operator};
pub use reference::{ObjectId, Reference};
pub use sort::{Domain, Sort, Value};
pub use variable::{Variable, VariableFactory};
