//! Expression evaluation

pub mod evaluator;
pub mod semantics;

pub use evaluator::{Assignment, ExpressionEvaluator};
pub use semantics::{EvalError, EvalResult};
