//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure models (expressions, frames, constraints, queries)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Implementations (evaluator, catalogue, solver backends)
//!
//! Leaves first: expression -> environment -> shadow -> path_constraint ->
//! solver -> concolic.

pub mod expression;

pub mod environment;

// One shadow per primitive/string library operation
pub mod shadow;

pub mod path_constraint;

// AVM search and SMT-LIB2 process backends behind one bridge
pub mod solver;

// Lock-step driver, runs and exploration
pub mod concolic;
