//! Symbolic Environment
//!
//! Per-run frame stack of lock-step operands plus the symbolic heap.

pub mod domain;
pub mod infrastructure;

pub use domain::{ConcreteValue, Frame, ObjectHandle, Operand, SymbolicHeap};
pub use infrastructure::SymbolicEnvironment;
