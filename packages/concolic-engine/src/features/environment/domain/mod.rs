//! Environment domain models

pub mod frame;
pub mod heap;
pub mod operand;

pub use frame::Frame;
pub use heap::{backing_field, SymbolicHeap};
pub use operand::{ConcreteValue, ObjectHandle, Operand};
