//! Concolic Driver
//!
//! Advances the shadow interpreter in lock-step with a concrete interpreter
//! through the `ShadowHooks` port, collects the run's path condition and
//! turns it into solver queries for the unexplored arms.

pub mod application;
pub mod domain;
pub mod ports;

pub use application::{ConcolicRun, Explorer, ShadowInterpreter};
pub use domain::{
    CastOp, InputKind, IntBinOp, IntUnOp, MethodId, NanOrdering, RealBinOp, RealUnOp, RunResult,
};
pub use ports::{ShadowHooks, TestPatcher};
