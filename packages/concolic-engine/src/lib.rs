/*
 * Concolic Engine - concrete + symbolic execution
 *
 * Feature-First Hexagonal Architecture:
 * - features/ : Vertical slices (expression → environment → shadow →
 *               path_constraint → solver → concolic)
 * - config/   : Tiered configuration (preset → override → YAML)
 * - errors    : Internal-consistency faults of a run
 *
 * A concrete interpreter drives `ShadowHooks` after every instruction; the
 * shadow interpreter builds expressions over the test's inputs, records the
 * path condition, and `Explorer` asks a solver for inputs that flip each
 * recorded decision.
 */

#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::too_many_arguments)] // Hook signatures mirror instructions

pub mod config;
pub mod errors;
pub mod features;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ConfigError, EngineConfig, Preset};
pub use errors::{ConcolicError, Result};
pub use features::concolic::{ConcolicRun, Explorer, RunResult, ShadowHooks, ShadowInterpreter};
pub use features::solver::{Solution, SolverBridge, SolverError, SolverOutcome};

/// Everything a driver of the engine needs
pub mod prelude {
    pub use crate::config::{ConcolicConfig, EngineConfig, Preset, SolverConfig};
    pub use crate::errors::{ConcolicError, Result};
    pub use crate::features::concolic::{
        CastOp, ConcolicRun, Explorer, InputKind, IntBinOp, IntUnOp, MethodId, NanOrdering,
        RealBinOp, RealUnOp, RunResult, ShadowHooks, ShadowInterpreter, TestPatcher,
    };
    pub use crate::features::environment::{ConcreteValue, ObjectHandle};
    pub use crate::features::expression::{Comparator, Expr, Operator, Sort, Value};
    pub use crate::features::path_constraint::{BranchSite, Constraint, PathCondition};
    pub use crate::features::shadow::{FunctionKey, ShadowCatalogue};
    pub use crate::features::solver::{
        Solution, SolverBackend, SolverBridge, SolverError, SolverOutcome, SolverStats,
    };
}
