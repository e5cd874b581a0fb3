//! Error types for concolic-engine
//!
//! Internal-consistency faults of a concolic run. Every variant is fatal to
//! the run that raised it: once the shadow interpreter has lost lock-step with
//! the concrete interpreter, every constraint collected afterwards would be
//! unsound, so the run is discarded.

use thiserror::Error;

use crate::features::expression::domain::Sort;

/// Main error type for concolic-engine operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConcolicError {
    /// A frame was popped (or inspected) while the call stack was empty
    #[error("Frame underflow: {0}")]
    FrameUnderflow(String),

    /// An operand was popped from an empty operand stack
    #[error("Operand stack underflow in {method}: needed {needed}, had {available}")]
    StackUnderflow {
        method: String,
        needed: usize,
        available: usize,
    },

    /// A local slot was read before any store
    #[error("Uninitialized local slot {index} in {method}")]
    UninitializedLocal { method: String, index: usize },

    /// Operand on the stack does not have the sort the instruction consumes
    #[error("Operand sort mismatch: expected {expected}, found {found}")]
    OperandSortMismatch { expected: String, found: String },

    /// Captured call arguments do not match the shadow's declared signature
    #[error("Shadow signature mismatch for {function}: {detail}")]
    ShadowSignatureMismatch { function: String, detail: String },

    /// Hooks arrived out of the ENTER -> RESULT order
    #[error("Call sequence violated: {0}")]
    CallSequence(String),

    /// The run already faulted; further hooks are rejected
    #[error("Run poisoned by earlier fault: {0}")]
    RunPoisoned(String),
}

impl ConcolicError {
    /// Create a sort mismatch error
    pub fn sort_mismatch(expected: impl ToString, found: Sort) -> Self {
        ConcolicError::OperandSortMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Create a shadow signature mismatch error
    pub fn signature(function: impl ToString, detail: impl Into<String>) -> Self {
        ConcolicError::ShadowSignatureMismatch {
            function: function.to_string(),
            detail: detail.into(),
        }
    }

    /// Create a call sequence error
    pub fn call_sequence(msg: impl Into<String>) -> Self {
        ConcolicError::CallSequence(msg.into())
    }
}

/// Result type alias for concolic operations
pub type Result<T> = std::result::Result<T, ConcolicError>;
