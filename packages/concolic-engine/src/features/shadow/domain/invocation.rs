//! Call state machine: ENTER -> RESULT | EXCEPTIONAL

use super::kind::ShadowFunction;
use super::signature::FunctionKey;
use crate::features::environment::domain::Operand;
use crate::features::expression::domain::Expr;
use crate::features::path_constraint::domain::Constraint;

/// Last transition of the call state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallPhase {
    #[default]
    Idle,
    /// Receiver and arguments captured
    Entered,
    /// Concrete return observed, shadow executed
    Completed,
    /// The real call raised; the pending call was discarded
    Exceptional,
}

/// A call between ENTER and RESULT
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub key: FunctionKey,
    /// `None` for calls without a registered shadow
    pub shadow: Option<ShadowFunction>,
    pub receiver: Option<Operand>,
    /// Caller-supplied stack parameters in declaration order
    pub args: Vec<Operand>,
    /// Frame depth of the caller at ENTER
    pub caller_depth: usize,
    /// An instrumented callee frame was pushed for this call
    pub callee_entered: bool,
}

/// What a shadow produced for one RESULT
#[derive(Debug, Clone, Default)]
pub struct ShadowOutcome {
    /// Expression for the returned primitive, if any input was symbolic
    pub ret: Option<Expr>,
    /// Side conditions the concrete call relied on
    pub supporting: Vec<Constraint>,
}

impl ShadowOutcome {
    pub fn pass_through() -> Self {
        Self::default()
    }

    pub fn is_pass_through(&self) -> bool {
        self.ret.is_none() && self.supporting.is_empty()
    }
}
