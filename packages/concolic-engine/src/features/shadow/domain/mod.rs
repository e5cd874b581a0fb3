//! Shadow domain models

pub mod invocation;
pub mod kind;
pub mod signature;

pub use invocation::{CallPhase, PendingCall, ShadowOutcome};
pub use kind::{ShadowFunction, ShadowKind};
pub use signature::{FunctionKey, ParamType, Signature};
