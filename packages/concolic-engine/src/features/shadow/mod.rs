//! Function Shadow Catalogue
//!
//! One shadow per externally callable primitive/string operation. Each
//! shadow decides per call whether to build a new expression or pass the
//! concrete value through untouched (lazy concretization).

pub mod domain;
pub mod infrastructure;

pub use domain::{
    CallPhase, FunctionKey, ParamType, PendingCall, ShadowFunction, ShadowKind, ShadowOutcome,
    Signature,
};
pub use infrastructure::ShadowCatalogue;
