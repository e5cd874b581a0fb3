//! Concolic driver domain models

pub mod instruction;
pub mod run_result;

pub use instruction::{
    CastOp, InputKind, IntBinOp, IntUnOp, MethodId, NanOrdering, RealBinOp, RealUnOp,
};
pub use run_result::RunResult;
