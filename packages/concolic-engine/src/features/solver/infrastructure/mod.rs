//! Solver backends and the bridge in front of them

pub mod avm;
pub mod bridge;
pub mod cache;
pub mod distance;
pub mod interval_tracker;
pub mod smtlib;

pub use avm::AvmSolver;
pub use bridge::SolverBridge;
pub use cache::CachingSolver;
pub use interval_tracker::{IntInterval, IntervalTracker};
pub use smtlib::SmtLibSolver;
