//! Solver Bridge
//!
//! Turns a finite constraint set into a satisfying assignment, a proof of
//! unsatisfiability, or a bounded-time failure. Two backends share the
//! `SolverBackend` port:
//!
//! - `AvmSolver`: in-process interval check plus alternating variable search
//! - `SmtLibSolver`: any external SMT-LIB2 solver driven over stdin/stdout

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{Solution, SolverError, SolverOutcome, SolverQuery, SolverResult, SolverStats};
pub use infrastructure::{
    AvmSolver, CachingSolver, IntInterval, IntervalTracker, SmtLibSolver, SolverBridge,
};
pub use ports::SolverBackend;
