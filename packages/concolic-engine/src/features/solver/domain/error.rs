//! Solver error types
//!
//! Every variant is recoverable: the caller treats a failed query like an
//! unanswered one and moves on.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The deadline passed before an answer
    #[error("Solver timed out")]
    Timeout,

    /// The backend answered something unreadable
    #[error("Unreadable solver output: {0}")]
    Parse(String),

    /// Rejected before reaching a backend
    #[error("Empty constraint set")]
    EmptyQuery,

    /// The backend failed to start or reported an error
    #[error("Solver backend error: {0}")]
    Backend(String),

    /// An incomplete search exhausted its budget without an answer
    #[error("Search budget exhausted without an answer")]
    Inconclusive,
}

pub type SolverResult<T> = Result<T, SolverError>;
