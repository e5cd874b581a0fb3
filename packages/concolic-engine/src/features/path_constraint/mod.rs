//! Path Constraint Collector
//!
//! Branch predicates observed with symbolic operands, kept in program order.
//! The conjunction of any prefix holds for the run's original inputs.

pub mod domain;
pub mod infrastructure;

pub use domain::{BranchCondition, BranchSite, Constraint, PathCondition};
pub use infrastructure::PathConstraintCollector;
