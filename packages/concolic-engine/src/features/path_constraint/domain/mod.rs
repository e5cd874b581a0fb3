//! Path constraint domain models

pub mod constraint;
pub mod path_condition;

pub use constraint::Constraint;
pub use path_condition::{BranchCondition, BranchSite, PathCondition};
