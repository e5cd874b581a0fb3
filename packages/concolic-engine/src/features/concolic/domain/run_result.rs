//! Outcome of one finished concolic run

use std::sync::Arc;

use crate::features::expression::domain::Variable;
use crate::features::expression::infrastructure::Assignment;
use crate::features::path_constraint::domain::PathCondition;

#[derive(Debug, Clone)]
pub struct RunResult {
    pub path_condition: PathCondition,
    /// Input variables in introduction order
    pub variables: Vec<Arc<Variable>>,
    /// Branches dropped past `max_path_constraints`
    pub ignored_branches: usize,
    /// Branches dropped past `max_constraint_size`
    pub oversized_branches: usize,
}

impl RunResult {
    /// The inputs the run was executed with
    pub fn initial_assignment(&self) -> Assignment {
        self.variables
            .iter()
            .map(|v| (v.name.clone(), v.initial.clone()))
            .collect()
    }

    pub fn variable(&self, name: &str) -> Option<&Arc<Variable>> {
        self.variables.iter().find(|v| v.name == name)
    }
}
