//! SMT-LIB2 backend
//!
//! Drives any solver that reads an SMT-LIB2 script on stdin (z3 `-in`,
//! cvc5 `--lang smt2`, ...): lower the query, run the process under the
//! query deadline, read back `check-sat` and the `get-value` model.

pub mod lowering;
pub mod model_parser;
pub mod process;
pub mod sexpr;

use std::time::Instant;
use tracing::debug;

use crate::config::SmtLibConfig;
use crate::features::solver::domain::{SolverError, SolverOutcome, SolverQuery, SolverResult};
use crate::features::solver::ports::SolverBackend;

pub use lowering::{build_script, Script};

/// External SMT-LIB2 solver process
#[derive(Debug, Clone)]
pub struct SmtLibSolver {
    config: SmtLibConfig,
}

impl SmtLibSolver {
    pub fn new(config: SmtLibConfig) -> Self {
        Self { config }
    }
}

impl SolverBackend for SmtLibSolver {
    fn name(&self) -> &'static str {
        "smtlib"
    }

    fn solve(&mut self, query: &SolverQuery, deadline: Instant) -> SolverResult<SolverOutcome> {
        if Instant::now() >= deadline {
            return Err(SolverError::Timeout);
        }
        let script = build_script(query);
        debug!(
            command = %self.config.command,
            variables = script.variables.len(),
            bytes = script.text.len(),
            "sending query to smt solver"
        );
        let output = process::run_solver(&self.config.command, &self.config.args, script.text, deadline)?;
        model_parser::parse_response(&output, &script.variables)
    }
}
