//! Engine configuration
//!
//! Two sections: `concolic` (shadow interpreter and path condition) and
//! `solver` (bridge, backend choice and per-backend budgets). Every struct
//! takes its defaults from the balanced preset, so a YAML override only
//! needs the fields it changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::{ConfigError, ConfigResult};
use super::io::{self, ConfigExportV1, ConfigOverrides};
use super::preset::Preset;
use super::validation::{check_range, Validatable};

// ============================================================================
// Concolic
// ============================================================================

/// Shadow interpreter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConcolicConfig {
    /// Branch conditions kept per run (1..=1000000); later branches are ignored
    pub max_path_constraints: usize,

    /// Largest branch condition recorded, counted as expression nodes with
    /// shared subterms repeated (1..=100000000); larger ones are skipped
    pub max_constraint_size: usize,

    /// A never-written field read introduces a fresh input variable
    pub lazy_field_variables: bool,

    /// Drop query constraints that share no variable with the negated branch
    pub slice_queries: bool,
}

impl Default for ConcolicConfig {
    fn default() -> Self {
        Self::for_preset(Preset::Balanced)
    }
}

impl ConcolicConfig {
    pub fn for_preset(preset: Preset) -> Self {
        let max_path_constraints = match preset {
            Preset::Fast => 200,
            Preset::Balanced | Preset::Custom => 1000,
            Preset::Thorough => 5000,
        };
        Self {
            max_path_constraints,
            max_constraint_size: 100_000,
            lazy_field_variables: true,
            slice_queries: true,
        }
    }

    /// Builder: Set max_path_constraints
    pub fn max_path_constraints(mut self, v: usize) -> Self {
        self.max_path_constraints = v;
        self
    }

    /// Builder: Set max_constraint_size
    pub fn max_constraint_size(mut self, v: usize) -> Self {
        self.max_constraint_size = v;
        self
    }

    /// Builder: Set lazy_field_variables
    pub fn lazy_field_variables(mut self, v: bool) -> Self {
        self.lazy_field_variables = v;
        self
    }

    /// Builder: Set slice_queries
    pub fn slice_queries(mut self, v: bool) -> Self {
        self.slice_queries = v;
        self
    }
}

impl Validatable for ConcolicConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "max_path_constraints",
            self.max_path_constraints,
            1,
            1_000_000,
            "A run must keep at least one branch condition",
        )?;
        check_range(
            "max_constraint_size",
            self.max_constraint_size,
            1,
            100_000_000,
            "A branch condition has at least one node",
        )
    }

    fn config_name(&self) -> &'static str {
        "ConcolicConfig"
    }
}

// ============================================================================
// Solver
// ============================================================================

/// Which backend answers queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackendKind {
    /// In-process interval check plus alternating variable method search
    #[default]
    Avm,
    /// External SMT-LIB2 solver process
    SmtLib,
}

/// In-process search budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvmConfig {
    /// Candidate evaluations per query (1..=100000000)
    pub max_iterations: u64,

    /// Largest code point a string character search moves to (1..=65535)
    pub string_alphabet_span: u32,

    /// Finest decimal precision of real-valued moves (0..=15)
    pub real_precision_digits: u32,
}

impl Default for AvmConfig {
    fn default() -> Self {
        Self::for_preset(Preset::Balanced)
    }
}

impl AvmConfig {
    pub fn for_preset(preset: Preset) -> Self {
        let max_iterations = match preset {
            Preset::Fast => 2_000,
            Preset::Balanced | Preset::Custom => 20_000,
            Preset::Thorough => 200_000,
        };
        Self {
            max_iterations,
            string_alphabet_span: 127,
            real_precision_digits: 6,
        }
    }

    /// Builder: Set max_iterations
    pub fn max_iterations(mut self, v: u64) -> Self {
        self.max_iterations = v;
        self
    }

    /// Builder: Set string_alphabet_span
    pub fn string_alphabet_span(mut self, v: u32) -> Self {
        self.string_alphabet_span = v;
        self
    }
}

impl Validatable for AvmConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "max_iterations",
            self.max_iterations,
            1,
            100_000_000,
            "The search needs a finite, positive budget",
        )?;
        check_range(
            "string_alphabet_span",
            self.string_alphabet_span,
            1,
            0xFFFF,
            "Characters are UTF-16 code units",
        )?;
        check_range(
            "real_precision_digits",
            self.real_precision_digits,
            0,
            15,
            "Doubles carry about 15 significant decimal digits",
        )
    }

    fn config_name(&self) -> &'static str {
        "AvmConfig"
    }
}

/// External solver process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmtLibConfig {
    /// Executable reading an SMT-LIB2 script on stdin
    pub command: String,
    pub args: Vec<String>,
}

impl Default for SmtLibConfig {
    fn default() -> Self {
        Self {
            command: "z3".to_string(),
            args: vec!["-in".to_string(), "-smt2".to_string()],
        }
    }
}

impl SmtLibConfig {
    /// Builder: Set command and arguments
    pub fn command(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.command = command.into();
        self.args = args;
        self
    }
}

impl Validatable for SmtLibConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "smtlib.command must name a solver executable".to_string(),
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "SmtLibConfig"
    }
}

/// Solver bridge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub backend: SolverBackendKind,

    /// Deadline per query in milliseconds (1..=600000)
    pub timeout_ms: u64,

    /// Answers memoized by canonical query text; 0 disables the cache
    pub cache_capacity: usize,

    pub avm: AvmConfig,

    pub smtlib: SmtLibConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::for_preset(Preset::Balanced)
    }
}

impl SolverConfig {
    pub fn for_preset(preset: Preset) -> Self {
        let (timeout_ms, cache_capacity) = match preset {
            Preset::Fast => (100, 256),
            Preset::Balanced | Preset::Custom => (1_000, 1_024),
            Preset::Thorough => (10_000, 4_096),
        };
        Self {
            backend: SolverBackendKind::Avm,
            timeout_ms,
            cache_capacity,
            avm: AvmConfig::for_preset(preset),
            smtlib: SmtLibConfig::default(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builder: Set backend
    pub fn backend(mut self, v: SolverBackendKind) -> Self {
        self.backend = v;
        self
    }

    /// Builder: Set timeout_ms
    pub fn timeout_ms(mut self, v: u64) -> Self {
        self.timeout_ms = v;
        self
    }

    /// Builder: Set cache_capacity
    pub fn cache_capacity(mut self, v: usize) -> Self {
        self.cache_capacity = v;
        self
    }

    /// Builder: Adjust the AVM budget
    pub fn avm<F>(mut self, f: F) -> Self
    where
        F: FnOnce(AvmConfig) -> AvmConfig,
    {
        self.avm = f(self.avm);
        self
    }

    /// Builder: Adjust the external solver command
    pub fn smtlib<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SmtLibConfig) -> SmtLibConfig,
    {
        self.smtlib = f(self.smtlib);
        self
    }
}

impl Validatable for SolverConfig {
    fn validate(&self) -> ConfigResult<()> {
        check_range(
            "timeout_ms",
            self.timeout_ms,
            1,
            600_000,
            "A solver call needs a positive deadline of at most 10 minutes",
        )?;
        check_range(
            "cache_capacity",
            self.cache_capacity,
            0,
            1_000_000,
            "Use 0 to disable the answer cache",
        )?;
        self.avm.validate()?;
        if self.backend == SolverBackendKind::SmtLib {
            self.smtlib.validate()?;
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "SolverConfig"
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineConfig {
    preset: Preset,
    pub concolic: ConcolicConfig,
    pub solver: SolverConfig,
}

impl EngineConfig {
    /// Start from a preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            concolic: ConcolicConfig::for_preset(preset),
            solver: SolverConfig::for_preset(preset),
        }
    }

    pub fn get_preset(&self) -> Preset {
        self.preset
    }

    /// Override concolic settings (closure-based)
    pub fn concolic<F>(mut self, f: F) -> Self
    where
        F: FnOnce(ConcolicConfig) -> ConcolicConfig,
    {
        self.concolic = f(self.concolic);
        self
    }

    /// Override solver settings (closure-based)
    pub fn solver<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SolverConfig) -> SolverConfig,
    {
        self.solver = f(self.solver);
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> ConfigResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Load a YAML v1 file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a YAML v1 document; the result is validated
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export = io::parse_v1(content)?;
        let preset: Preset = export.preset.parse()?;

        let mut config = Self::preset(preset);
        if let Some(overrides) = export.overrides {
            if let Some(concolic) = overrides.concolic {
                config.concolic = concolic;
            }
            if let Some(solver) = overrides.solver {
                config.solver = solver;
            }
        }
        config.build()
    }

    /// Export as YAML v1 with every field spelled out
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: io::CURRENT_VERSION,
            preset: self.preset.to_string(),
            overrides: Some(ConfigOverrides {
                concolic: Some(self.concolic.clone()),
                solver: Some(self.solver.clone()),
            }),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.concolic.validate()?;
        self.solver.validate()
    }

    fn config_name(&self) -> &'static str {
        "EngineConfig"
    }
}
