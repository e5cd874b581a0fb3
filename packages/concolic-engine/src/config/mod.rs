//! Engine Configuration
//!
//! Tiered configuration:
//! - Level 1: Preset (`fast`, `balanced`, `thorough`)
//! - Level 2: Section override through closures
//! - Level 3: YAML v1 file
//!
//! # Examples
//!
//! ```rust,ignore
//! use concolic_engine::config::{EngineConfig, Preset};
//!
//! let config = EngineConfig::preset(Preset::Fast).build()?;
//!
//! let config = EngineConfig::preset(Preset::Balanced)
//!     .solver(|s| s.timeout_ms(250).avm(|a| a.max_iterations(5_000)))
//!     .build()?;
//!
//! let config = EngineConfig::from_yaml("concolic.yaml")?;
//! ```

pub mod engine_config;
pub mod error;
pub mod io;
pub mod preset;
pub mod validation;

pub use engine_config::{
    AvmConfig, ConcolicConfig, EngineConfig, SmtLibConfig, SolverBackendKind, SolverConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigExportV1, ConfigOverrides};
pub use preset::Preset;
pub use validation::Validatable;
