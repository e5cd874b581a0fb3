//! Configuration I/O (YAML)
//!
//! Defines the YAML schema types. Loading methods live on `EngineConfig`.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::engine_config::{ConcolicConfig, SolverConfig};
use super::error::{ConfigError, ConfigResult};

pub const CURRENT_VERSION: u32 = 1;

const TOP_LEVEL_FIELDS: &[&str] = &["version", "preset", "overrides"];
const OVERRIDE_SECTIONS: &[&str] = &["concolic", "solver"];
const CONCOLIC_FIELDS: &[&str] = &[
    "max_path_constraints",
    "max_constraint_size",
    "lazy_field_variables",
    "slice_queries",
];
const SOLVER_FIELDS: &[&str] = &["backend", "timeout_ms", "cache_capacity", "avm", "smtlib"];

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    pub version: u32,

    /// Base preset
    pub preset: String,

    /// Section overrides; a present section replaces the preset's
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concolic: Option<ConcolicConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverConfig>,
}

/// Parse a v1 document, reporting version and field problems by name
pub(crate) fn parse_v1(content: &str) -> ConfigResult<ConfigExportV1> {
    let raw: Value = serde_yaml::from_str(content)?;
    if let Value::Mapping(root) = &raw {
        check_version(root)?;
        check_fields(root, "root", TOP_LEVEL_FIELDS)?;
        if let Some(Value::Mapping(overrides)) = root.get("overrides") {
            check_fields(overrides, "overrides", OVERRIDE_SECTIONS)?;
            if let Some(Value::Mapping(section)) = overrides.get("concolic") {
                check_fields(section, "concolic", CONCOLIC_FIELDS)?;
            }
            if let Some(Value::Mapping(section)) = overrides.get("solver") {
                check_fields(section, "solver", SOLVER_FIELDS)?;
            }
        }
    }
    Ok(serde_yaml::from_value(raw)?)
}

fn check_version(root: &Mapping) -> ConfigResult<()> {
    let version = root.get("version").ok_or(ConfigError::MissingVersion)?;
    match version.as_u64() {
        Some(v) if v == CURRENT_VERSION as u64 => Ok(()),
        Some(v) => Err(ConfigError::UnsupportedVersion {
            found: u32::try_from(v).unwrap_or(u32::MAX),
            supported: vec![CURRENT_VERSION],
        }),
        None => Err(ConfigError::Validation(format!(
            "'version' must be an integer, got {:?}",
            version
        ))),
    }
}

fn check_fields(section: &Mapping, name: &str, valid: &[&str]) -> ConfigResult<()> {
    for key in section.keys() {
        let Some(key) = key.as_str() else {
            continue;
        };
        if !valid.contains(&key) {
            return Err(ConfigError::unknown_field_with_suggestion(
                key,
                name,
                valid.iter().map(|f| f.to_string()).collect(),
            ));
        }
    }
    Ok(())
}
