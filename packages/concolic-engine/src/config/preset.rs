//! Preset configurations
//!
//! Presets provide complete default configurations for common search
//! budgets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Short solver deadlines, small search budget
    ///
    /// - Path condition: at most 200 branch conditions
    /// - Solver: 100ms timeout, 2k AVM evaluations
    Fast,

    /// Default for test generation
    ///
    /// - Path condition: at most 1000 branch conditions
    /// - Solver: 1s timeout, 20k AVM evaluations
    #[default]
    Balanced,

    /// Long deadlines for hard-to-reach branches
    ///
    /// - Path condition: at most 5000 branch conditions
    /// - Solver: 10s timeout, 200k AVM evaluations
    Thorough,

    /// User-defined (YAML only); starts from the balanced values
    Custom,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            "custom" => Ok(Self::Custom),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!("fast".parse::<Preset>().unwrap(), Preset::Fast);
        assert_eq!("FAST".parse::<Preset>().unwrap(), Preset::Fast);
        assert_eq!("balanced".parse::<Preset>().unwrap(), Preset::Balanced);
        assert_eq!("thorough".parse::<Preset>().unwrap(), Preset::Thorough);
        assert_eq!("custom".parse::<Preset>().unwrap(), Preset::Custom);
        assert!(matches!(
            "invalid".parse::<Preset>(),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::Fast.to_string(), "fast");
        assert_eq!(Preset::Custom.to_string(), "custom");
    }

    #[test]
    fn test_default_preset() {
        assert_eq!(Preset::default(), Preset::Balanced);
    }
}
