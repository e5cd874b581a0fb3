//! Configuration validation

use super::error::ConfigResult;

/// Trait for validatable configuration objects
pub trait Validatable {
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Check `min <= value <= max`
pub(crate) fn check_range<T>(field: &str, value: T, min: T, max: T, hint: &str) -> ConfigResult<()>
where
    T: PartialOrd + ToString,
{
    if value < min || value > max {
        return Err(super::error::ConfigError::range_with_hint(
            field, value, min, max, hint,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ConfigError;

    #[test]
    fn test_check_range_bounds_are_inclusive() {
        assert!(check_range("x", 1usize, 1, 10, "").is_ok());
        assert!(check_range("x", 10usize, 1, 10, "").is_ok());
        let err = check_range("x", 11usize, 1, 10, "too big").unwrap_err();
        assert!(matches!(err, ConfigError::Range { .. }));
    }
}
