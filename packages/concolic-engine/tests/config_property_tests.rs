//! Property-based tests for the engine configuration
//!
//! - Validity: in-range overrides always build
//! - Rejection: out-of-range values name the offending field
//! - Persistence: a built configuration survives a YAML file unchanged

use concolic_engine::config::*;
use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn preset() -> impl Strategy<Value = Preset> {
    prop_oneof![
        Just(Preset::Fast),
        Just(Preset::Balanced),
        Just(Preset::Thorough),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_in_range_overrides_build(
        preset in preset(),
        timeout in 1u64..=600_000,
        iterations in 1u64..=100_000_000,
        max_conditions in 1usize..=1_000_000,
        slice in any::<bool>(),
    ) {
        let config = EngineConfig::preset(preset)
            .solver(|s| s.timeout_ms(timeout).avm(|a| a.max_iterations(iterations)))
            .concolic(|c| c.max_path_constraints(max_conditions).slice_queries(slice))
            .build();
        prop_assert!(config.is_ok());
    }

    #[test]
    fn prop_out_of_range_timeout_is_rejected(timeout in 600_001u64..u64::MAX) {
        let err = EngineConfig::preset(Preset::Balanced)
            .solver(|s| s.timeout_ms(timeout))
            .build()
            .unwrap_err();
        prop_assert!(
            matches!(&err, ConfigError::Range { field, .. } if field == "timeout_ms"),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn prop_yaml_file_preserves_config(
        preset in preset(),
        timeout in 1u64..=600_000,
        capacity in 0usize..=1_000_000,
        lazy in any::<bool>(),
    ) {
        let config = EngineConfig::preset(preset)
            .solver(|s| s.timeout_ms(timeout).cache_capacity(capacity))
            .concolic(|c| c.lazy_field_variables(lazy))
            .build()
            .unwrap();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(config.to_yaml().unwrap().as_bytes()).unwrap();
        let loaded = EngineConfig::from_yaml(file.path()).unwrap();
        prop_assert_eq!(loaded, config);
    }
}

#[test]
fn test_zero_path_constraints_rejected() {
    let err = EngineConfig::preset(Preset::Fast)
        .concolic(|c| c.max_path_constraints(0))
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("max_path_constraints"));
}

#[test]
fn test_unknown_solver_field_is_named() {
    let yaml = r#"
version: 1
preset: balanced
overrides:
  solver:
    timeout: 250
"#;
    let err = EngineConfig::from_yaml_str(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownField { ref field, .. } if field == "timeout"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = EngineConfig::from_yaml(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}
