//! Tests for accessor configuration.

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        strategy = "fallback"
        non_public_default_constructor = false
    "#;

    let config = AccessorConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.strategy, StrategyPolicy::Fallback);
    assert!(!config.non_public_default_constructor);
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        strategy: auto
        non_public_default_constructor: true
    "#;

    let config = AccessorConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.strategy, StrategyPolicy::Auto);
    assert!(config.non_public_default_constructor);
}

#[test]
fn test_empty_document_uses_defaults() {
    let config = AccessorConfig::from_toml_str("").unwrap();
    assert_eq!(config, AccessorConfig::default());
    assert_eq!(config.strategy, StrategyPolicy::Auto);
    assert!(config.non_public_default_constructor);
}

#[test]
fn test_unknown_policy_rejected() {
    let result = AccessorConfig::from_toml_str(r#"strategy = "compiling""#);
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_builder() {
    let config = AccessorConfig::new()
        .with_strategy(StrategyPolicy::Fallback)
        .with_non_public_default_constructor(false);
    assert_eq!(config.strategy, StrategyPolicy::Fallback);
    assert!(!config.non_public_default_constructor);
}

#[test]
fn test_missing_file() {
    let result = AccessorConfig::load("/nonexistent/reflectforge.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
