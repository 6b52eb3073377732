//! Configuration system for ReflectForge.
//!
//! Load accessor configuration from TOML or YAML to choose the delegate
//! strategy policy and constructor visibility without code changes.
//!
//! # Examples
//!
//! ```
//! use reflectforge_config::{AccessorConfig, StrategyPolicy};
//!
//! let config = AccessorConfig::from_toml_str(r#"
//!     strategy = "fallback"
//!     non_public_default_constructor = false
//! "#).unwrap();
//!
//! assert_eq!(config.strategy, StrategyPolicy::Fallback);
//! assert!(!config.non_public_default_constructor);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use reflectforge_config::AccessorConfig;
//!
//! let config = AccessorConfig::load("reflectforge.toml").unwrap_or_default();
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Accessor layer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AccessorConfig {
    /// Which delegate strategy a configured factory may use.
    #[serde(default)]
    pub strategy: StrategyPolicy,

    /// Whether default construction may go through a non-public
    /// zero-argument constructor.
    #[serde(default = "default_true")]
    pub non_public_default_constructor: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyPolicy::default(),
            non_public_default_constructor: true,
        }
    }
}

impl AccessorConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the strategy policy.
    pub fn with_strategy(mut self, strategy: StrategyPolicy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets whether non-public zero-argument constructors may be used.
    pub fn with_non_public_default_constructor(mut self, allowed: bool) -> Self {
        self.non_public_default_constructor = allowed;
        self
    }
}

/// Strategy selection policy.
///
/// No policy forces the compiling strategy; code generation support is a
/// property of the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPolicy {
    /// Compile when the host allows runtime code generation, else fall back.
    #[default]
    Auto,

    /// Always use late-bound delegates; the capability probe is never run.
    Fallback,
}
