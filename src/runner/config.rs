//! Realm configuration file parsing.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 256;
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;
/// Highest call depth the evaluator can reach without exhausting the native stack.
pub const MAX_CALL_DEPTH_CEILING: usize = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Limits and presentation settings for one realm.
///
/// Expected format:
/// ```json
/// {
///     "max_chain_depth": 64,
///     "max_call_depth": 100,
///     "global_name": "window",
///     "echo_output": true
/// }
/// ```
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RealmConfig {
    /// Longest delegate chain a property read will walk.
    pub max_chain_depth: usize,
    /// Deepest nesting of invocations before a `RangeError`.
    pub max_call_depth: usize,
    /// Name the global sentinel is bound to (besides `globalThis`).
    pub global_name: String,
    /// Whether console output is also written to stdout/stderr.
    pub echo_output: bool,
}

impl RealmConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: RealmConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chain_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_chain_depth must be at least 1".to_string(),
            ));
        }
        if self.max_call_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_call_depth must be at least 1".to_string(),
            ));
        }
        if self.max_call_depth > MAX_CALL_DEPTH_CEILING {
            return Err(ConfigError::Invalid(format!(
                "max_call_depth must be at most {}",
                MAX_CALL_DEPTH_CEILING
            )));
        }
        if self.global_name.trim().is_empty() {
            return Err(ConfigError::Invalid("global_name is empty".to_string()));
        }
        Ok(())
    }

    /// The call depth actually enforced. Configs built in code skip `validate`, so
    /// the ceiling applies here too.
    pub fn call_depth_limit(&self) -> usize {
        self.max_call_depth.min(MAX_CALL_DEPTH_CEILING)
    }
}

impl Default for RealmConfig {
    fn default() -> Self {
        RealmConfig {
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            global_name: "global".to_string(),
            echo_output: false,
        }
    }
}
