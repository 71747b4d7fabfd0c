//! Walk configuration
//!
//! Loaded from TOML by hosts; every field has a default so an empty file (or
//! no file at all) yields a usable configuration.
//!
//! ```toml
//! max_depth = 256
//! on_expression_error = "abort"
//! on_effector_error = "continue"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::policy::{EffectorErrorPolicy, ExpressionErrorPolicy};

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Tunables for a `TreeWalker`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalkConfig {
    /// Maximum path length; deeper trees fail with `DepthLimitExceeded`
    pub max_depth: usize,
    pub on_expression_error: ExpressionErrorPolicy,
    pub on_effector_error: EffectorErrorPolicy,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            on_expression_error: ExpressionErrorPolicy::default(),
            on_effector_error: EffectorErrorPolicy::default(),
        }
    }
}

impl WalkConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown keys and
    /// `ConfigError::Invalid` for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: WalkConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise as
    /// `from_toml_str`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `max_depth` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "max_depth".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_expression_policy(mut self, policy: ExpressionErrorPolicy) -> Self {
        self.on_expression_error = policy;
        self
    }

    pub fn with_effector_policy(mut self, policy: EffectorErrorPolicy) -> Self {
        self.on_effector_error = policy;
        self
    }
}
