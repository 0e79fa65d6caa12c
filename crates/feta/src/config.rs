//! Mocking behaviour configuration.

use crate::result::{FetaError, FetaResult};
use serde::{Deserialize, Serialize};

/// When a stub reads its validation callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationBinding {
    /// Read at call time: `assert` after `then` affects later calls
    #[default]
    Live,
    /// Captured when `then` installs the interceptor
    Snapshot,
}

/// Configuration for a [`Feta`](crate::Feta) instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetaConfig {
    /// Replace every existing method with a failing stub at mock time
    pub poison_unstubbed: bool,
    /// Validation callback binding for installed stubs
    pub validation: ValidationBinding,
    /// Fallback log filter when `FETA_LOG` is unset
    pub log_level: String,
}

impl Default for FetaConfig {
    fn default() -> Self {
        Self {
            poison_unstubbed: true,
            validation: ValidationBinding::Live,
            log_level: "warn".to_string(),
        }
    }
}

impl FetaConfig {
    /// Create a new config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep original methods callable after `mock` instead of poisoning them
    #[must_use]
    pub const fn pass_through(mut self) -> Self {
        self.poison_unstubbed = false;
        self
    }

    /// Set the validation binding
    #[must_use]
    pub const fn with_validation(mut self, validation: ValidationBinding) -> Self {
        self.validation = validation;
        self
    }

    /// Set the fallback log filter
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(input: &str) -> FetaResult<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()
    }

    /// Parse a YAML document; missing fields take their defaults
    pub fn from_yaml_str(input: &str) -> FetaResult<Self> {
        let config: Self = serde_yaml_ng::from_str(input)?;
        config.validate()
    }

    fn validate(self) -> FetaResult<Self> {
        if self.log_level.trim().is_empty() {
            return Err(FetaError::Config {
                message: "log_level must not be empty".to_string(),
            });
        }
        Ok(self)
    }
}
