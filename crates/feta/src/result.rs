//! Result and error types for Feta.

use thiserror::Error;

/// Result type for Feta operations
pub type FetaResult<T> = Result<T, FetaError>;

/// Errors that can occur while mocking, stubbing or asserting
#[derive(Debug, Error)]
pub enum FetaError {
    /// A poisoned method was called before `when(..).then(..)` stubbed it
    #[error("method {method} was called but never mocked")]
    MethodNotMocked {
        /// Name of the poisoned method
        method: String,
    },

    /// `restore` was given an object the registry has no record for
    #[error("Object was never mocked, cannot restore")]
    NotMocked,

    /// Canonical serialized forms differ
    #[error("Assertion error\nExpected: {expected}\nActual:   {actual}")]
    AssertionFailed {
        /// Serialized expected value
        expected: String,
        /// Serialized actual value
        actual: String,
    },

    /// The object has no slot under this name
    #[error("{method} is not a method of {object}")]
    UnknownMethod {
        /// Object label
        object: String,
        /// Requested method name
        method: String,
    },

    /// Call-time arguments could not be decoded into the expected types
    #[error("Arguments to {method} could not be decoded: {message}")]
    ArgumentDecode {
        /// Method name
        method: String,
        /// Decoder message
        message: String,
    },

    /// A method's return value could not be decoded into the expected type
    #[error("Return value of {method} could not be decoded: {message}")]
    ReturnDecode {
        /// Method name
        method: String,
        /// Decoder message
        message: String,
    },

    /// Failure raised by a user-supplied validation callback or behavior
    #[error("{message}")]
    Validation {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FetaError {
    /// Build a `Validation` error, for use inside `assert` callbacks and behaviors
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error signals a forgotten stub
    #[must_use]
    pub const fn is_method_not_mocked(&self) -> bool {
        matches!(self, Self::MethodNotMocked { .. })
    }

    /// Whether this error came from the deep-equality primitive
    #[must_use]
    pub const fn is_assertion_failure(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_mocked_names_method() {
        let err = FetaError::MethodNotMocked {
            method: "greet".to_string(),
        };
        assert_eq!(err.to_string(), "method greet was called but never mocked");
        assert!(err.is_method_not_mocked());
    }

    #[test]
    fn test_assertion_failed_message_carries_both_forms() {
        let err = FetaError::AssertionFailed {
            expected: "\"x\"".to_string(),
            actual: "\"z\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Assertion error\nExpected: \"x\"\nActual:   \"z\""
        );
        assert!(err.is_assertion_failure());
    }

    #[test]
    fn test_validation_is_verbatim() {
        assert_eq!(FetaError::validation("boom").to_string(), "boom");
    }

    #[test]
    fn test_json_conversion() {
        let err: FetaError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, FetaError::Json(_)));
    }
}
