//! Error types for describing and invoking functions
//!
//! Every fallible operation in this crate returns [`SchemaError`]. Errors are
//! never retried or swallowed internally; the describe and invoke entry points
//! hand them straight back to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use annotated_docs::{call_with_json, SchemaError};
//!
//! match call_with_json(&get_weather, &args) {
//!     Ok(report) => println!("{report}"),
//!     Err(SchemaError::MissingArgument(name)) => eprintln!("missing `{name}`"),
//!     Err(SchemaError::ArgumentValidation { path, reason }) => {
//!         eprintln!("`{path}` is invalid: {reason}")
//!     }
//!     Err(other) => eprintln!("{}: {other}", other.error_code()),
//! }
//! ```

mod path;

pub use path::FieldPath;

use thiserror::Error;

/// Errors raised while introspecting, describing or invoking a callable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// The callable declares a parameter that cannot be mapped from JSON
    /// (untyped, `Any`-typed, variadic, duplicated, or ambiguously documented)
    #[error("Unsupported signature for `{function}`: parameter `{parameter}` {reason}")]
    UnsupportedSignature {
        function: String,
        parameter: String,
        reason: String,
    },

    /// A declared type has no JSON Schema representation
    #[error("Cannot generate JSON Schema for `{path}`: {reason}")]
    SchemaGeneration { path: String, reason: String },

    /// A required parameter is absent from the raw arguments
    #[error("Missing required argument `{0}`")]
    MissingArgument(String),

    /// A supplied value violates its declared type, enumeration or nested field constraint
    #[error("Invalid argument `{path}`: {reason}")]
    ArgumentValidation { path: FieldPath, reason: String },

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchemaError {
    pub(crate) fn unsupported(
        function: impl Into<String>,
        parameter: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedSignature {
            function: function.into(),
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn generation(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaGeneration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(path: FieldPath, reason: impl Into<String>) -> Self {
        Self::ArgumentValidation {
            path,
            reason: reason.into(),
        }
    }

    /// Get the canonical error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedSignature { .. } => "E_UNSUPPORTED_SIGNATURE",
            Self::SchemaGeneration { .. } => "E_SCHEMA_GENERATION",
            Self::MissingArgument(_) => "E_MISSING_ARGUMENT",
            Self::ArgumentValidation { .. } => "E_ARGUMENT_VALIDATION",
            Self::InvalidConfig(_) => "E_CONFIG",
        }
    }

    /// Whether the error was caused by the supplied arguments rather than by
    /// the callable's declaration
    ///
    /// Callers relaying errors back to a model can retry with corrected
    /// arguments only when this returns `true`.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument(_) | Self::ArgumentValidation { .. }
        )
    }
}

/// Result type for schema and invocation operations
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaError::MissingArgument("city".into()).error_code(),
            "E_MISSING_ARGUMENT"
        );
        assert_eq!(
            SchemaError::generation("callback", "function types are not supported").error_code(),
            "E_SCHEMA_GENERATION"
        );
        assert_eq!(
            SchemaError::unsupported("f", "x", "has no declared type").error_code(),
            "E_UNSUPPORTED_SIGNATURE"
        );
    }

    #[test]
    fn test_error_display() {
        let err = SchemaError::unsupported("get_weather", "extra", "has no declared type");
        assert_eq!(
            err.to_string(),
            "Unsupported signature for `get_weather`: parameter `extra` has no declared type"
        );

        let err = SchemaError::invalid(
            FieldPath::root().child("location").child("city"),
            "expected string, got number",
        );
        assert_eq!(
            err.to_string(),
            "Invalid argument `location.city`: expected string, got number"
        );
    }

    #[test]
    fn test_argument_errors() {
        assert!(SchemaError::MissingArgument("a".into()).is_argument_error());
        assert!(SchemaError::invalid(FieldPath::root(), "bad").is_argument_error());
        assert!(!SchemaError::generation("a", "bad").is_argument_error());
        assert!(!SchemaError::InvalidConfig("bad".into()).is_argument_error());
    }
}
