//! Error types for query composition
//!
//! Three kinds of failure can stop a query from being built:
//!
//! - [`QueryError::Configuration`]: a field was declared with settings that can
//!   never render a valid clause (bad lookup expression, unknown multi_match
//!   type, conflicting query_string targets, ...).
//! - [`QueryError::Validation`]: a request parameter could not be coerced into
//!   the type its field expects. Carries the parameter name and the underlying
//!   [`CoercionError`].
//! - [`QueryError::Assembly`]: a rendered clause had a shape the assembler
//!   cannot place into a boolean query.
//!
//! None of them are retried; the whole document is abandoned.

use thiserror::Error;

/// A single failed type conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    /// The value has a JSON type the target type cannot be built from.
    #[error("expected {expected}, got {found}")]
    Mismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A string did not hold a literal of the target type.
    #[error("invalid {expected} literal: {literal:?}")]
    InvalidLiteral {
        expected: &'static str,
        literal: String,
    },

    /// The converted number cannot be represented.
    #[error("{0} is out of range")]
    OutOfRange(String),
}

/// Errors raised while declaring fields or building a query document.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid field declaration, detected at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A bound parameter could not be normalized.
    #[error("invalid input for `{param}`")]
    Validation {
        param: String,
        #[source]
        source: CoercionError,
    },

    /// Internal invariant of the assembler was violated.
    #[error("assembly error: {0}")]
    Assembly(String),
}

/// Result type alias for query composition.
pub type Result<T> = std::result::Result<T, QueryError>;

impl QueryError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        QueryError::Configuration(msg.into())
    }

    /// Create a new validation error for `param`.
    pub fn validation<S: Into<String>>(param: S, source: CoercionError) -> Self {
        QueryError::Validation {
            param: param.into(),
            source,
        }
    }

    /// Create a new assembly error.
    pub fn assembly<S: Into<String>>(msg: S) -> Self {
        QueryError::Assembly(msg.into())
    }

    /// Parameter name attached to a validation error.
    pub fn param(&self) -> Option<&str> {
        match self {
            QueryError::Validation { param, .. } => Some(param),
            _ => None,
        }
    }
}
