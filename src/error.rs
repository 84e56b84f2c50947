//! Coercion failures come in exactly two categories. Invalid-argument means
//! the value's dynamic kind can never satisfy the target type; domain means
//! the kind was acceptable but the content fell outside the legal subset.
//! Composite converters re-wrap member failures with the composite's own
//! label and keep the original reachable through `source()`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoercionError {
    #[error("{message}")]
    InvalidArgument {
        message: String,
        #[source]
        source: Option<Box<CoercionError>>,
    },
    #[error("{message}")]
    Domain {
        message: String,
        #[source]
        source: Option<Box<CoercionError>>,
    },
}

impl CoercionError {
    pub fn invalid_argument(message: impl Into<String>, cause: Option<CoercionError>) -> Self {
        CoercionError::InvalidArgument { message: message.into(), source: cause.map(Box::new) }
    }

    pub fn domain(message: impl Into<String>, cause: Option<CoercionError>) -> Self {
        CoercionError::Domain { message: message.into(), source: cause.map(Box::new) }
    }

    /// New error with the same category as `cause`, chaining it.
    pub fn same_category(message: impl Into<String>, cause: CoercionError) -> Self {
        match cause {
            CoercionError::InvalidArgument { .. } => {
                CoercionError::invalid_argument(message, Some(cause))
            }
            CoercionError::Domain { .. } => CoercionError::domain(message, Some(cause)),
        }
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, CoercionError::Domain { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CoercionError::InvalidArgument { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            CoercionError::InvalidArgument { message, .. }
            | CoercionError::Domain { message, .. } => message,
        }
    }

    pub fn cause(&self) -> Option<&CoercionError> {
        match self {
            CoercionError::InvalidArgument { source, .. }
            | CoercionError::Domain { source, .. } => source.as_deref(),
        }
    }
}

// ---- message forms ---- //

/// `Expected {type}, got {repr}`
pub(crate) fn expected(expected_type: &str, got_repr: &str) -> String {
    format!("Expected {expected_type}, got {got_repr}")
}

/// `Expected {type}` (used when the offending value is already named by the
/// chained cause).
pub(crate) fn expected_bare(expected_type: &str) -> String {
    format!("Expected {expected_type}")
}

/// `Expected {type}. {detail}`
pub(crate) fn expected_note(expected_type: &str, detail: &str) -> String {
    format!("Expected {expected_type}. {detail}")
}
