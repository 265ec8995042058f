//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Only deterministic business failures live here. Storage failures are
/// reported by the persistence layer with its own error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is missing or a value is malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A status change (or edit) was attempted from a state that does not allow it.
    #[error("invalid transition: cannot {action} from {from}")]
    InvalidTransition { from: String, action: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced record does not exist.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_transition(from: impl core::fmt::Display, action: impl core::fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            action: action.to_string(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_state_and_action() {
        let err = DomainError::invalid_transition("Draft", "mark paid");
        assert_eq!(err.to_string(), "invalid transition: cannot mark paid from Draft");
    }
}
