//! # Error Types — Dispatch Error Taxonomy
//!
//! Defines the errors raised by the States engine. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every kind is distinct and non-overlapping, so callers can match on
//!   the variant to pick a remedy (enable another state, fix a name, ...).
//! - "Method not found" and "method not implemented" share one variant.
//!   The detail message says whether the method exists but is unreachable.
//! - Errors raised by state method bodies travel in [`StatesError::Custom`]
//!   and are propagated by the dispatcher exactly as returned.

use thiserror::Error;

/// Top-level error type for States.
#[derive(Error, Debug)]
pub enum StatesError {
    /// A state name is absent from the registry of the proxy.
    #[error("state {state} is not available in {class}")]
    StateNotFound {
        /// The requested state name.
        state: String,
        /// The stated class the lookup ran against.
        class: String,
    },

    /// No reachable state implements the requested method.
    #[error("method {method} is not available: {detail}")]
    MethodNotImplemented {
        /// The requested method name, as called.
        method: String,
        /// Why resolution failed (active states, visibility, ...).
        detail: String,
    },

    /// An identifier failed validation.
    #[error("illegal name: {0}")]
    IllegalName(#[from] ValidationError),

    /// Wrong-typed or malformed input to a core API.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// More than one active state implements a method and the caller
    /// demanded a unique implementation.
    #[error("method {method} is implemented by several active states: {}", .states.join(", "))]
    AvailableSeveralMethodImplementations {
        /// The requested method name.
        method: String,
        /// Every active state that implements it, in search order.
        states: Vec<String>,
    },

    /// A service key is not registered in the container.
    #[error("service {0} is not registered in the container")]
    ServiceNotFound(String),

    /// Snapshot serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An error raised by a state method body.
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl StatesError {
    /// Wrap an error raised inside a state method body.
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Custom(err.into())
    }

    /// Build a [`StatesError::MethodNotImplemented`].
    pub fn method_not_implemented(method: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MethodNotImplemented {
            method: method.into(),
            detail: detail.into(),
        }
    }

    /// Build a [`StatesError::StateNotFound`].
    pub fn state_not_found(state: impl Into<String>, class: impl ToString) -> Self {
        Self::StateNotFound {
            state: state.into(),
            class: class.to_string(),
        }
    }

    /// Build a [`StatesError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Identifier validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// State names are identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid state name {0:?}")]
    InvalidStateName(String),

    /// Method names are identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid method name {0:?}")]
    InvalidMethodName(String),

    /// Property names are identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid property name {0:?}")]
    InvalidPropertyName(String),

    /// Class names are `::`-separated identifier segments.
    #[error("invalid stated class name {0:?}")]
    InvalidClassName(String),

    /// Two state names collide under `<method>Of<State>` decomposition.
    #[error("state name {name:?} is ambiguous with {other:?} in an Of-qualified call")]
    AmbiguousStateName {
        /// The name being registered.
        name: String,
        /// The already-registered name it collides with.
        other: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_not_found_display() {
        let err = StatesError::state_not_found("Draft", "Article");
        assert_eq!(err.to_string(), "state Draft is not available in Article");
    }

    #[test]
    fn test_several_implementations_lists_states() {
        let err = StatesError::AvailableSeveralMethodImplementations {
            method: "render".into(),
            states: vec!["First".into(), "Second".into()],
        };
        assert_eq!(
            err.to_string(),
            "method render is implemented by several active states: First, Second"
        );
    }

    #[test]
    fn test_validation_error_converts_to_illegal_name() {
        let err: StatesError = ValidationError::InvalidStateName("1abc".into()).into();
        assert!(matches!(err, StatesError::IllegalName(_)));
    }

    #[test]
    fn test_custom_error_is_transparent() {
        let err = StatesError::custom("body must not be empty");
        assert_eq!(err.to_string(), "body must not be empty");
    }
}
