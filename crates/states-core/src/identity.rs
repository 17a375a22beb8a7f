//! # Identifier Newtypes
//!
//! Newtype wrappers for every name the dispatch engine handles. These
//! prevent accidental identifier confusion: a `MethodName` cannot be passed
//! where a `StateName` is expected, and neither can hold a string that
//! would be unreachable through `<method>Of<State>` decomposition.
//!
//! ## Validation
//!
//! State, method and property names are identifiers: a leading ASCII
//! letter or underscore followed by ASCII letters, digits or underscores.
//! Class names are one or more such segments joined by `::`.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Name of the state enabled by default when a proxy is constructed.
pub const DEFAULT_STATE_NAME: &str = "StateDefault";

/// Implement `Deserialize` by routing through the validating constructor,
/// so that serde cannot bypass name validation.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Shared accessors for the string-backed names.
macro_rules! impl_name_accessors {
    ($ty:ident) => {
        impl $ty {
            /// Access the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $ty {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $ty {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Whether `s` is an identifier: `[A-Za-z_][A-Za-z0-9_]*`.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// Name identifiers (validated at construction)
// ---------------------------------------------------------------------------

/// Name of a state, unique within a stated class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StateName(String);

impl_validating_deserialize!(StateName);
impl_name_accessors!(StateName);

impl StateName {
    /// Create a state name, validating the identifier format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidStateName`] if the string is not
    /// an identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_identifier(&s) {
            return Err(ValidationError::InvalidStateName(s));
        }
        Ok(Self(s))
    }

    /// The conventional default state, [`DEFAULT_STATE_NAME`].
    pub fn default_state() -> Self {
        Self(DEFAULT_STATE_NAME.to_string())
    }

    /// Whether `<anything>Of<other>` could also be read as
    /// `<anything>Of<self>`, or the reverse. Two such names cannot live in
    /// the same stated class.
    pub fn collides_with(&self, other: &StateName) -> bool {
        if self == other {
            return false;
        }
        let ends_with_of = |long: &str, short: &str| {
            long.len() >= short.len() + 2
                && long.ends_with(short)
                && long[..long.len() - short.len()].ends_with("Of")
        };
        ends_with_of(&self.0, &other.0) || ends_with_of(&other.0, &self.0)
    }
}

/// Name of a method declared by a state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodName(String);

impl_validating_deserialize!(MethodName);
impl_name_accessors!(MethodName);

impl MethodName {
    /// Create a method name, validating the identifier format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMethodName`] if the string is not
    /// an identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_identifier(&s) {
            return Err(ValidationError::InvalidMethodName(s));
        }
        Ok(Self(s))
    }
}

/// Name of a proxy attribute, as referenced by assertions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PropertyName(String);

impl_validating_deserialize!(PropertyName);
impl_name_accessors!(PropertyName);

impl PropertyName {
    /// Create a property name, validating the identifier format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPropertyName`] if the string is
    /// not an identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_identifier(&s) {
            return Err(ValidationError::InvalidPropertyName(s));
        }
        Ok(Self(s))
    }
}

/// Logical identity of a stated class, e.g. `Blog::Article`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StatedClassName(String);

impl_validating_deserialize!(StatedClassName);
impl_name_accessors!(StatedClassName);

impl StatedClassName {
    /// Create a class name, validating every `::`-separated segment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidClassName`] if the string is
    /// empty or any segment is not an identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || !s.split("::").all(is_identifier) {
            return Err(ValidationError::InvalidClassName(s));
        }
        Ok(Self(s))
    }

    /// The last path segment (`Article` for `Blog::Article`).
    pub fn short_name(&self) -> &str {
        self.0.rsplit("::").next().unwrap_or(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Proxy identity (always valid by construction)
// ---------------------------------------------------------------------------

/// Unique identity of one proxy instance.
///
/// A cloned proxy receives a fresh id; bindings cached by state
/// descriptors are keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyId(Uuid);

impl ProxyId {
    /// Generate a new random proxy identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ProxyId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProxyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "proxy:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_name_accepts_identifiers() {
        for name in ["Draft", "StateDefault", "_internal", "State2", "a"] {
            assert!(StateName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_state_name_rejects_non_identifiers() {
        for name in ["", "2State", "Draft-1", "Draft State", "Étape", "a::b"] {
            assert_eq!(
                StateName::new(name),
                Err(ValidationError::InvalidStateName(name.to_string()))
            );
        }
    }

    #[test]
    fn test_method_name_accepts_magic_names() {
        assert!(MethodName::new("__get").is_ok());
        assert!(MethodName::new("__toString").is_ok());
    }

    #[test]
    fn test_class_name_segments() {
        let name = StatedClassName::new("Blog::Article").unwrap();
        assert_eq!(name.short_name(), "Article");
        assert!(StatedClassName::new("Blog::").is_err());
        assert!(StatedClassName::new("::Article").is_err());
        assert!(StatedClassName::new("").is_err());
    }

    #[test]
    fn test_default_state_name() {
        assert_eq!(StateName::default_state().as_str(), DEFAULT_STATE_NAME);
    }

    #[test]
    fn test_collision_detects_of_suffix() {
        let short = StateName::new("Published").unwrap();
        let long = StateName::new("DraftOfPublished").unwrap();
        assert!(short.collides_with(&long));
        assert!(long.collides_with(&short));
    }

    #[test]
    fn test_collision_ignores_plain_suffix() {
        let short = StateName::new("Default").unwrap();
        let long = StateName::new("StateDefault").unwrap();
        assert!(!short.collides_with(&long));
        assert!(!short.collides_with(&short.clone()));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: StateName = serde_json::from_str("\"Draft\"").unwrap();
        assert_eq!(ok, "Draft");
        let bad: Result<StateName, _> = serde_json::from_str("\"not valid\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_proxy_ids_are_unique() {
        assert_ne!(ProxyId::new(), ProxyId::new());
    }

    mod proptests {
        use crate::identity::*;
        use proptest::prelude::*;

        proptest! {
            /// Every generated identifier is accepted by all name types.
            #[test]
            fn identifiers_are_accepted(s in "[A-Za-z_][A-Za-z0-9_]{0,30}") {
                prop_assert!(StateName::new(s.clone()).is_ok());
                prop_assert!(MethodName::new(s.clone()).is_ok());
                prop_assert!(PropertyName::new(s).is_ok());
            }

            /// Names starting with a digit are always rejected.
            #[test]
            fn leading_digit_is_rejected(s in "[0-9][A-Za-z0-9_]{0,10}") {
                prop_assert!(StateName::new(s).is_err());
            }
        }
    }
}
