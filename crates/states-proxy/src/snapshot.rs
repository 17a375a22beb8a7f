//! # Proxy Snapshots
//!
//! A [`ProxySnapshot`] is the serializable part of a proxy: its class name,
//! attributes and active states in enable order. State method tables are
//! code and are never serialized; [`Proxy::restore`](crate::Proxy::restore)
//! rebuilds them from the stated class and re-enables the recorded states.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use states_core::{StateName, StatedClassName, StatesError};

/// Serializable proxy data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxySnapshot {
    /// Stated class the proxy belongs to.
    pub class: StatedClassName,
    /// Proxy attributes.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Active states, in enable order.
    #[serde(default)]
    pub active_states: Vec<StateName>,
}

impl ProxySnapshot {
    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::Serialization`] on encoder failure.
    pub fn to_json(&self) -> Result<String, StatesError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON snapshot. Names are validated while parsing.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::Serialization`] for malformed JSON or an
    /// invalid class or state name.
    pub fn from_json(json: &str) -> Result<Self, StatesError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_snapshot() {
        let snapshot = ProxySnapshot::from_json(
            r#"{"class": "Blog::Article", "attributes": {"title": "Hi"}, "active_states": ["StateDefault", "Draft"]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.class.as_str(), "Blog::Article");
        assert_eq!(snapshot.attributes.get("title"), Some(&json!("Hi")));
        assert_eq!(snapshot.active_states.len(), 2);
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot = ProxySnapshot::from_json(r#"{"class": "Article"}"#).unwrap();
        assert!(snapshot.attributes.is_empty());
        assert!(snapshot.active_states.is_empty());
    }

    #[test]
    fn test_invalid_state_name_rejected() {
        let err = ProxySnapshot::from_json(r#"{"class": "Article", "active_states": ["no way"]}"#)
            .unwrap_err();
        assert!(matches!(err, StatesError::Serialization(_)));
    }
}
