//! # Capability Protocols
//!
//! Language-level protocols a proxy can take part in: dynamic properties,
//! keyed access, iteration, counting, invocation, string conversion and
//! serialization. A class opts in per protocol with
//! [`StatedClassBuilder::capability`](crate::StatedClassBuilder::capability).
//! Each protocol operation is then an ordinary dispatched call on a fixed
//! method name, so the active states decide how the proxy behaves.
//!
//! | Capability        | Methods                                                 |
//! |-------------------|---------------------------------------------------------|
//! | `MagicProperties` | `__get`, `__set`, `__isset`, `__unset`                  |
//! | `ArrayAccess`     | `offsetGet`, `offsetSet`, `offsetExists`, `offsetUnset` |
//! | `Iteration`       | `rewind`, `valid`, `current`, `key`, `next`             |
//! | `Countable`       | `count`                                                 |
//! | `Invokable`       | `__invoke`                                              |
//! | `Stringable`      | `__toString`                                            |
//! | `Serializable`    | `serialize`, `unserialize`                              |
//!
//! Using a protocol the class did not declare is `MethodNotImplemented`.

use serde::{Deserialize, Serialize};
use serde_json::json;

use states_core::{Arguments, StatesError, Value};

use crate::proxy::Proxy;

/// A protocol a stated class may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Dynamic property access.
    MagicProperties,
    /// Keyed access with arbitrary offsets.
    ArrayAccess,
    /// Cursor-style iteration.
    Iteration,
    /// Element count.
    Countable,
    /// Calling the proxy itself.
    Invokable,
    /// Conversion to a string.
    Stringable,
    /// Custom serialization.
    Serializable,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 7] = [
        Self::MagicProperties,
        Self::ArrayAccess,
        Self::Iteration,
        Self::Countable,
        Self::Invokable,
        Self::Stringable,
        Self::Serializable,
    ];

    /// The canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MagicProperties => "magic_properties",
            Self::ArrayAccess => "array_access",
            Self::Iteration => "iteration",
            Self::Countable => "countable",
            Self::Invokable => "invokable",
            Self::Stringable => "stringable",
            Self::Serializable => "serializable",
        }
    }

    /// Method names the protocol dispatches to.
    pub fn methods(&self) -> &'static [&'static str] {
        match self {
            Self::MagicProperties => &["__get", "__set", "__isset", "__unset"],
            Self::ArrayAccess => &["offsetGet", "offsetSet", "offsetExists", "offsetUnset"],
            Self::Iteration => &["rewind", "valid", "current", "key", "next"],
            Self::Countable => &["count"],
            Self::Invokable => &["__invoke"],
            Self::Stringable => &["__toString"],
            Self::Serializable => &["serialize", "unserialize"],
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Proxy {
    /// Dispatch a protocol method, refusing protocols the class lacks.
    fn call_capability(
        &mut self,
        capability: Capability,
        method: &str,
        args: &Arguments,
    ) -> Result<Value, StatesError> {
        if !self.class().supports(capability) {
            return Err(StatesError::method_not_implemented(
                method,
                format!(
                    "stated class {} does not support the {capability} capability",
                    self.class().name()
                ),
            ));
        }
        self.call(method, args)
    }
}

fn expect_bool(value: Value, method: &str) -> Result<bool, StatesError> {
    value.as_bool().ok_or_else(|| {
        StatesError::invalid_argument(format!("{method} must return a boolean, got {value}"))
    })
}

fn expect_string(value: Value, method: &str) -> Result<String, StatesError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(StatesError::invalid_argument(format!(
            "{method} must return a string, got {other}"
        ))),
    }
}

/// `__get` / `__set` / `__isset` / `__unset`.
pub trait MagicProperties {
    /// Read a dynamic property.
    fn magic_get(&mut self, name: &str) -> Result<Value, StatesError>;
    /// Write a dynamic property.
    fn magic_set(&mut self, name: &str, value: Value) -> Result<(), StatesError>;
    /// Whether a dynamic property is set.
    fn magic_isset(&mut self, name: &str) -> Result<bool, StatesError>;
    /// Remove a dynamic property.
    fn magic_unset(&mut self, name: &str) -> Result<(), StatesError>;
}

impl MagicProperties for Proxy {
    fn magic_get(&mut self, name: &str) -> Result<Value, StatesError> {
        self.call_capability(Capability::MagicProperties, "__get", &[json!(name)])
    }

    fn magic_set(&mut self, name: &str, value: Value) -> Result<(), StatesError> {
        self.call_capability(Capability::MagicProperties, "__set", &[json!(name), value])?;
        Ok(())
    }

    fn magic_isset(&mut self, name: &str) -> Result<bool, StatesError> {
        let value = self.call_capability(Capability::MagicProperties, "__isset", &[json!(name)])?;
        expect_bool(value, "__isset")
    }

    fn magic_unset(&mut self, name: &str) -> Result<(), StatesError> {
        self.call_capability(Capability::MagicProperties, "__unset", &[json!(name)])?;
        Ok(())
    }
}

/// `offsetGet` / `offsetSet` / `offsetExists` / `offsetUnset`.
pub trait ArrayAccess {
    /// Read the value at `offset`.
    fn offset_get(&mut self, offset: &Value) -> Result<Value, StatesError>;
    /// Write the value at `offset`.
    fn offset_set(&mut self, offset: Value, value: Value) -> Result<(), StatesError>;
    /// Whether `offset` holds a value.
    fn offset_exists(&mut self, offset: &Value) -> Result<bool, StatesError>;
    /// Remove the value at `offset`.
    fn offset_unset(&mut self, offset: &Value) -> Result<(), StatesError>;
}

impl ArrayAccess for Proxy {
    fn offset_get(&mut self, offset: &Value) -> Result<Value, StatesError> {
        self.call_capability(Capability::ArrayAccess, "offsetGet", &[offset.clone()])
    }

    fn offset_set(&mut self, offset: Value, value: Value) -> Result<(), StatesError> {
        self.call_capability(Capability::ArrayAccess, "offsetSet", &[offset, value])?;
        Ok(())
    }

    fn offset_exists(&mut self, offset: &Value) -> Result<bool, StatesError> {
        let value =
            self.call_capability(Capability::ArrayAccess, "offsetExists", &[offset.clone()])?;
        expect_bool(value, "offsetExists")
    }

    fn offset_unset(&mut self, offset: &Value) -> Result<(), StatesError> {
        self.call_capability(Capability::ArrayAccess, "offsetUnset", &[offset.clone()])?;
        Ok(())
    }
}

/// `count`.
pub trait Countable {
    /// Number of elements.
    fn count(&mut self) -> Result<usize, StatesError>;
}

impl Countable for Proxy {
    fn count(&mut self) -> Result<usize, StatesError> {
        let value = self.call_capability(Capability::Countable, "count", &[])?;
        value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                StatesError::invalid_argument(format!(
                    "count must return a non-negative integer, got {value}"
                ))
            })
    }
}

/// `__invoke`.
pub trait Invokable {
    /// Call the proxy itself.
    fn invoke(&mut self, args: &Arguments) -> Result<Value, StatesError>;
}

impl Invokable for Proxy {
    fn invoke(&mut self, args: &Arguments) -> Result<Value, StatesError> {
        self.call_capability(Capability::Invokable, "__invoke", args)
    }
}

/// `__toString`.
pub trait Stringable {
    /// String form of the proxy.
    fn to_display_string(&mut self) -> Result<String, StatesError>;
}

impl Stringable for Proxy {
    fn to_display_string(&mut self) -> Result<String, StatesError> {
        let value = self.call_capability(Capability::Stringable, "__toString", &[])?;
        expect_string(value, "__toString")
    }
}

/// `serialize` / `unserialize`.
pub trait Serializable {
    /// Serialized form produced by the active states.
    fn serialize_data(&mut self) -> Result<String, StatesError>;
    /// Restore from a serialized form.
    fn unserialize_data(&mut self, data: &str) -> Result<(), StatesError>;
}

impl Serializable for Proxy {
    fn serialize_data(&mut self) -> Result<String, StatesError> {
        let value = self.call_capability(Capability::Serializable, "serialize", &[])?;
        expect_string(value, "serialize")
    }

    fn unserialize_data(&mut self, data: &str) -> Result<(), StatesError> {
        self.call_capability(Capability::Serializable, "unserialize", &[json!(data)])?;
        Ok(())
    }
}

/// `rewind` / `valid` / `current` / `key` / `next`.
pub trait Iteration {
    /// Iterate `(key, current)` pairs, starting with `rewind`.
    fn iterate(&mut self) -> ProxyIter<'_>;
}

impl Iteration for Proxy {
    fn iterate(&mut self) -> ProxyIter<'_> {
        ProxyIter {
            proxy: self,
            started: false,
            finished: false,
        }
    }
}

/// Iterator over a proxy implementing the iteration protocol.
///
/// Yields `Err` at most once, then stops.
#[derive(Debug)]
pub struct ProxyIter<'a> {
    proxy: &'a mut Proxy,
    started: bool,
    finished: bool,
}

impl ProxyIter<'_> {
    fn step(&mut self) -> Result<Option<(Value, Value)>, StatesError> {
        let advance = if self.started { "next" } else { "rewind" };
        self.started = true;
        self.proxy.call_capability(Capability::Iteration, advance, &[])?;

        let valid = self.proxy.call_capability(Capability::Iteration, "valid", &[])?;
        if !expect_bool(valid, "valid")? {
            return Ok(None);
        }
        let key = self.proxy.call_capability(Capability::Iteration, "key", &[])?;
        let current = self.proxy.call_capability(Capability::Iteration, "current", &[])?;
        Ok(Some((key, current)))
    }
}

impl Iterator for ProxyIter<'_> {
    type Item = Result<(Value, Value), StatesError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.step() {
            Ok(Some(pair)) => Some(Ok(pair)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{State, StateDefinitionExt};
    use crate::class::StatedClass;
    use states_core::argument;
    use std::sync::Arc;

    fn collection() -> Arc<StatedClass> {
        let default = State::builder("StateDefault")
            .public("count", |this, _| {
                let n = this.get("items").and_then(Value::as_array).map_or(0, Vec::len);
                Ok(json!(n))
            })
            .public("offsetGet", |this, args| {
                let index = argument(args, 0)?.as_u64().unwrap_or_default() as usize;
                Ok(this
                    .get("items")
                    .and_then(|items| items.get(index))
                    .cloned()
                    .unwrap_or(Value::Null))
            })
            .public("offsetExists", |this, args| {
                let index = argument(args, 0)?.as_u64().unwrap_or_default() as usize;
                let len = this.get("items").and_then(Value::as_array).map_or(0, Vec::len);
                Ok(json!(index < len))
            })
            .public("rewind", |this, _| {
                this.set("cursor", 0)?;
                Ok(Value::Null)
            })
            .public("next", |this, _| {
                let cursor = this.get("cursor").and_then(Value::as_u64).unwrap_or_default();
                this.set("cursor", cursor + 1)?;
                Ok(Value::Null)
            })
            .public("valid", |this, _| {
                let cursor = this.get("cursor").and_then(Value::as_u64).unwrap_or_default();
                let len = this.get("items").and_then(Value::as_array).map_or(0, Vec::len);
                Ok(json!((cursor as usize) < len))
            })
            .public("key", |this, _| Ok(this.get_or_null("cursor")))
            .public("current", |this, _| {
                let cursor = this.get("cursor").and_then(Value::as_u64).unwrap_or_default();
                Ok(this
                    .get("items")
                    .and_then(|items| items.get(cursor as usize))
                    .cloned()
                    .unwrap_or(Value::Null))
            })
            .public("__toString", |this, _| Ok(json!(format!("{}", this.get_or_null("items")))))
            .public("__invoke", |_, args| Ok(json!(args.len())))
            .build()
            .unwrap();
        StatedClass::builder("Collection")
            .state(default)
            .capability(Capability::Countable)
            .capability(Capability::ArrayAccess)
            .capability(Capability::Iteration)
            .capability(Capability::Stringable)
            .build()
            .unwrap()
    }

    fn proxy() -> Proxy {
        let mut proxy = Proxy::new(&collection()).unwrap();
        proxy.set_attribute("items", json!(["a", "b"])).unwrap();
        proxy
    }

    #[test]
    fn test_countable() {
        assert_eq!(proxy().count().unwrap(), 2);
    }

    #[test]
    fn test_array_access() {
        let mut proxy = proxy();
        assert_eq!(proxy.offset_get(&json!(1)).unwrap(), json!("b"));
        assert!(proxy.offset_exists(&json!(0)).unwrap());
        assert!(!proxy.offset_exists(&json!(5)).unwrap());
    }

    #[test]
    fn test_iteration() {
        let mut proxy = proxy();
        let pairs: Vec<(Value, Value)> = proxy.iterate().collect::<Result<_, _>>().unwrap();
        assert_eq!(pairs, vec![(json!(0), json!("a")), (json!(1), json!("b"))]);
    }

    #[test]
    fn test_stringable() {
        assert_eq!(proxy().to_display_string().unwrap(), "[\"a\",\"b\"]");
    }

    #[test]
    fn test_undeclared_capability_refused() {
        // __invoke exists but Invokable was not declared.
        let err = proxy().invoke(&[]).unwrap_err();
        match err {
            StatesError::MethodNotImplemented { method, detail } => {
                assert_eq!(method, "__invoke");
                assert!(detail.contains("invokable"), "{detail}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_capability_without_active_implementation() {
        let mut proxy = proxy();
        proxy.disable_all_states();
        assert!(matches!(
            proxy.count(),
            Err(StatesError::MethodNotImplemented { .. })
        ));
    }

    #[test]
    fn test_iteration_error_yields_once() {
        let mut proxy = proxy();
        proxy.disable_all_states();
        let mut iter = proxy.iterate();
        assert!(matches!(iter.next(), Some(Err(_))));
        assert!(iter.next().is_none());
    }
}
