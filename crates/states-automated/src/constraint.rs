//! # Constraints
//!
//! A [`Constraint`] is a predicate over one attribute value. A missing
//! attribute is evaluated as `null`.
//!
//! Numbers compare numerically, so `1` equals `1.0`. Ordering constraints
//! accept two numbers or two strings. A `null` value has no order, so an
//! unset attribute never satisfies them. Any other mix of kinds is an
//! `InvalidArgument` error rather than a silent `false`.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use states_core::{StatesError, Value};

/// A predicate over one attribute value.
pub trait Constraint: Send + Sync + fmt::Debug {
    /// Whether `value` satisfies the constraint.
    ///
    /// # Errors
    ///
    /// Implementation specific. The built-in ordering constraints reject
    /// values they cannot compare.
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError>;
}

/// Numeric-aware JSON equality.
fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => left == right,
    }
}

/// `None` when either side is `null`.
fn compare(value: &Value, bound: &Value) -> Result<Option<Ordering>, StatesError> {
    if value.is_null() || bound.is_null() {
        return Ok(None);
    }
    let ordering = match (value, bound) {
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    };
    ordering.map(Some).ok_or_else(|| {
        StatesError::invalid_argument(format!("cannot compare {value} with {bound}"))
    })
}

/// Whether a value counts as empty: `null`, `false`, `0`, `""`, `"0"`, and
/// empty arrays or objects.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

// ---------------------------------------------------------------------------
// Equality
// ---------------------------------------------------------------------------

/// Value equals the expected value.
#[derive(Debug, Clone, PartialEq)]
pub struct IsEqual(pub Value);

impl IsEqual {
    /// Expect `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }
}

impl Constraint for IsEqual {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(loosely_equal(value, &self.0))
    }
}

/// Value differs from the given value.
#[derive(Debug, Clone, PartialEq)]
pub struct IsNotEqual(pub Value);

impl IsNotEqual {
    /// Reject `value`.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }
}

impl Constraint for IsNotEqual {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(!loosely_equal(value, &self.0))
    }
}

/// Value is `null` (or the attribute is missing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsNull;

impl Constraint for IsNull {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(value.is_null())
    }
}

/// Value is set and not `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsNotNull;

impl Constraint for IsNotNull {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(!value.is_null())
    }
}

// ---------------------------------------------------------------------------
// Emptiness
// ---------------------------------------------------------------------------

/// Value is empty, see [`is_empty_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsEmpty;

impl Constraint for IsEmpty {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(is_empty_value(value))
    }
}

/// Value is not empty, see [`is_empty_value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsNotEmpty;

impl Constraint for IsNotEmpty {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(!is_empty_value(value))
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Value is strictly greater than the bound.
#[derive(Debug, Clone, PartialEq)]
pub struct IsGreaterThan(pub Value);

impl IsGreaterThan {
    /// Lower bound, exclusive.
    pub fn new(bound: impl Into<Value>) -> Self {
        Self(bound.into())
    }
}

impl Constraint for IsGreaterThan {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(compare(value, &self.0)? == Some(Ordering::Greater))
    }
}

/// Value is strictly less than the bound.
#[derive(Debug, Clone, PartialEq)]
pub struct IsLessThan(pub Value);

impl IsLessThan {
    /// Upper bound, exclusive.
    pub fn new(bound: impl Into<Value>) -> Self {
        Self(bound.into())
    }
}

impl Constraint for IsLessThan {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(compare(value, &self.0)? == Some(Ordering::Less))
    }
}

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// The JSON kind of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// `null`.
    Null,
    /// `true` / `false`.
    Bool,
    /// Any number.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl ValueKind {
    /// Kind of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

/// Value is of the given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsKind(pub ValueKind);

impl Constraint for IsKind {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        Ok(ValueKind::of(value) == self.0)
    }
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

type Predicate = dyn Fn(&Value) -> Result<bool, StatesError> + Send + Sync;

/// Value satisfies a closure. Errors from the closure propagate.
#[derive(Clone)]
pub struct Callback {
    predicate: Arc<Predicate>,
}

impl Callback {
    /// Wrap `predicate`.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, StatesError> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

impl Constraint for Callback {
    fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        (self.predicate)(value)
    }
}
