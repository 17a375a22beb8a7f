//! # Assertions
//!
//! An [`Assertion`] maps a predicate over a proxy to the states it turns
//! on. Assertions are immutable declarations: [`Assertion::check`] reads
//! the proxy, enables the states when the predicate holds, and reports the
//! outcome as a separate [`CheckedAssertion`] value. The declaration itself
//! never records which proxy it last saw, so one list serves every proxy of
//! a class.
//!
//! - [`PropertyAssertion`]: every (attribute, constraint set) pair holds.
//! - [`CallbackAssertion`]: a closure over the proxy returns `true`.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use states_core::{PropertyName, ProxyId, StateName, StatesError, Value};
use states_proxy::Proxy;

use crate::constraint::Constraint;
use crate::constraints_set::ConstraintsSet;

/// A declarative rule turning on states.
pub trait Assertion: Send + Sync + fmt::Debug {
    /// States enabled when the assertion holds.
    fn states(&self) -> &[StateName];

    /// Whether the assertion holds for `proxy`.
    ///
    /// # Errors
    ///
    /// Propagates constraint and callback errors.
    fn evaluate(&self, proxy: &Proxy) -> Result<bool, StatesError>;

    /// Evaluate against `proxy` and enable [`states`](Self::states) when it
    /// holds.
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors, and `StateNotFound` for a state the
    /// proxy does not have.
    fn check(&self, proxy: &mut Proxy) -> Result<CheckedAssertion, StatesError> {
        let valid = self.evaluate(proxy)?;
        if valid {
            for state in self.states() {
                proxy.enable_state(state.as_str())?;
            }
        }
        Ok(CheckedAssertion {
            states: self.states().to_vec(),
            proxy: proxy.id(),
            valid,
        })
    }
}

/// Outcome of one [`Assertion::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckedAssertion {
    /// States the assertion governs.
    pub states: Vec<StateName>,
    /// Proxy the assertion was checked against.
    pub proxy: ProxyId,
    /// Whether it held (and the states were enabled).
    pub valid: bool,
}

fn state_names<I, S>(states: I) -> Result<Vec<StateName>, StatesError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let states = states
        .into_iter()
        .map(StateName::new)
        .collect::<Result<Vec<_>, _>>()?;
    if states.is_empty() {
        return Err(StatesError::invalid_argument(
            "an assertion must govern at least one state",
        ));
    }
    Ok(states)
}

// ---------------------------------------------------------------------------
// Property
// ---------------------------------------------------------------------------

/// Holds when every declared attribute check holds.
///
/// ```
/// use states_automated::{IsEqual, IsNull, PropertyAssertion};
///
/// let assertion = PropertyAssertion::new(["State2"])
///     .unwrap()
///     .with("foo1", IsEqual::new("bar1"))
///     .unwrap()
///     .with("foo2", IsNull)
///     .unwrap();
/// assert_eq!(assertion.checks().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct PropertyAssertion {
    states: Vec<StateName>,
    checks: Vec<(PropertyName, ConstraintsSet)>,
}

impl PropertyAssertion {
    /// Govern `states`.
    ///
    /// # Errors
    ///
    /// [`StatesError::IllegalName`] for an invalid state name and
    /// [`StatesError::InvalidArgument`] for an empty list.
    pub fn new<I, S>(states: I) -> Result<Self, StatesError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            states: state_names(states)?,
            checks: Vec::new(),
        })
    }

    /// A copy with one more check: `property` satisfies `constraint`.
    ///
    /// # Errors
    ///
    /// [`StatesError::IllegalName`] for an invalid property name.
    pub fn with(
        &self,
        property: &str,
        constraint: impl Constraint + 'static,
    ) -> Result<Self, StatesError> {
        self.with_set(property, ConstraintsSet::new().with(constraint))
    }

    /// A copy with one more check: `property` satisfies every constraint
    /// of `constraints`.
    ///
    /// # Errors
    ///
    /// [`StatesError::IllegalName`] for an invalid property name.
    pub fn with_set(&self, property: &str, constraints: ConstraintsSet) -> Result<Self, StatesError> {
        let property = PropertyName::new(property)?;
        let mut checks = self.checks.clone();
        checks.push((property, constraints));
        Ok(Self {
            states: self.states.clone(),
            checks,
        })
    }

    /// Declared checks, in order.
    pub fn checks(&self) -> &[(PropertyName, ConstraintsSet)] {
        &self.checks
    }
}

impl Assertion for PropertyAssertion {
    fn states(&self) -> &[StateName] {
        &self.states
    }

    fn evaluate(&self, proxy: &Proxy) -> Result<bool, StatesError> {
        for (property, constraints) in &self.checks {
            let value = proxy
                .attribute(property.as_str())
                .unwrap_or(&Value::Null);
            if !constraints.is_valid(value)? {
                tracing::trace!(
                    proxy = %proxy.id(),
                    property = %property,
                    "property assertion failed"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

type ProxyPredicate = dyn Fn(&Proxy) -> Result<bool, StatesError> + Send + Sync;

/// Holds when a closure over the proxy returns `true`. Errors from the
/// closure propagate to whoever ran the check.
#[derive(Clone)]
pub struct CallbackAssertion {
    states: Vec<StateName>,
    predicate: Arc<ProxyPredicate>,
}

impl fmt::Debug for CallbackAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackAssertion")
            .field("states", &self.states)
            .finish_non_exhaustive()
    }
}

impl CallbackAssertion {
    /// Govern `states` with `predicate`.
    ///
    /// # Errors
    ///
    /// [`StatesError::IllegalName`] for an invalid state name and
    /// [`StatesError::InvalidArgument`] for an empty list.
    pub fn new<I, S, F>(states: I, predicate: F) -> Result<Self, StatesError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Proxy) -> Result<bool, StatesError> + Send + Sync + 'static,
    {
        Ok(Self {
            states: state_names(states)?,
            predicate: Arc::new(predicate),
        })
    }
}

impl Assertion for CallbackAssertion {
    fn states(&self) -> &[StateName] {
        &self.states
    }

    fn evaluate(&self, proxy: &Proxy) -> Result<bool, StatesError> {
        (self.predicate)(proxy)
    }
}
