//! # Assertion Engine
//!
//! [`AssertionEngine`] recomputes the active states of a proxy from its
//! attributes: it disables every state, then checks each assertion in
//! declaration order. Assertions are independent; one assertion never
//! disables what an earlier one enabled in the same pass, so the result
//! depends only on the attributes and running it twice gives the same
//! active set.
//!
//! The engine implements [`StateUpdater`], which is how a stated class
//! carries it:
//!
//! ```
//! use states_automated::{AssertionEngine, IsEqual, PropertyAssertion};
//! use states_proxy::{Proxy, State, StatedClass};
//!
//! let engine = AssertionEngine::new().with(
//!     PropertyAssertion::new(["State1"])
//!         .unwrap()
//!         .with("foo", IsEqual::new("bar"))
//!         .unwrap(),
//! );
//! let class = StatedClass::builder("Sample")
//!     .state(State::builder("StateDefault").build().unwrap())
//!     .state(State::builder("State1").build().unwrap())
//!     .automated(engine)
//!     .build()
//!     .unwrap();
//!
//! let mut proxy = Proxy::new(&class).unwrap();
//! proxy.set_attribute("foo", "bar").unwrap();
//! proxy.update_states().unwrap();
//! assert_eq!(proxy.list_enabled_states(), ["State1"]);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use states_core::{PropertyName, StateName, StatesError, Value};
use states_proxy::{Proxy, StateUpdater};

use crate::assertion::{Assertion, CheckedAssertion};
use crate::constraints_set::ConstraintsSet;

/// An ordered list of assertions driving a proxy's active states.
#[derive(Debug, Clone, Default)]
pub struct AssertionEngine {
    assertions: Vec<Arc<dyn Assertion>>,
}

impl AssertionEngine {
    /// An engine without assertions; running it disables every state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an assertion.
    pub fn with(mut self, assertion: impl Assertion + 'static) -> Self {
        self.assertions.push(Arc::new(assertion));
        self
    }

    /// Declared assertions, in order.
    pub fn assertions(&self) -> &[Arc<dyn Assertion>] {
        &self.assertions
    }

    /// Disable every state of `proxy`, then check each assertion in order.
    ///
    /// # Errors
    ///
    /// Stops at and propagates the first assertion error. States enabled by
    /// earlier assertions in the pass stay enabled.
    pub fn run(&self, proxy: &mut Proxy) -> Result<Vec<CheckedAssertion>, StatesError> {
        proxy.disable_all_states();
        let mut results = Vec::with_capacity(self.assertions.len());
        for assertion in &self.assertions {
            results.push(assertion.check(proxy)?);
        }
        tracing::debug!(
            proxy = %proxy.id(),
            checked = results.len(),
            valid = results.iter().filter(|r| r.valid).count(),
            "assertions checked"
        );
        Ok(results)
    }
}

impl StateUpdater for AssertionEngine {
    fn update_states(&self, proxy: &mut Proxy) -> Result<(), StatesError> {
        self.run(proxy).map(|_| ())
    }

    fn declared_states(&self) -> Vec<StateName> {
        let states: BTreeSet<StateName> = self
            .assertions
            .iter()
            .flat_map(|assertion| assertion.states().iter().cloned())
            .collect();
        states.into_iter().collect()
    }
}

/// Property checks on automated proxies.
pub trait Automated {
    /// Whether attribute `property` satisfies every constraint of
    /// `constraints`. A missing attribute reads as `null`.
    ///
    /// # Errors
    ///
    /// [`StatesError::IllegalName`] for an invalid property name, and any
    /// constraint error.
    fn check_property(
        &self,
        property: &str,
        constraints: &ConstraintsSet,
    ) -> Result<bool, StatesError>;
}

impl Automated for Proxy {
    fn check_property(
        &self,
        property: &str,
        constraints: &ConstraintsSet,
    ) -> Result<bool, StatesError> {
        let property = PropertyName::new(property)?;
        let value = self.attribute(property.as_str()).unwrap_or(&Value::Null);
        constraints.is_valid(value)
    }
}
