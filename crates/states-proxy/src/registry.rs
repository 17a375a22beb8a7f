//! # State Registry
//!
//! The per-proxy map from [`StateName`] to [`State`]. Every proxy owns its
//! registry; two proxies never share descriptor instances, so bindings
//! cached by one never leak into the other.
//!
//! Registration enforces a closed namespace: a name that another
//! registered name could shadow under `<method>Of<State>` decomposition is
//! rejected with [`ValidationError::AmbiguousStateName`].

use std::collections::{BTreeSet, HashMap};

use states_core::{StateName, StatedClassName, StatesError, ValidationError};

use crate::binding::State;

/// Registered states of one proxy.
#[derive(Debug)]
pub struct StateRegistry {
    class: StatedClassName,
    states: HashMap<StateName, State>,
}

impl StateRegistry {
    /// Create an empty registry for a proxy of `class`.
    pub fn new(class: StatedClassName) -> Self {
        Self {
            class,
            states: HashMap::new(),
        }
    }

    /// The stated class reported in lookup errors.
    pub fn class(&self) -> &StatedClassName {
        &self.class
    }

    /// Insert `state` under its own name, replacing (and returning) any
    /// state already registered under that name.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::IllegalName`] if the name collides with a
    /// registered name under `Of` decomposition.
    pub fn register(&mut self, state: State) -> Result<Option<State>, StatesError> {
        if let Some(other) = self
            .states
            .keys()
            .find(|existing| existing.collides_with(state.name()))
        {
            return Err(ValidationError::AmbiguousStateName {
                name: state.name().to_string(),
                other: other.to_string(),
            }
            .into());
        }
        tracing::trace!(class = %self.class, state = %state.name(), "registering state");
        Ok(self.states.insert(state.name().clone(), state))
    }

    /// Remove a state.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn unregister(&mut self, name: &str) -> Result<State, StatesError> {
        self.states
            .remove(name)
            .ok_or_else(|| StatesError::state_not_found(name, &self.class))
    }

    /// Look up a state.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn get(&self, name: &str) -> Result<&State, StatesError> {
        self.states
            .get(name)
            .ok_or_else(|| StatesError::state_not_found(name, &self.class))
    }

    /// Look up a state for binding.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut State, StatesError> {
        let class = &self.class;
        self.states
            .get_mut(name)
            .ok_or_else(|| StatesError::state_not_found(name, class))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> BTreeSet<StateName> {
        self.states.keys().cloned().collect()
    }

    /// Registered states, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    /// Number of registered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no state is registered.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
