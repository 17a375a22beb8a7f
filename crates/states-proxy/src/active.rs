//! # Active State Set
//!
//! The ordered set of enabled state names of one proxy. Order is enable
//! order and drives first-match dispatch. A name appears at most once;
//! re-enabling an active state keeps its original position.

use states_core::{StateName, StatesError};

use crate::registry::StateRegistry;

/// Enabled states of one proxy, in enable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveStateSet {
    order: Vec<StateName>,
}

impl ActiveStateSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate `name`. Returns whether the set changed.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn enable(&mut self, name: &str, registry: &StateRegistry) -> Result<bool, StatesError> {
        let state = registry.get(name)?;
        if self.contains(name) {
            return Ok(false);
        }
        self.order.push(state.name().clone());
        Ok(true)
    }

    /// Deactivate `name`. Returns whether the set changed; disabling an
    /// inactive or unknown state is a no-op.
    pub fn disable(&mut self, name: &str) -> bool {
        match self.order.iter().position(|active| active == name) {
            Some(index) => {
                self.order.remove(index);
                true
            }
            None => false,
        }
    }

    /// Deactivate everything. Returns how many states were active.
    pub fn disable_all(&mut self) -> usize {
        let count = self.order.len();
        self.order.clear();
        count
    }

    /// Replace the set with exactly `name`. Validated before anything is
    /// cleared, so a failed switch leaves the set untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn switch(&mut self, name: &str, registry: &StateRegistry) -> Result<(), StatesError> {
        let state = registry.get(name)?.name().clone();
        self.order.clear();
        self.order.push(state);
        Ok(())
    }

    /// Active names in enable order.
    pub fn list_active(&self) -> &[StateName] {
        &self.order
    }

    /// Whether `name` is active.
    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|active| active == name)
    }

    /// Number of active states.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no state is active.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
