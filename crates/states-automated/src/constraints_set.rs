//! # Constraint Sets
//!
//! An ordered, immutable conjunction of [`Constraint`]s. [`ConstraintsSet::with`]
//! returns a new set, so one declared set can be shared by every proxy of
//! a class.

use std::sync::Arc;

use states_core::{StatesError, Value};

use crate::constraint::Constraint;

/// Constraints that must all hold, evaluated in order.
#[derive(Debug, Clone, Default)]
pub struct ConstraintsSet {
    constraints: Vec<Arc<dyn Constraint>>,
}

impl ConstraintsSet {
    /// An empty set; it accepts every value.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this set with `constraint` appended.
    pub fn with(&self, constraint: impl Constraint + 'static) -> Self {
        let mut constraints = self.constraints.clone();
        constraints.push(Arc::new(constraint));
        Self { constraints }
    }

    /// Whether every constraint accepts `value`. Stops at the first one
    /// that does not.
    ///
    /// # Errors
    ///
    /// Propagates the first constraint error.
    pub fn is_valid(&self, value: &Value) -> Result<bool, StatesError> {
        for constraint in &self.constraints {
            if !constraint.is_valid(value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set holds no constraint.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
