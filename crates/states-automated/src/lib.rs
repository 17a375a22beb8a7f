//! # states-automated — Assertion Engine
//!
//! Automated stated classes derive their active states from their data.
//! Each [`Assertion`] pairs a predicate over the proxy with the states it
//! enables; the [`AssertionEngine`] disables everything and re-checks the
//! assertions in order.
//!
//! ## Architecture
//!
//! - **Constraints** (`constraint.rs`): predicates over one attribute
//!   value: equality, null, emptiness, ordering, kind and closures.
//! - **Constraint sets** (`constraints_set.rs`): immutable conjunctions.
//! - **Assertions** (`assertion.rs`): property and callback assertions.
//! - **Engine** (`engine.rs`): the [`StateUpdater`](states_proxy::StateUpdater)
//!   attached to a class, and the [`Automated`] property check.
//!
//! ## Crate Policy
//!
//! - Depends on `states-core` and `states-proxy` internally.
//! - Assertions and constraints are immutable after construction and
//!   shared through `Arc` by every proxy of a class.

pub mod assertion;
pub mod constraint;
pub mod constraints_set;
pub mod engine;

pub use assertion::{Assertion, CallbackAssertion, CheckedAssertion, PropertyAssertion};
pub use constraint::{
    is_empty_value, Callback, Constraint, IsEmpty, IsEqual, IsGreaterThan, IsKind, IsLessThan,
    IsNotEmpty, IsNotEqual, IsNotNull, IsNull, ValueKind,
};
pub use constraints_set::ConstraintsSet;
pub use engine::{AssertionEngine, Automated};
