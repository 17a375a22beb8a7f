//! # states-core — Foundational Types for States
//!
//! This crate is the leaf of the States workspace. It defines the
//! vocabulary every other crate speaks: validated identifiers for states,
//! methods, properties and stated classes, the identity of a proxy
//! instance, the dynamic value model used for arguments and attributes,
//! and the single error enum raised by the dispatch engine.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for names.** `StateName`, `MethodName`,
//!    `PropertyName` and `StatedClassName` are validated at construction.
//!    An illegal identifier is rejected with [`StatesError::IllegalName`]
//!    before it can reach a registry.
//!
//! 2. **One error taxonomy.** Every failure the engine can raise is a
//!    variant of [`StatesError`]. Errors raised by state method bodies are
//!    carried in [`StatesError::Custom`] and are never rewrapped.
//!
//! 3. **Dynamic values.** Proxy attributes, call arguments and return
//!    values are `serde_json::Value`, so proxies serialize for free.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `states-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod service;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{StatesError, ValidationError};
pub use identity::{
    MethodName, PropertyName, ProxyId, StateName, StatedClassName, DEFAULT_STATE_NAME,
};
pub use service::{fetch_service, ServiceContainer, Services, SharedService};
pub use value::{argument, bool_argument, string_argument, Arguments, Value};
