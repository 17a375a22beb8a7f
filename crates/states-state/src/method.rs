//! # Method Entries
//!
//! A state's method table maps each [`MethodName`] to a
//! [`MethodDescriptor`] (metadata used for access decisions) and a
//! [`MethodBody`] (the code). Instance bodies are shared `Arc<M>` values:
//! the code is immutable, so a cloned proxy may share it while holding its
//! own bindings.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use states_core::{Arguments, MethodName, ProxyId, StateName, StatesError, Value};

use crate::visibility::Visibility;

/// Signature of a static state method. Static methods have no `self`.
pub type StaticFn = dyn Fn(&Arguments) -> Result<Value, StatesError> + Send + Sync;

/// Metadata of one declared method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    /// The method name.
    pub name: MethodName,
    /// Who may call it.
    pub visibility: Visibility,
    /// Static methods belong to the state, not to a proxy instance.
    pub is_static: bool,
}

/// The code behind a declared method.
pub enum MethodBody<M: ?Sized> {
    /// Executed bound to a proxy.
    Instance(Arc<M>),
    /// Executed without a proxy; never reachable through dispatch.
    Static(Arc<StaticFn>),
}

impl<M: ?Sized> MethodBody<M> {
    /// Whether this is a static body.
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

impl<M: ?Sized> Clone for MethodBody<M> {
    fn clone(&self) -> Self {
        match self {
            Self::Instance(f) => Self::Instance(Arc::clone(f)),
            Self::Static(f) => Self::Static(Arc::clone(f)),
        }
    }
}

impl<M: ?Sized> fmt::Debug for MethodBody<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(_) => f.write_str("Instance(..)"),
            Self::Static(_) => f.write_str("Static(..)"),
        }
    }
}

/// A method implementation bound to one proxy identity.
///
/// Produced by [`StateDescriptor::resolve`](crate::StateDescriptor::resolve)
/// and cached per method name for as long as the target does not change.
pub struct BoundMethod<M: ?Sized> {
    /// State the implementation comes from.
    pub state: StateName,
    /// Method name within that state.
    pub method: MethodName,
    /// Proxy the implementation is bound to.
    pub target: ProxyId,
    /// The implementation itself.
    pub implementation: Arc<M>,
}

impl<M: ?Sized> Clone for BoundMethod<M> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            method: self.method.clone(),
            target: self.target,
            implementation: Arc::clone(&self.implementation),
        }
    }
}

impl<M: ?Sized> fmt::Debug for BoundMethod<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("state", &self.state)
            .field("method", &self.method)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
