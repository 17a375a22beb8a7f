//! # Method Binding
//!
//! State methods never receive the state object as `self`. They receive a
//! [`Binding`]: a mutable view of the proxy they were resolved for, tagged
//! with the state the method comes from and the stated class that declared
//! it. Attribute reads and writes therefore hit the proxy, and nested calls
//! made through [`Binding::call`] run with an internal scope, which is what
//! makes protected and private state methods reachable from cooperating
//! state code while staying hidden from external callers.
//!
//! ## Reentrancy
//!
//! A bound method may enable, disable or switch states on its own proxy
//! while the call that resolved it is still running. The dispatcher
//! resolves against a snapshot of the active list, so this is safe.

use std::sync::Arc;

use states_core::{
    Arguments, MethodName, ProxyId, SharedService, StateName, StatedClassName, StatesError, Value,
};
use states_state::{Scope, StateBuilder, StateDescriptor, Visibility};

use crate::proxy::Proxy;

/// Signature of an instance state method.
pub type MethodFn =
    dyn Fn(&mut Binding<'_>, &Arguments) -> Result<Value, StatesError> + Send + Sync;

/// A state whose methods are bound to a [`Proxy`].
pub type State = StateDescriptor<MethodFn>;

/// Builder for [`State`].
pub type StateDefinition = StateBuilder<MethodFn>;

/// Wrap a closure as a state method body.
pub fn method<F>(body: F) -> Arc<MethodFn>
where
    F: Fn(&mut Binding<'_>, &Arguments) -> Result<Value, StatesError> + Send + Sync + 'static,
{
    Arc::new(body)
}

/// Closure-friendly declarations on [`StateDefinition`].
///
/// ```
/// use serde_json::json;
/// use states_proxy::{State, StateDefinitionExt};
///
/// let draft = State::builder("Draft")
///     .public("setTitle", |this, args| {
///         this.set("title", args[0].clone())?;
///         Ok(json!(null))
///     })
///     .build()
///     .unwrap();
/// assert!(draft.implements_method("setTitle"));
/// ```
pub trait StateDefinitionExt: Sized {
    /// Declare a method with the given visibility.
    fn declare<F>(self, name: &str, visibility: Visibility, body: F) -> Self
    where
        F: Fn(&mut Binding<'_>, &Arguments) -> Result<Value, StatesError> + Send + Sync + 'static;

    /// Declare a public method.
    fn public<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&mut Binding<'_>, &Arguments) -> Result<Value, StatesError> + Send + Sync + 'static,
    {
        self.declare(name, Visibility::Public, body)
    }

    /// Declare a protected method.
    fn protected<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&mut Binding<'_>, &Arguments) -> Result<Value, StatesError> + Send + Sync + 'static,
    {
        self.declare(name, Visibility::Protected, body)
    }

    /// Declare a private method.
    fn private<F>(self, name: &str, body: F) -> Self
    where
        F: Fn(&mut Binding<'_>, &Arguments) -> Result<Value, StatesError> + Send + Sync + 'static,
    {
        self.declare(name, Visibility::Private, body)
    }
}

impl StateDefinitionExt for StateDefinition {
    fn declare<F>(self, name: &str, visibility: Visibility, body: F) -> Self
    where
        F: Fn(&mut Binding<'_>, &Arguments) -> Result<Value, StatesError> + Send + Sync + 'static,
    {
        self.method(name, visibility, method(body))
    }
}

/// The `self` of a running state method.
pub struct Binding<'p> {
    proxy: &'p mut Proxy,
    state: StateName,
    method: MethodName,
    origin: StatedClassName,
}

impl std::fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("proxy", &self.proxy.id())
            .field("state", &self.state)
            .field("method", &self.method)
            .field("origin", &self.origin)
            .finish()
    }
}

impl<'p> Binding<'p> {
    pub(crate) fn new(
        proxy: &'p mut Proxy,
        state: StateName,
        method: MethodName,
        origin: StatedClassName,
    ) -> Self {
        Self {
            proxy,
            state,
            method,
            origin,
        }
    }

    /// Identity of the bound proxy.
    pub fn id(&self) -> ProxyId {
        self.proxy.id()
    }

    /// State the running method was resolved from.
    pub fn state(&self) -> &StateName {
        &self.state
    }

    /// Name of the running method.
    pub fn method(&self) -> &MethodName {
        &self.method
    }

    /// Stated class that declared the running method's state.
    pub fn origin(&self) -> &StatedClassName {
        &self.origin
    }

    /// Read access to the whole proxy.
    pub fn proxy(&self) -> &Proxy {
        &*self.proxy
    }

    /// Read an attribute of the proxy.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.proxy.attribute(name)
    }

    /// Read an attribute, `null` when unset.
    pub fn get_or_null(&self, name: &str) -> Value {
        self.proxy.attribute(name).cloned().unwrap_or(Value::Null)
    }

    /// Read a string attribute, empty when unset or not a string.
    pub fn get_str(&self, name: &str) -> &str {
        self.proxy
            .attribute(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Write an attribute of the proxy.
    ///
    /// # Errors
    ///
    /// Propagates assertion engine errors when the class updates its
    /// states on write.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), StatesError> {
        self.proxy.set_attribute(name, value)?;
        Ok(())
    }

    /// Remove an attribute of the proxy.
    ///
    /// # Errors
    ///
    /// Propagates assertion engine errors when the class updates its
    /// states on write.
    pub fn remove(&mut self, name: &str) -> Result<Option<Value>, StatesError> {
        self.proxy.remove_attribute(name)
    }

    /// Call another method on the same proxy with an internal scope.
    ///
    /// Protected and private methods are reachable; private methods of a
    /// state in private mode only if this method's state was declared by
    /// the same class.
    ///
    /// # Errors
    ///
    /// Same as [`Proxy::call`].
    pub fn call(&mut self, method: &str, args: &Arguments) -> Result<Value, StatesError> {
        let scope = Scope::internal(self.origin.clone());
        self.proxy.dispatch(scope, method, args)
    }

    /// Enable a state on the bound proxy.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn enable_state(&mut self, name: &str) -> Result<(), StatesError> {
        self.proxy.enable_state(name)
    }

    /// Disable a state on the bound proxy. Unknown or inactive is a no-op.
    pub fn disable_state(&mut self, name: &str) {
        self.proxy.disable_state(name);
    }

    /// Disable every state on the bound proxy.
    pub fn disable_all_states(&mut self) {
        self.proxy.disable_all_states();
    }

    /// Replace the active states of the bound proxy with `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn switch_state(&mut self, name: &str) -> Result<(), StatesError> {
        self.proxy.switch_state(name)
    }

    /// Whether any (or all) of `names` are active on the bound proxy.
    pub fn is_in_state(&self, names: &[&str], all_required: bool) -> bool {
        self.proxy.is_in_state(names, all_required)
    }

    /// Look up a service from the proxy's container.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::ServiceNotFound`] if the proxy has no
    /// container or the key is unknown.
    pub fn service(&self, name: &str) -> Result<SharedService, StatesError> {
        self.proxy.service(name)
    }
}
