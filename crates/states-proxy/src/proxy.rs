//! # Proxy
//!
//! The stable identity of a stated object. A [`Proxy`] owns the instance
//! attributes, its own [`StateRegistry`] and [`ActiveStateSet`], and an
//! optional service container. Every method call on the proxy goes through
//! the dispatcher:
//!
//! ```text
//! decompose name ─┬─ Qualified  → named state (need not be active)
//!                 └─ Unqualified → snapshot active list → select state
//!                                         │
//!                       resolve binding on the proxy's identity
//!                                         │
//!                          invoke body with a Binding to self
//! ```
//!
//! ## Cloning
//!
//! Proxies are not `Clone`. [`Proxy::try_clone`] produces a new identity
//! with copied attributes, duplicated descriptors (empty binding caches)
//! and the same active states re-enabled in the same order. Afterwards the
//! two proxies share nothing mutable.
//!
//! ## Automated Classes
//!
//! When the class carries a [`StateUpdater`](crate::StateUpdater), its
//! [`AutoUpdate`] option decides whether attribute writes or external
//! calls recompute the active states first. `Manual` leaves it to
//! [`Proxy::update_states`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::{Map, Value};

use states_core::{
    Arguments, MethodName, ProxyId, ServiceContainer, SharedService, StateName, StatesError,
};
use states_state::{BoundMethod, CallerContext, Scope};

use crate::active::ActiveStateSet;
use crate::binding::{Binding, MethodFn, State};
use crate::class::StatedClass;
use crate::dispatch::{self, CallTarget};
use crate::options::AutoUpdate;
use crate::registry::StateRegistry;
use crate::snapshot::ProxySnapshot;

/// A stated object.
#[derive(Debug)]
pub struct Proxy {
    id: ProxyId,
    class: Arc<StatedClass>,
    attributes: Map<String, Value>,
    registry: StateRegistry,
    active: ActiveStateSet,
    services: Option<Arc<dyn ServiceContainer>>,
}

impl Proxy {
    // ─── Construction ───────────────────────────────────────────────────

    /// Create a proxy of `class` with the class's default state enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if the class has no state
    /// named after its default state.
    pub fn new(class: &Arc<StatedClass>) -> Result<Self, StatesError> {
        let mut proxy = Self::bare(class)?;
        let default_state = class.options().default_state.clone();
        proxy.enable_state(default_state.as_str())?;
        Ok(proxy)
    }

    /// Create a proxy of `class` with exactly `state` enabled.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `state` is not declared.
    pub fn with_state(class: &Arc<StatedClass>, state: &str) -> Result<Self, StatesError> {
        let mut proxy = Self::bare(class)?;
        proxy.switch_state(state)?;
        Ok(proxy)
    }

    /// Create a proxy of `class` holding `attributes`, with `states`
    /// enabled in order (the default state when empty). An `OnWrite`
    /// automated class recomputes its states afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] for an undeclared state and
    /// propagates assertion engine errors.
    pub fn with_attributes(
        class: &Arc<StatedClass>,
        attributes: Map<String, Value>,
        states: &[&str],
    ) -> Result<Self, StatesError> {
        let mut proxy = Self::bare(class)?;
        proxy.attributes = attributes;
        if states.is_empty() {
            let default_state = class.options().default_state.clone();
            proxy.enable_state(default_state.as_str())?;
        } else {
            for state in states {
                proxy.enable_state(state)?;
            }
        }
        proxy.after_write()?;
        Ok(proxy)
    }

    /// Rebuild a proxy from a snapshot taken with [`Proxy::snapshot`].
    ///
    /// The proxy gets a new identity. Active states are restored as
    /// recorded; the assertion engine is not run.
    ///
    /// # Errors
    ///
    /// - [`StatesError::InvalidArgument`] if the snapshot belongs to
    ///   another class.
    /// - [`StatesError::StateNotFound`] for a recorded state the class
    ///   does not declare.
    pub fn restore(class: &Arc<StatedClass>, snapshot: ProxySnapshot) -> Result<Self, StatesError> {
        if snapshot.class != *class.name() {
            return Err(StatesError::invalid_argument(format!(
                "snapshot of {} cannot restore a proxy of {}",
                snapshot.class,
                class.name()
            )));
        }
        let mut proxy = Self::bare(class)?;
        proxy.attributes = snapshot.attributes;
        for state in &snapshot.active_states {
            proxy.enable_state(state.as_str())?;
        }
        tracing::debug!(proxy = %proxy.id, class = %class.name(), "proxy restored from snapshot");
        Ok(proxy)
    }

    fn bare(class: &Arc<StatedClass>) -> Result<Self, StatesError> {
        let mut registry = StateRegistry::new(class.name().clone());
        for state in class.instantiate_states() {
            registry.register(state)?;
        }
        Ok(Self {
            id: ProxyId::new(),
            class: Arc::clone(class),
            attributes: Map::new(),
            registry,
            active: ActiveStateSet::new(),
            services: None,
        })
    }

    /// Attach a service container.
    pub fn with_services(mut self, services: Arc<dyn ServiceContainer>) -> Self {
        self.services = Some(services);
        self
    }

    /// Duplicate the proxy under a new identity.
    ///
    /// # Errors
    ///
    /// Fails only if a duplicated state cannot be re-registered or
    /// re-enabled, which would mean the source proxy was inconsistent.
    pub fn try_clone(&self) -> Result<Self, StatesError> {
        let mut registry = StateRegistry::new(self.class.name().clone());
        for state in self.registry.iter() {
            registry.register(state.duplicate())?;
        }
        let mut clone = Self {
            id: ProxyId::new(),
            class: Arc::clone(&self.class),
            attributes: self.attributes.clone(),
            registry,
            active: ActiveStateSet::new(),
            services: self.services.clone(),
        };
        for state in self.active.list_active() {
            clone.active.enable(state.as_str(), &clone.registry)?;
        }
        tracing::debug!(source = %self.id, clone = %clone.id, "proxy cloned");
        Ok(clone)
    }

    /// Capture attributes and active states.
    pub fn snapshot(&self) -> ProxySnapshot {
        ProxySnapshot {
            class: self.class.name().clone(),
            attributes: self.attributes.clone(),
            active_states: self.active.list_active().to_vec(),
        }
    }

    // ─── Identity ───────────────────────────────────────────────────────

    /// The proxy identity.
    pub fn id(&self) -> ProxyId {
        self.id
    }

    /// The stated class.
    pub fn class(&self) -> &Arc<StatedClass> {
        &self.class
    }

    /// The state registry.
    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    /// A registered state.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn state(&self, name: &str) -> Result<&State, StatesError> {
        self.registry.get(name)
    }

    // ─── Attributes ─────────────────────────────────────────────────────

    /// Read an attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Every attribute.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Whether an attribute is set.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Write an attribute, returning the previous value.
    ///
    /// # Errors
    ///
    /// Propagates assertion engine errors under [`AutoUpdate::OnWrite`].
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, StatesError> {
        let previous = self.attributes.insert(name.to_string(), value.into());
        self.after_write()?;
        Ok(previous)
    }

    /// Remove an attribute, returning its value.
    ///
    /// # Errors
    ///
    /// Propagates assertion engine errors under [`AutoUpdate::OnWrite`].
    pub fn remove_attribute(&mut self, name: &str) -> Result<Option<Value>, StatesError> {
        let previous = self.attributes.remove(name);
        self.after_write()?;
        Ok(previous)
    }

    fn after_write(&mut self) -> Result<(), StatesError> {
        if self.class.options().auto_update == AutoUpdate::OnWrite {
            self.update_states()?;
        }
        Ok(())
    }

    // ─── Services ───────────────────────────────────────────────────────

    /// The attached service container.
    pub fn services(&self) -> Option<&Arc<dyn ServiceContainer>> {
        self.services.as_ref()
    }

    /// Look up a service.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::ServiceNotFound`] if no container is attached
    /// or the key is unknown.
    pub fn service(&self, name: &str) -> Result<SharedService, StatesError> {
        match &self.services {
            Some(services) => services.get(name),
            None => Err(StatesError::ServiceNotFound(name.to_string())),
        }
    }

    // ─── State lifecycle ────────────────────────────────────────────────

    /// Register a state on this proxy only, replacing a state of the same
    /// name. A replaced state that was active stays active.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::IllegalName`] if the name collides with a
    /// registered name under `Of` decomposition.
    pub fn register_state(&mut self, state: State) -> Result<(), StatesError> {
        let state = if state.declared_in().is_none() {
            state.with_declaring_class(self.class.name().clone())
        } else {
            state
        };
        let name = state.name().clone();
        self.registry.register(state)?;
        tracing::debug!(proxy = %self.id, state = %name, "state registered");
        Ok(())
    }

    /// Remove a state from this proxy, deactivating it first.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn unregister_state(&mut self, name: &str) -> Result<(), StatesError> {
        self.registry.unregister(name)?;
        self.active.disable(name);
        tracing::debug!(proxy = %self.id, state = name, "state unregistered");
        Ok(())
    }

    /// Activate a state; already active is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered.
    pub fn enable_state(&mut self, name: &str) -> Result<(), StatesError> {
        if self.active.enable(name, &self.registry)? {
            tracing::debug!(proxy = %self.id, state = name, "state enabled");
        }
        Ok(())
    }

    /// Deactivate a state; inactive or unknown is a no-op.
    pub fn disable_state(&mut self, name: &str) {
        if self.active.disable(name) {
            tracing::debug!(proxy = %self.id, state = name, "state disabled");
        }
    }

    /// Deactivate every state.
    pub fn disable_all_states(&mut self) {
        let count = self.active.disable_all();
        tracing::debug!(proxy = %self.id, count, "all states disabled");
    }

    /// Make `name` the only active state.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::StateNotFound`] if `name` is not registered;
    /// the active states are then left unchanged.
    pub fn switch_state(&mut self, name: &str) -> Result<(), StatesError> {
        self.active.switch(name, &self.registry)?;
        tracing::debug!(proxy = %self.id, state = name, "switched state");
        Ok(())
    }

    /// Active states in enable order.
    pub fn list_enabled_states(&self) -> &[StateName] {
        self.active.list_active()
    }

    /// Registered states, sorted.
    pub fn list_available_states(&self) -> BTreeSet<StateName> {
        self.registry.names()
    }

    /// Declared method names of every registered state.
    pub fn list_methods_by_state(&self) -> BTreeMap<StateName, Vec<MethodName>> {
        self.registry
            .iter()
            .map(|state| {
                let methods = state.method_names().into_iter().cloned().collect();
                (state.name().clone(), methods)
            })
            .collect()
    }

    fn is_active(&self, name: &str) -> bool {
        self.active.list_active().iter().any(|active| {
            self.registry
                .get(active.as_str())
                .map_or(active == name, |state| state.answers_to(name))
        })
    }

    /// Whether any of `names` (or all of them, with `all_required`) is
    /// active. A state also counts as any of its aliases. Always false for
    /// an empty list.
    pub fn is_in_state(&self, names: &[&str], all_required: bool) -> bool {
        if names.is_empty() {
            return false;
        }
        if all_required {
            names.iter().all(|name| self.is_active(name))
        } else {
            names.iter().any(|name| self.is_active(name))
        }
    }

    /// Whether any of `names` (or all of them, with `all_forbidden`) is
    /// inactive. Always false for an empty list.
    pub fn is_not_in_state(&self, names: &[&str], all_forbidden: bool) -> bool {
        if names.is_empty() {
            return false;
        }
        if all_forbidden {
            names.iter().all(|name| !self.is_active(name))
        } else {
            names.iter().any(|name| !self.is_active(name))
        }
    }

    /// Run `f` if [`is_in_state`](Self::is_in_state) holds. Returns whether
    /// it ran.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f`.
    pub fn when_in_state<F>(
        &mut self,
        names: &[&str],
        all_required: bool,
        f: F,
    ) -> Result<bool, StatesError>
    where
        F: FnOnce(&mut Proxy) -> Result<(), StatesError>,
    {
        if !self.is_in_state(names, all_required) {
            return Ok(false);
        }
        f(self)?;
        Ok(true)
    }

    /// Run `f` if [`is_not_in_state`](Self::is_not_in_state) holds.
    /// Returns whether it ran.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f`.
    pub fn when_not_in_state<F>(
        &mut self,
        names: &[&str],
        all_forbidden: bool,
        f: F,
    ) -> Result<bool, StatesError>
    where
        F: FnOnce(&mut Proxy) -> Result<(), StatesError>,
    {
        if !self.is_not_in_state(names, all_forbidden) {
            return Ok(false);
        }
        f(self)?;
        Ok(true)
    }

    /// Recompute the active states with the class's assertion engine. A
    /// class without one is left untouched.
    ///
    /// # Errors
    ///
    /// Propagates assertion engine errors.
    pub fn update_states(&mut self) -> Result<(), StatesError> {
        let Some(updater) = self.class.updater().cloned() else {
            return Ok(());
        };
        updater.update_states(self)?;
        tracing::debug!(
            proxy = %self.id,
            active = ?self.active.list_active(),
            "states updated by assertions"
        );
        Ok(())
    }

    // ─── Dispatch ───────────────────────────────────────────────────────

    /// Call `method` as external code: public methods only.
    ///
    /// # Errors
    ///
    /// - [`StatesError::MethodNotImplemented`] if no active state offers a
    ///   reachable implementation.
    /// - [`StatesError::StateNotFound`] never for unqualified names;
    ///   qualified names only resolve against registered states.
    /// - [`StatesError::AvailableSeveralMethodImplementations`] under
    ///   strict resolution.
    /// - Anything the method body returns.
    pub fn call(&mut self, method: &str, args: &Arguments) -> Result<Value, StatesError> {
        self.call_from(&CallerContext::External, method, args)
    }

    /// Call `method` on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// Same as [`Proxy::call`].
    pub fn call_from(
        &mut self,
        caller: &CallerContext,
        method: &str,
        args: &Arguments,
    ) -> Result<Value, StatesError> {
        if self.class.options().auto_update == AutoUpdate::BeforeCall {
            self.update_states()?;
        }
        let scope = self.class.scope_for(caller);
        self.dispatch(scope, method, args)
    }

    /// Call `method` from `state` explicitly, active or not, as external
    /// code.
    ///
    /// # Errors
    ///
    /// - [`StatesError::StateNotFound`] if `state` is not registered.
    /// - [`StatesError::MethodNotImplemented`] if `state` does not offer
    ///   a reachable `method`.
    pub fn call_in_state(
        &mut self,
        state: &str,
        method: &str,
        args: &Arguments,
    ) -> Result<Value, StatesError> {
        let bound = self.bind(state, method, &Scope::public())?;
        self.invoke(bound, args)
    }

    /// Call a static method of a registered state.
    ///
    /// # Errors
    ///
    /// - [`StatesError::StateNotFound`] if `state` is not registered.
    /// - [`StatesError::MethodNotImplemented`] if `method` is not a static
    ///   method of `state`.
    pub fn call_static(
        &self,
        state: &str,
        method: &str,
        args: &Arguments,
    ) -> Result<Value, StatesError> {
        self.registry.get(state)?.invoke_static(method, args)
    }

    pub(crate) fn dispatch(
        &mut self,
        scope: Scope,
        called: &str,
        args: &Arguments,
    ) -> Result<Value, StatesError> {
        let bound = match dispatch::decompose(called, &self.registry) {
            CallTarget::Qualified { method, state } => {
                tracing::trace!(proxy = %self.id, method, state, "qualified call");
                self.bind(state, method, &scope)?
            }
            CallTarget::Unqualified(method) => {
                let active = self.active.list_active().to_vec();
                let state = dispatch::select_state(
                    &self.registry,
                    &active,
                    method,
                    &scope,
                    self.class.options().resolution,
                )?;
                self.bind(state.as_str(), method, &scope)?
            }
        };
        self.invoke(bound, args)
    }

    fn bind(
        &mut self,
        state: &str,
        method: &str,
        scope: &Scope,
    ) -> Result<BoundMethod<MethodFn>, StatesError> {
        let id = self.id;
        self.registry.get_mut(state)?.resolve(method, id, scope)
    }

    fn invoke(
        &mut self,
        bound: BoundMethod<MethodFn>,
        args: &Arguments,
    ) -> Result<Value, StatesError> {
        let origin = self
            .registry
            .get(bound.state.as_str())
            .ok()
            .and_then(|state| state.declared_in().cloned())
            .unwrap_or_else(|| self.class.name().clone());
        tracing::trace!(proxy = %self.id, state = %bound.state, method = %bound.method, "invoking");
        let BoundMethod {
            state,
            method,
            implementation,
            ..
        } = bound;
        let mut binding = Binding::new(self, state, method, origin);
        implementation(&mut binding, args)
    }
}
