//! # State Descriptor
//!
//! One state's implementation unit: a name, optional aliases, and a method
//! table that is fixed once [`StateBuilder::build`] returns. Methods cannot
//! be added to a built descriptor.
//!
//! ## Resolution
//!
//! [`StateDescriptor::resolve`] turns a method name into a
//! [`BoundMethod`] bound to a proxy identity. The binding is cached per
//! method name; a cached binding for another proxy is replaced, never
//! reused. [`StateDescriptor::duplicate`] copies the descriptor with an
//! empty cache, which is how cloned proxies get independent states.
//!
//! ## Access Rules
//!
//! - Only public methods are reachable from an external [`Scope`].
//! - Protected and private methods need an internal scope (see
//!   [`Scope::reaches`]).
//! - Static methods are never reachable through resolution; they are
//!   called directly with [`StateDescriptor::invoke_static`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use states_core::{
    Arguments, MethodName, ProxyId, StateName, StatedClassName, StatesError, Value,
};

use crate::method::{BoundMethod, MethodBody, MethodDescriptor, StaticFn};
use crate::visibility::{Scope, Visibility};

/// Outcome of an access check for one method in one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The state does not declare the method.
    Missing,
    /// The method is static and cannot be dispatched.
    Static,
    /// The method exists but the scope does not reach it.
    Hidden(Visibility),
    /// The method can be resolved.
    Granted,
}

struct MethodEntry<M: ?Sized> {
    descriptor: MethodDescriptor,
    body: MethodBody<M>,
}

impl<M: ?Sized> Clone for MethodEntry<M> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            body: self.body.clone(),
        }
    }
}

/// A state: a named, fixed method table plus per-proxy bindings.
pub struct StateDescriptor<M: ?Sized> {
    name: StateName,
    aliases: Vec<StateName>,
    declared_in: Option<StatedClassName>,
    private_mode: bool,
    methods: HashMap<MethodName, MethodEntry<M>>,
    bindings: HashMap<MethodName, BoundMethod<M>>,
}

impl<M: ?Sized> fmt::Debug for StateDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("declared_in", &self.declared_in)
            .field("private_mode", &self.private_mode)
            .field("methods", &self.method_names())
            .finish_non_exhaustive()
    }
}

impl<M: ?Sized> StateDescriptor<M> {
    /// Start building a state named `name`.
    pub fn builder(name: impl Into<String>) -> StateBuilder<M> {
        StateBuilder {
            name: name.into(),
            aliases: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The state name.
    pub fn name(&self) -> &StateName {
        &self.name
    }

    /// Names of the states this one specialises.
    pub fn aliases(&self) -> &[StateName] {
        &self.aliases
    }

    /// Whether `name` is this state's name or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|alias| alias == name)
    }

    /// The stated class that declared this state, once attached.
    pub fn declared_in(&self) -> Option<&StatedClassName> {
        self.declared_in.as_ref()
    }

    /// Attach the state to the stated class that declares it.
    pub fn with_declaring_class(mut self, class: StatedClassName) -> Self {
        self.declared_in = Some(class);
        self
    }

    /// Whether private methods are restricted to the declaring class.
    pub fn is_private_mode(&self) -> bool {
        self.private_mode
    }

    /// Switch private mode. Set on states a child class inherits.
    pub fn set_private_mode(&mut self, enabled: bool) {
        self.private_mode = enabled;
    }

    /// Whether the state declares `name` (exact, case-sensitive match).
    pub fn implements_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Metadata of a declared method.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::MethodNotImplemented`] if the state does not
    /// declare `name`.
    pub fn describe_method(&self, name: &str) -> Result<&MethodDescriptor, StatesError> {
        self.methods
            .get(name)
            .map(|entry| &entry.descriptor)
            .ok_or_else(|| self.missing(name))
    }

    /// Declared method names, sorted.
    pub fn method_names(&self) -> Vec<&MethodName> {
        let mut names: Vec<&MethodName> = self.methods.keys().collect();
        names.sort();
        names
    }

    /// Metadata of every declared method, sorted by name.
    pub fn methods(&self) -> Vec<&MethodDescriptor> {
        let mut methods: Vec<&MethodDescriptor> =
            self.methods.values().map(|entry| &entry.descriptor).collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name));
        methods
    }

    /// Decide whether `scope` may resolve `name` in this state.
    pub fn access(&self, name: &str, scope: &Scope) -> Access {
        let Some(entry) = self.methods.get(name) else {
            return Access::Missing;
        };
        if entry.body.is_static() {
            return Access::Static;
        }
        let visibility = entry.descriptor.visibility;
        if scope.reaches(visibility, self.declared_in.as_ref(), self.private_mode) {
            Access::Granted
        } else {
            Access::Hidden(visibility)
        }
    }

    /// Resolve `name` to an implementation bound to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::MethodNotImplemented`] if the method is not
    /// declared, is static, or is not reachable from `scope`.
    pub fn resolve(
        &mut self,
        name: &str,
        target: ProxyId,
        scope: &Scope,
    ) -> Result<BoundMethod<M>, StatesError> {
        match self.access(name, scope) {
            Access::Granted => {}
            Access::Missing => return Err(self.missing(name)),
            Access::Static => {
                return Err(StatesError::method_not_implemented(
                    name,
                    format!(
                        "{name} is static in state {} and cannot be called on an instance",
                        self.name
                    ),
                ))
            }
            Access::Hidden(visibility) => {
                return Err(StatesError::method_not_implemented(
                    name,
                    format!(
                        "{name} is {visibility} in state {} and not reachable from this scope",
                        self.name
                    ),
                ))
            }
        }

        if let Some(bound) = self.bindings.get(name) {
            if bound.target == target {
                return Ok(bound.clone());
            }
        }

        let (method, implementation) = match self.methods.get_key_value(name) {
            Some((method, MethodEntry {
                body: MethodBody::Instance(f),
                ..
            })) => (method.clone(), Arc::clone(f)),
            _ => return Err(self.missing(name)),
        };

        tracing::trace!(state = %self.name, method = %method, proxy = %target, "binding state method");
        let bound = BoundMethod {
            state: self.name.clone(),
            method: method.clone(),
            target,
            implementation,
        };
        self.bindings.insert(method, bound.clone());
        Ok(bound)
    }

    /// Call a static method directly on the state.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::MethodNotImplemented`] if `name` is not a
    /// static method of this state. Errors raised by the body propagate
    /// unchanged.
    pub fn invoke_static(&self, name: &str, args: &Arguments) -> Result<Value, StatesError> {
        match self.methods.get(name).map(|entry| &entry.body) {
            Some(MethodBody::Static(f)) => f(args),
            Some(MethodBody::Instance(_)) => Err(StatesError::method_not_implemented(
                name,
                format!("{name} is not static in state {}", self.name),
            )),
            None => Err(self.missing(name)),
        }
    }

    /// Copy the descriptor with its method table and an empty binding
    /// cache.
    pub fn duplicate(&self) -> Self {
        Self {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            declared_in: self.declared_in.clone(),
            private_mode: self.private_mode,
            methods: self.methods.clone(),
            bindings: HashMap::new(),
        }
    }

    /// Number of cached bindings.
    pub fn cached_bindings(&self) -> usize {
        self.bindings.len()
    }

    fn missing(&self, name: &str) -> StatesError {
        StatesError::method_not_implemented(
            name,
            format!("state {} does not implement {name}", self.name),
        )
    }
}

/// Builder for [`StateDescriptor`]. Names are validated in [`build`](Self::build).
pub struct StateBuilder<M: ?Sized> {
    name: String,
    aliases: Vec<String>,
    methods: Vec<(String, Visibility, MethodBody<M>)>,
}

impl<M: ?Sized> fmt::Debug for StateBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateBuilder")
            .field("name", &self.name)
            .field("methods", &self.methods.len())
            .finish_non_exhaustive()
    }
}

impl<M: ?Sized> StateBuilder<M> {
    /// Declare that this state specialises the state named `name`.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.aliases.push(name.into());
        self
    }

    /// Declare an instance method.
    pub fn method(mut self, name: impl Into<String>, visibility: Visibility, body: Arc<M>) -> Self {
        self.methods
            .push((name.into(), visibility, MethodBody::Instance(body)));
        self
    }

    /// Declare a static method.
    pub fn static_method<F>(mut self, name: impl Into<String>, visibility: Visibility, body: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Value, StatesError> + Send + Sync + 'static,
    {
        let body: Arc<StaticFn> = Arc::new(body);
        self.methods
            .push((name.into(), visibility, MethodBody::Static(body)));
        self
    }

    /// Validate names and freeze the method table.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::IllegalName`] for an invalid state, alias or
    /// method name, and [`StatesError::InvalidArgument`] if a method is
    /// declared twice.
    pub fn build(self) -> Result<StateDescriptor<M>, StatesError> {
        let name = StateName::new(self.name)?;
        let aliases = self
            .aliases
            .into_iter()
            .map(StateName::new)
            .collect::<Result<Vec<_>, _>>()?;

        let mut methods = HashMap::with_capacity(self.methods.len());
        for (method, visibility, body) in self.methods {
            let method = MethodName::new(method)?;
            let entry = MethodEntry {
                descriptor: MethodDescriptor {
                    name: method.clone(),
                    visibility,
                    is_static: body.is_static(),
                },
                body,
            };
            if methods.insert(method.clone(), entry).is_some() {
                return Err(StatesError::invalid_argument(format!(
                    "method {method} is declared twice in state {name}"
                )));
            }
        }

        Ok(StateDescriptor {
            name,
            aliases,
            declared_in: None,
            private_mode: false,
            methods,
            bindings: HashMap::new(),
        })
    }
}
