//! # Stated Classes
//!
//! A [`StatedClass`] is the shared, immutable definition behind every proxy
//! of one kind: its name, an optional parent class, the prototype states it
//! declares, its [`DispatchOptions`], the capability protocols it supports,
//! and an optional [`StateUpdater`] (the assertion engine of automated
//! classes).
//!
//! ## Inheritance
//!
//! A child class sees every state of its ancestors. States inherited from
//! an ancestor are instantiated in private mode: their private methods stay
//! reachable only from code of the class that declared them. A child that
//! redeclares a state name replaces the inherited state.
//!
//! ## Caller Scopes
//!
//! [`StatedClass::scope_for`] maps an explicit [`CallerContext`] to the
//! [`Scope`] of a call: external callers reach public methods, the class
//! itself reaches private methods, and ancestors reach protected methods.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use states_core::{StateName, StatedClassName, StatesError, ValidationError};
use states_state::{CallerContext, Scope, Visibility};

use crate::binding::State;
use crate::capability::Capability;
use crate::options::{AutoUpdate, DispatchOptions, Resolution};
use crate::proxy::Proxy;

/// Recomputes the active states of a proxy from its attributes.
///
/// Implemented by the assertion engine; kept as a trait here so class
/// definitions can carry one without this crate depending on it.
pub trait StateUpdater: Send + Sync + fmt::Debug {
    /// Rewrite the active states of `proxy`.
    ///
    /// # Errors
    ///
    /// Implementation specific; typically `StateNotFound` for a state
    /// the class does not declare.
    fn update_states(&self, proxy: &mut Proxy) -> Result<(), StatesError>;

    /// Every state name the updater may enable, checked when the class is
    /// built.
    fn declared_states(&self) -> Vec<StateName> {
        Vec::new()
    }
}

/// The definition shared by every proxy of one stated class.
#[derive(Debug)]
pub struct StatedClass {
    name: StatedClassName,
    parent: Option<Arc<StatedClass>>,
    states: Vec<State>,
    options: DispatchOptions,
    capabilities: BTreeSet<Capability>,
    updater: Option<Arc<dyn StateUpdater>>,
}

impl StatedClass {
    /// Start defining a stated class.
    pub fn builder(name: impl Into<String>) -> StatedClassBuilder {
        StatedClassBuilder {
            name: name.into(),
            parent: None,
            states: Vec::new(),
            options: None,
            resolution: None,
            auto_update: None,
            default_state: None,
            capabilities: BTreeSet::new(),
            updater: None,
        }
    }

    /// The class name.
    pub fn name(&self) -> &StatedClassName {
        &self.name
    }

    /// The parent class, if any.
    pub fn parent(&self) -> Option<&Arc<StatedClass>> {
        self.parent.as_ref()
    }

    /// Dispatcher configuration.
    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Supported capability protocols, own and inherited.
    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    /// Whether the class supports `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// The assertion engine, own or inherited.
    pub fn updater(&self) -> Option<&Arc<dyn StateUpdater>> {
        self.updater.as_ref()
    }

    /// Whether an assertion engine is attached.
    pub fn is_automated(&self) -> bool {
        self.updater.is_some()
    }

    /// Whether this class is `class` or inherits from it.
    pub fn is_a(&self, class: &str) -> bool {
        self.name == class || self.parent.as_ref().is_some_and(|parent| parent.is_a(class))
    }

    /// Names of every state a proxy of this class starts with, ancestors
    /// first, in declaration order.
    pub fn state_names(&self) -> Vec<StateName> {
        self.instantiate_states()
            .iter()
            .map(|state| state.name().clone())
            .collect()
    }

    /// Fresh copies of every state a proxy of this class starts with.
    pub fn instantiate_states(&self) -> Vec<State> {
        let mut states = Vec::new();
        self.collect_states(&mut states, false);
        states
    }

    fn collect_states(&self, out: &mut Vec<State>, inherited: bool) {
        if let Some(parent) = &self.parent {
            parent.collect_states(out, true);
        }
        for state in &self.states {
            let mut copy = state.duplicate();
            copy.set_private_mode(inherited);
            match out.iter().position(|existing| existing.name() == state.name()) {
                Some(index) => out[index] = copy,
                None => out.push(copy),
            }
        }
    }

    /// The scope a call from `caller` runs with on a proxy of this class.
    pub fn scope_for(&self, caller: &CallerContext) -> Scope {
        match caller {
            CallerContext::External => Scope::public(),
            CallerContext::Class(class) => {
                let level = if *class == self.name {
                    Visibility::Private
                } else if self.is_a(class.as_str()) {
                    Visibility::Protected
                } else {
                    Visibility::Public
                };
                Scope {
                    level,
                    origin: Some(class.clone()),
                }
            }
        }
    }
}

/// Builder for [`StatedClass`].
pub struct StatedClassBuilder {
    name: String,
    parent: Option<Arc<StatedClass>>,
    states: Vec<State>,
    options: Option<DispatchOptions>,
    // Field overrides, applied in `build` on top of the base options.
    resolution: Option<Resolution>,
    auto_update: Option<AutoUpdate>,
    default_state: Option<StateName>,
    capabilities: BTreeSet<Capability>,
    updater: Option<Arc<dyn StateUpdater>>,
}

impl fmt::Debug for StatedClassBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatedClassBuilder")
            .field("name", &self.name)
            .field("states", &self.states.len())
            .finish_non_exhaustive()
    }
}

impl StatedClassBuilder {
    /// Inherit states, options, capabilities and updater from `parent`.
    pub fn extends(mut self, parent: &Arc<StatedClass>) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Declare a state.
    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Replace the dispatcher configuration inherited from the parent.
    /// The single-field setters below still apply on top of it, whatever
    /// the call order.
    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the resolution policy.
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Set the assertion engine trigger.
    pub fn auto_update(mut self, auto_update: AutoUpdate) -> Self {
        self.auto_update = Some(auto_update);
        self
    }

    /// Set the state `Proxy::new` enables.
    pub fn default_state(mut self, state: StateName) -> Self {
        self.default_state = Some(state);
        self
    }

    /// Support a capability protocol.
    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Attach an assertion engine.
    pub fn automated(mut self, updater: impl StateUpdater + 'static) -> Self {
        self.updater = Some(Arc::new(updater));
        self
    }

    /// Validate and freeze the class.
    ///
    /// # Errors
    ///
    /// - [`StatesError::IllegalName`] for an invalid class name, or for two
    ///   states whose names collide under `Of` decomposition.
    /// - [`StatesError::InvalidArgument`] if a state is declared twice.
    /// - [`StatesError::StateNotFound`] if the assertion engine targets a
    ///   state the class does not have.
    pub fn build(self) -> Result<Arc<StatedClass>, StatesError> {
        let name = StatedClassName::new(self.name)?;

        let mut seen = BTreeSet::new();
        for state in &self.states {
            if !seen.insert(state.name().clone()) {
                return Err(StatesError::invalid_argument(format!(
                    "state {} is declared twice in {name}",
                    state.name()
                )));
            }
        }

        let states: Vec<State> = self
            .states
            .into_iter()
            .map(|state| state.with_declaring_class(name.clone()))
            .collect();

        let parent_options = self.parent.as_ref().map(|parent| parent.options.clone());
        let mut options = self.options.or(parent_options).unwrap_or_default();
        if let Some(resolution) = self.resolution {
            options.resolution = resolution;
        }
        if let Some(auto_update) = self.auto_update {
            options.auto_update = auto_update;
        }
        if let Some(default_state) = self.default_state {
            options.default_state = default_state;
        }

        let mut capabilities = self
            .parent
            .as_ref()
            .map(|parent| parent.capabilities.clone())
            .unwrap_or_default();
        capabilities.extend(self.capabilities);

        let updater = self
            .updater
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.updater.clone()));

        let class = StatedClass {
            name,
            parent: self.parent,
            states,
            options,
            capabilities,
            updater,
        };

        let effective = class.state_names();
        for (index, state) in effective.iter().enumerate() {
            if let Some(other) = effective[index + 1..]
                .iter()
                .find(|other| state.collides_with(other))
            {
                return Err(ValidationError::AmbiguousStateName {
                    name: other.to_string(),
                    other: state.to_string(),
                }
                .into());
            }
        }

        if let Some(updater) = &class.updater {
            for target in updater.declared_states() {
                if !effective.contains(&target) {
                    return Err(StatesError::state_not_found(target.as_str(), &class.name));
                }
            }
        }

        tracing::debug!(
            class = %class.name,
            states = effective.len(),
            automated = class.is_automated(),
            "stated class built"
        );
        Ok(Arc::new(class))
    }
}
