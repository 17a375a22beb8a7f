//! # Service Container Contract
//!
//! States and their proxies may need shared services (a formatter, a
//! clock, a repository). The engine does not own a dependency-injection
//! framework; it only needs a keyed lookup. [`ServiceContainer`] is that
//! contract and [`Services`] is the in-memory implementation used when no
//! external container is wired in.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::StatesError;

/// A shared, type-erased service instance.
pub type SharedService = Arc<dyn Any + Send + Sync>;

/// Keyed service lookup consumed by proxies and state methods.
pub trait ServiceContainer: Send + Sync + fmt::Debug {
    /// Look up a service by key.
    ///
    /// # Errors
    ///
    /// Returns [`StatesError::ServiceNotFound`] if the key is unknown.
    fn get(&self, name: &str) -> Result<SharedService, StatesError>;

    /// Register (or replace) a service under `name`.
    fn register(&mut self, name: &str, instance: SharedService);

    /// Whether a service is registered under `name`.
    fn has(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }
}

/// In-memory [`ServiceContainer`].
#[derive(Default)]
pub struct Services {
    entries: HashMap<String, SharedService>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("Services").field("keys", &keys).finish()
    }
}

impl Services {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn with<T: Any + Send + Sync>(mut self, name: &str, instance: T) -> Self {
        self.register(name, Arc::new(instance));
        self
    }
}

impl ServiceContainer for Services {
    fn get(&self, name: &str) -> Result<SharedService, StatesError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| StatesError::ServiceNotFound(name.to_string()))
    }

    fn register(&mut self, name: &str, instance: SharedService) {
        self.entries.insert(name.to_string(), instance);
    }

    fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// Look up a service and downcast it to `T`.
///
/// # Errors
///
/// Returns [`StatesError::ServiceNotFound`] if the key is unknown and
/// [`StatesError::InvalidArgument`] if the service is not a `T`.
pub fn fetch_service<T: Any + Send + Sync>(
    container: &dyn ServiceContainer,
    name: &str,
) -> Result<Arc<T>, StatesError> {
    container.get(name)?.downcast::<T>().map_err(|_| {
        StatesError::invalid_argument(format!(
            "service {name} is not a {}",
            std::any::type_name::<T>()
        ))
    })
}
