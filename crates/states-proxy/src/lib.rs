//! # states-proxy — The Dispatch Engine
//!
//! Stated classes, their proxies, and everything a call goes through:
//!
//! - **Classes** ([`class`]): [`StatedClass`] definitions with inheritance,
//!   dispatch options, capabilities and an optional [`StateUpdater`].
//! - **Registry** ([`registry`]) and **active set** ([`active`]): the
//!   per-proxy state table and the ordered list of enabled states.
//! - **Resolution** ([`dispatch`]): `<Base>Of<State>` decomposition and
//!   first-match or strict selection among active states.
//! - **Proxy** ([`proxy`]): attributes, state lifecycle, calls, cloning
//!   and snapshots.
//! - **Binding** ([`binding`]): the `self` a state method runs with.
//! - **Capabilities** ([`capability`]): property, offset, iteration,
//!   count, invoke, string and serialization protocols.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use states_proxy::{Proxy, State, StateDefinitionExt, StatedClass};
//!
//! let class = StatedClass::builder("Door")
//!     .state(
//!         State::builder("StateDefault")
//!             .public("open", |this, _| {
//!                 this.switch_state("Opened")?;
//!                 Ok(json!("opening"))
//!             })
//!             .build()
//!             .unwrap(),
//!     )
//!     .state(
//!         State::builder("Opened")
//!             .public("close", |this, _| {
//!                 this.switch_state("StateDefault")?;
//!                 Ok(json!("closing"))
//!             })
//!             .build()
//!             .unwrap(),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut door = Proxy::new(&class).unwrap();
//! assert_eq!(door.call("open", &[]).unwrap(), json!("opening"));
//! assert!(door.call("open", &[]).is_err());
//! assert_eq!(door.call("close", &[]).unwrap(), json!("closing"));
//! ```

pub mod active;
pub mod binding;
pub mod capability;
pub mod class;
pub mod dispatch;
pub mod options;
pub mod proxy;
pub mod registry;
pub mod snapshot;

pub use active::ActiveStateSet;
pub use binding::{method, Binding, MethodFn, State, StateDefinition, StateDefinitionExt};
pub use capability::{
    ArrayAccess, Capability, Countable, Invokable, Iteration, MagicProperties, ProxyIter,
    Serializable, Stringable,
};
pub use class::{StateUpdater, StatedClass, StatedClassBuilder};
pub use dispatch::{decompose, CallTarget};
pub use options::{AutoUpdate, DispatchOptions, Resolution};
pub use proxy::Proxy;
pub use registry::StateRegistry;
pub use snapshot::ProxySnapshot;

pub use states_state::{CallerContext, Scope, Visibility};
