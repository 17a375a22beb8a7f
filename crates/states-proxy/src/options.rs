//! # Dispatch Options
//!
//! Per-class configuration of the dispatcher, loadable from YAML or JSON.
//!
//! ```yaml
//! resolution: strict
//! auto_update: on_write
//! default_state: StateDefault
//! ```

use serde::{Deserialize, Serialize};

use states_core::StateName;

/// How an unqualified call picks among active states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The first active state, in enable order, that implements the method.
    #[default]
    FirstMatch,
    /// Exactly one active state may implement the method; more is an
    /// `AvailableSeveralMethodImplementations` error.
    Strict,
}

/// When the assertion engine of an automated class recomputes the active
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoUpdate {
    /// Only on an explicit `update_states()` call.
    #[default]
    Manual,
    /// After every attribute write made through the proxy.
    OnWrite,
    /// Before every external dispatch.
    BeforeCall,
}

/// Dispatcher configuration carried by a stated class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Search policy for unqualified calls.
    pub resolution: Resolution,
    /// Assertion engine trigger.
    pub auto_update: AutoUpdate,
    /// State enabled by `Proxy::new`.
    pub default_state: StateName,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            resolution: Resolution::FirstMatch,
            auto_update: AutoUpdate::Manual,
            default_state: StateName::default_state(),
        }
    }
}
