//! # Method Resolution
//!
//! Turning a called name into the state that will run it, in two steps:
//!
//! 1. **Decomposition** ([`decompose`]): `<Base>Of<State>` where `<State>`
//!    is a registered state name is a qualified call. The earliest `Of`
//!    is tried first, so the longest registered suffix wins. Anything else
//!    is an unqualified call on the literal name.
//! 2. **Selection** ([`select_state`]): an unqualified call searches the
//!    active states in enable order. A state qualifies when it declares
//!    the method as a non-static method the call's scope reaches.
//!
//! Qualified calls skip the search: the named state need not be active,
//! and its absence is `StateNotFound`, not `MethodNotImplemented`.

use states_core::{StateName, StatesError};
use states_state::{Access, Scope};

use crate::options::Resolution;
use crate::registry::StateRegistry;

/// What a called name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget<'a> {
    /// Search the active states for `method`.
    Unqualified(&'a str),
    /// Run `method` from `state`, active or not.
    Qualified {
        /// The base method name.
        method: &'a str,
        /// The explicitly targeted state.
        state: &'a str,
    },
}

/// Split `called` into a [`CallTarget`] against the registered states.
pub fn decompose<'a>(called: &'a str, registry: &StateRegistry) -> CallTarget<'a> {
    for (index, _) in called.match_indices("Of") {
        let method = &called[..index];
        let state = &called[index + 2..];
        if !method.is_empty() && !state.is_empty() && registry.contains(state) {
            return CallTarget::Qualified { method, state };
        }
    }
    CallTarget::Unqualified(called)
}

/// Pick the active state that runs an unqualified call to `method`.
///
/// `active` is a snapshot of the active list; the caller keeps it stable
/// while a method body reshapes the live set.
///
/// # Errors
///
/// - [`StatesError::MethodNotImplemented`] when no active state offers a
///   reachable implementation. The detail names the active states and any
///   implementation the scope could not reach.
/// - [`StatesError::AvailableSeveralMethodImplementations`] under
///   [`Resolution::Strict`] when more than one state qualifies.
pub fn select_state(
    registry: &StateRegistry,
    active: &[StateName],
    method: &str,
    scope: &Scope,
    resolution: Resolution,
) -> Result<StateName, StatesError> {
    let mut granted: Vec<&StateName> = Vec::new();
    let mut unreachable: Vec<String> = Vec::new();

    for name in active {
        let state = registry.get(name.as_str())?;
        match state.access(method, scope) {
            Access::Granted => {
                granted.push(name);
                if resolution == Resolution::FirstMatch {
                    break;
                }
            }
            Access::Hidden(visibility) => unreachable.push(format!("{name} ({visibility})")),
            Access::Static => unreachable.push(format!("{name} (static)")),
            Access::Missing => {}
        }
    }

    match granted.as_slice() {
        [] => Err(StatesError::method_not_implemented(
            method,
            not_found_detail(active, &unreachable),
        )),
        [only] => Ok((*only).clone()),
        several => Err(StatesError::AvailableSeveralMethodImplementations {
            method: method.to_string(),
            states: several.iter().map(|name| name.to_string()).collect(),
        }),
    }
}

fn not_found_detail(active: &[StateName], unreachable: &[String]) -> String {
    if active.is_empty() {
        return "no state is active".to_string();
    }
    let active = active
        .iter()
        .map(StateName::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if unreachable.is_empty() {
        format!("no active state implements it (active states: {active})")
    } else {
        format!(
            "implemented by {} but not reachable from this scope (active states: {active})",
            unreachable.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{State, StateDefinitionExt};
    use serde_json::json;
    use states_core::StatedClassName;

    fn registry() -> StateRegistry {
        let mut registry = StateRegistry::new(StatedClassName::new("Widget").unwrap());
        let first = State::builder("First")
            .public("render", |_, _| Ok(json!("first")))
            .private("secret", |_, _| Ok(json!("first secret")))
            .build()
            .unwrap();
        let second = State::builder("Second")
            .public("render", |_, _| Ok(json!("second")))
            .public("only", |_, _| Ok(json!("second only")))
            .build()
            .unwrap();
        let stat = State::builder("Tools")
            .static_method("make", states_state::Visibility::Public, |_| Ok(json!(1)))
            .build()
            .unwrap();
        registry.register(first).unwrap();
        registry.register(second).unwrap();
        registry.register(stat).unwrap();
        registry
    }

    fn active(names: &[&str]) -> Vec<StateName> {
        names.iter().map(|n| StateName::new(*n).unwrap()).collect()
    }

    #[test]
    fn test_decompose_qualified() {
        let registry = registry();
        assert_eq!(
            decompose("renderOfSecond", &registry),
            CallTarget::Qualified {
                method: "render",
                state: "Second"
            }
        );
    }

    #[test]
    fn test_decompose_falls_back_to_literal() {
        let registry = registry();
        assert_eq!(
            decompose("renderOfThird", &registry),
            CallTarget::Unqualified("renderOfThird")
        );
        assert_eq!(decompose("OfSecond", &registry), CallTarget::Unqualified("OfSecond"));
        assert_eq!(decompose("render", &registry), CallTarget::Unqualified("render"));
    }

    #[test]
    fn test_decompose_with_incidental_of() {
        let registry = registry();
        assert_eq!(
            decompose("listOfItemsOfFirst", &registry),
            CallTarget::Qualified {
                method: "listOfItems",
                state: "First"
            }
        );
    }

    #[test]
    fn test_first_match_follows_enable_order() {
        let registry = registry();
        let picked = select_state(
            &registry,
            &active(&["Second", "First"]),
            "render",
            &Scope::public(),
            Resolution::FirstMatch,
        )
        .unwrap();
        assert_eq!(picked.as_str(), "Second");
    }

    #[test]
    fn test_strict_reports_every_candidate() {
        let registry = registry();
        let err = select_state(
            &registry,
            &active(&["First", "Second"]),
            "render",
            &Scope::public(),
            Resolution::Strict,
        )
        .unwrap_err();
        match err {
            StatesError::AvailableSeveralMethodImplementations { method, states } => {
                assert_eq!(method, "render");
                assert_eq!(states, vec!["First", "Second"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_strict_single_candidate_ok() {
        let registry = registry();
        let picked = select_state(
            &registry,
            &active(&["First", "Second"]),
            "only",
            &Scope::public(),
            Resolution::Strict,
        )
        .unwrap();
        assert_eq!(picked.as_str(), "Second");
    }

    #[test]
    fn test_missing_lists_active_states() {
        let registry = registry();
        let err = select_state(
            &registry,
            &active(&["First"]),
            "only",
            &Scope::public(),
            Resolution::FirstMatch,
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("only"), "{message}");
        assert!(message.contains("First"), "{message}");
    }

    #[test]
    fn test_hidden_method_mentioned() {
        let registry = registry();
        let err = select_state(
            &registry,
            &active(&["First"]),
            "secret",
            &Scope::public(),
            Resolution::FirstMatch,
        )
        .unwrap_err();
        assert!(err.to_string().contains("private"), "{err}");
    }

    #[test]
    fn test_static_never_selected() {
        let registry = registry();
        let err = select_state(
            &registry,
            &active(&["Tools"]),
            "make",
            &Scope::public(),
            Resolution::FirstMatch,
        )
        .unwrap_err();
        assert!(err.to_string().contains("static"), "{err}");
    }

    #[test]
    fn test_nothing_active() {
        let registry = registry();
        let err = select_state(&registry, &[], "render", &Scope::public(), Resolution::FirstMatch)
            .unwrap_err();
        assert!(err.to_string().contains("no state is active"));
    }
}
