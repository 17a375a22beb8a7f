//! Dispatch properties of the proxy.
//!
//! Activation, first-match order, explicit `Of` targeting, switch
//! atomicity, clone independence and visibility, checked over arbitrary
//! operation sequences where it matters.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use states_core::StatesError;
use states_proxy::{CallerContext, Proxy, Resolution, State, StateDefinitionExt, StatedClass};

const NAMES: [&str; 4] = ["Alpha", "Beta", "Gamma", "Delta"];

/// Every state answers `whoami` with its own name.
fn named_state(name: &'static str) -> State {
    State::builder(name)
        .public("whoami", move |_, _| Ok(json!(name)))
        .build()
        .unwrap()
}

fn greek_class() -> Arc<StatedClass> {
    NAMES
        .iter()
        .fold(StatedClass::builder("Test::Greek"), |builder, name| {
            builder.state(named_state(*name))
        })
        .build()
        .unwrap()
}

/// A proxy of `class` with nothing active.
fn blank(class: &Arc<StatedClass>) -> Proxy {
    let mut proxy = Proxy::with_state(class, "Alpha").unwrap();
    proxy.disable_all_states();
    proxy
}

fn enabled(proxy: &Proxy) -> Vec<String> {
    proxy
        .list_enabled_states()
        .iter()
        .map(|state| state.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Activation invariant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Enable(usize),
    Disable(usize),
    Register(usize),
    Unregister(usize),
    Switch(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..NAMES.len()).prop_map(Op::Enable),
        (0..NAMES.len()).prop_map(Op::Disable),
        (0..NAMES.len()).prop_map(Op::Register),
        (0..NAMES.len()).prop_map(Op::Unregister),
        (0..NAMES.len()).prop_map(Op::Switch),
    ]
}

proptest! {
    #[test]
    fn active_states_stay_registered(ops in prop::collection::vec(op(), 0..40)) {
        let class = greek_class();
        let mut proxy = blank(&class);
        let mut registered: BTreeSet<String> = NAMES.iter().map(|n| n.to_string()).collect();
        let mut model: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Enable(i) => {
                    let result = proxy.enable_state(NAMES[i]);
                    if registered.contains(NAMES[i]) {
                        prop_assert!(result.is_ok());
                        if !model.iter().any(|n| n == NAMES[i]) {
                            model.push(NAMES[i].to_string());
                        }
                    } else {
                        let is_not_found = matches!(result, Err(StatesError::StateNotFound { .. }));
                        prop_assert!(is_not_found);
                    }
                }
                Op::Disable(i) => {
                    proxy.disable_state(NAMES[i]);
                    model.retain(|n| n != NAMES[i]);
                }
                Op::Register(i) => {
                    proxy.register_state(named_state(NAMES[i])).unwrap();
                    registered.insert(NAMES[i].to_string());
                }
                Op::Unregister(i) => {
                    let result = proxy.unregister_state(NAMES[i]);
                    prop_assert_eq!(result.is_ok(), registered.remove(NAMES[i]));
                    model.retain(|n| n != NAMES[i]);
                }
                Op::Switch(i) => {
                    if proxy.switch_state(NAMES[i]).is_ok() {
                        model = vec![NAMES[i].to_string()];
                    }
                }
            }

            let active = enabled(&proxy);
            prop_assert_eq!(&active, &model);
            for state in &active {
                prop_assert!(proxy.registry().contains(state));
            }
        }
    }

    #[test]
    fn first_enabled_state_wins(order in Just(NAMES.to_vec()).prop_shuffle()) {
        let class = greek_class();
        let mut proxy = blank(&class);
        for name in &order {
            proxy.enable_state(name).unwrap();
        }
        prop_assert_eq!(proxy.call("whoami", &[]).unwrap(), json!(order[0]));

        // Re-enabling moves the first state to the back.
        proxy.disable_state(order[0]);
        proxy.enable_state(order[0]).unwrap();
        prop_assert_eq!(proxy.call("whoami", &[]).unwrap(), json!(order[1]));
        let active = enabled(&proxy);
        prop_assert_eq!(active.last().map(String::as_str), Some(order[0]));
    }

    #[test]
    fn switch_leaves_exactly_one_state(
        before in prop::collection::vec(0..NAMES.len(), 0..6),
        target in 0..NAMES.len(),
    ) {
        let class = greek_class();
        let mut proxy = blank(&class);
        for i in before {
            proxy.enable_state(NAMES[i]).unwrap();
        }
        proxy.switch_state(NAMES[target]).unwrap();
        prop_assert_eq!(enabled(&proxy), vec![NAMES[target].to_string()]);
    }
}

// ---------------------------------------------------------------------------
// Explicit targeting
// ---------------------------------------------------------------------------

#[test]
fn of_suffix_runs_an_inactive_registered_state() {
    let class = greek_class();
    let mut proxy = Proxy::with_state(&class, "Alpha").unwrap();
    assert_eq!(proxy.call("whoamiOfGamma", &[]).unwrap(), json!("Gamma"));
    // Targeting does not activate.
    assert_eq!(enabled(&proxy), ["Alpha"]);
}

#[test]
fn of_suffix_naming_an_unregistered_state_is_a_plain_method_name() {
    let class = greek_class();
    let mut proxy = Proxy::with_state(&class, "Alpha").unwrap();
    let err = proxy.call("whoamiOfOmega", &[]).unwrap_err();
    match err {
        StatesError::MethodNotImplemented { method, .. } => assert_eq!(method, "whoamiOfOmega"),
        other => panic!("expected MethodNotImplemented, got {other:?}"),
    }
}

#[test]
fn longest_registered_suffix_wins() {
    // `Of` inside a method name: `listOfItemsOfBeta` targets Beta.
    let beta = State::builder("Beta")
        .public("listOfItems", |_, _| Ok(json!("beta items")))
        .build()
        .unwrap();
    let class = StatedClass::builder("Test::Lists")
        .state(beta)
        .state(named_state("Alpha"))
        .build()
        .unwrap();
    let mut proxy = Proxy::with_state(&class, "Alpha").unwrap();
    assert_eq!(
        proxy.call("listOfItemsOfBeta", &[]).unwrap(),
        json!("beta items")
    );
}

#[test]
fn colliding_state_names_are_refused() {
    let err = StatedClass::builder("Test::Collide")
        .state(named_state("Beta"))
        .state(State::builder("AlphaOfBeta").build().unwrap())
        .build()
        .unwrap_err();
    assert!(matches!(err, StatesError::IllegalName(_)));

    let class = greek_class();
    let mut proxy = blank(&class);
    let err = proxy
        .register_state(State::builder("XOfGamma").build().unwrap())
        .unwrap_err();
    assert!(matches!(err, StatesError::IllegalName(_)));
}

// ---------------------------------------------------------------------------
// Strict resolution
// ---------------------------------------------------------------------------

#[test]
fn strict_resolution_reports_every_candidate() {
    let class = NAMES
        .iter()
        .fold(
            StatedClass::builder("Test::Strict").resolution(Resolution::Strict),
            |builder, name| builder.state(named_state(*name)),
        )
        .build()
        .unwrap();
    let mut proxy = Proxy::with_state(&class, "Beta").unwrap();
    assert_eq!(proxy.call("whoami", &[]).unwrap(), json!("Beta"));

    proxy.enable_state("Alpha").unwrap();
    match proxy.call("whoami", &[]).unwrap_err() {
        StatesError::AvailableSeveralMethodImplementations { method, states } => {
            assert_eq!(method, "whoami");
            assert_eq!(states, vec!["Beta".to_string(), "Alpha".to_string()]);
        }
        other => panic!("expected AvailableSeveralMethodImplementations, got {other:?}"),
    }
    // Explicit targeting is never ambiguous.
    assert_eq!(proxy.call("whoamiOfAlpha", &[]).unwrap(), json!("Alpha"));
}

// ---------------------------------------------------------------------------
// Clone independence
// ---------------------------------------------------------------------------

fn counter_class() -> Arc<StatedClass> {
    let counting = State::builder("Counting")
        .public("increment", |this, _| {
            let next = this.get("counter").and_then(Value::as_i64).unwrap_or(0) + 1;
            this.set("counter", next)?;
            Ok(json!(next))
        })
        .public("counter", |this, _| Ok(this.get_or_null("counter")))
        .build()
        .unwrap();
    StatedClass::builder("Test::Counter")
        .state(counting)
        .state(named_state("Alpha"))
        .build()
        .unwrap()
}

#[test]
fn clone_is_independent_of_its_source() {
    let class = counter_class();
    let mut original = Proxy::with_state(&class, "Alpha").unwrap();
    original.enable_state("Counting").unwrap();
    original.call("increment", &[]).unwrap();

    let mut clone = original.try_clone().unwrap();
    assert_ne!(clone.id(), original.id());
    assert_eq!(enabled(&clone), enabled(&original));

    clone.call("increment", &[]).unwrap();
    clone.call("increment", &[]).unwrap();
    assert_eq!(clone.call("counter", &[]).unwrap(), json!(3));
    assert_eq!(original.call("counter", &[]).unwrap(), json!(1));

    clone.disable_state("Alpha");
    assert_eq!(enabled(&original), ["Alpha", "Counting"]);
    assert_eq!(enabled(&clone), ["Counting"]);
}

#[test]
fn clone_keeps_proxy_local_states() {
    let class = counter_class();
    let mut original = Proxy::with_state(&class, "Alpha").unwrap();
    original.register_state(named_state("Gamma")).unwrap();
    original.enable_state("Gamma").unwrap();

    let mut clone = original.try_clone().unwrap();
    clone.unregister_state("Gamma").unwrap();
    assert!(original.registry().contains("Gamma"));
    assert_eq!(original.call("whoamiOfGamma", &[]).unwrap(), json!("Gamma"));
    assert_eq!(enabled(&clone), ["Alpha"]);
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

fn vault_class() -> Arc<StatedClass> {
    let vault = State::builder("Vault")
        .private("combination", |_, _| Ok(json!(1234)))
        .protected("hint", |_, _| Ok(json!("four digits")))
        .public("open", |this, _| this.call("combination", &[]))
        .public("ask", |this, _| this.call("hintOfVault", &[]))
        .build()
        .unwrap();
    StatedClass::builder("Test::Vault")
        .state(vault)
        .build()
        .unwrap()
}

#[test]
fn hidden_methods_are_unreachable_externally() {
    let class = vault_class();
    let mut proxy = Proxy::with_state(&class, "Vault").unwrap();
    for method in ["combination", "hint", "combinationOfVault"] {
        let err = proxy.call(method, &[]).unwrap_err();
        assert!(
            matches!(err, StatesError::MethodNotImplemented { .. }),
            "{method}: {err:?}"
        );
    }
    assert!(proxy.call_in_state("Vault", "hint", &[]).is_err());
}

#[test]
fn hidden_methods_are_reachable_from_bound_code() {
    let class = vault_class();
    let mut proxy = Proxy::with_state(&class, "Vault").unwrap();
    assert_eq!(proxy.call("open", &[]).unwrap(), json!(1234));
    assert_eq!(proxy.call("ask", &[]).unwrap(), json!("four digits"));
}

#[test]
fn caller_context_sets_the_scope() {
    let class = vault_class();
    let mut proxy = Proxy::with_state(&class, "Vault").unwrap();
    let own = CallerContext::Class(class.name().clone());
    assert_eq!(proxy.call_from(&own, "combination", &[]).unwrap(), json!(1234));

    let stranger = CallerContext::Class(states_core::StatedClassName::new("Test::Stranger").unwrap());
    assert!(proxy.call_from(&stranger, "hint", &[]).is_err());
    assert!(proxy.call_from(&CallerContext::External, "hint", &[]).is_err());
}

#[test]
fn failure_detail_mentions_hidden_implementations() {
    let class = vault_class();
    let mut proxy = Proxy::with_state(&class, "Vault").unwrap();
    match proxy.call("combination", &[]).unwrap_err() {
        StatesError::MethodNotImplemented { detail, .. } => {
            assert!(detail.contains("Vault (private)"), "detail: {detail}");
        }
        other => panic!("expected MethodNotImplemented, got {other:?}"),
    }
}

#[test]
fn no_active_state_means_no_method() {
    let class = greek_class();
    let mut proxy = Proxy::with_state(&class, "Alpha").unwrap();
    proxy.disable_all_states();
    match proxy.call("whoami", &[]).unwrap_err() {
        StatesError::MethodNotImplemented { detail, .. } => {
            assert_eq!(detail, "no state is active");
        }
        other => panic!("expected MethodNotImplemented, got {other:?}"),
    }
}
