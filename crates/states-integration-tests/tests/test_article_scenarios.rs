//! End-to-end article scenarios.
//!
//! Drives the demo article class from `states-cli` through the engine
//! exactly as an application would: a draft is edited and published, a
//! stored article is restored, and an automated class follows its
//! attributes.

use serde_json::{json, Map, Value};

use states_automated::{AssertionEngine, IsEqual, IsNull, PropertyAssertion};
use states_cli::article::{article_class, create, new_article, ARTICLE_CLASS};
use states_core::StatesError;
use states_proxy::{DispatchOptions, Proxy, Resolution, State, StatedClass};

fn enabled(proxy: &Proxy) -> Vec<String> {
    proxy
        .list_enabled_states()
        .iter()
        .map(|state| state.to_string())
        .collect()
}

fn data(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Draft lifecycle
// ---------------------------------------------------------------------------

#[test]
fn draft_article_is_edited_then_published() {
    let class = article_class(DispatchOptions::default()).unwrap();
    let mut article = new_article(&class).unwrap();
    assert_eq!(article.class().name().as_str(), ARTICLE_CLASS);
    assert_eq!(enabled(&article), ["StateDefault", "Draft"]);

    article.call("setTitle", &[json!("Hello")]).unwrap();
    article.call("setBody", &[json!("Lorem [b]Ipsum[/b]")]).unwrap();
    assert_eq!(article.call("getTitle", &[]).unwrap(), json!("Hello"));
    assert_eq!(article.call("isPublished", &[]).unwrap(), json!(false));

    article.call("publishing", &[]).unwrap();
    assert_eq!(enabled(&article), ["StateDefault", "Published"]);
    assert_eq!(article.call("isPublished", &[]).unwrap(), json!(true));
    assert_eq!(
        article.call("getFormattedBody", &[]).unwrap(),
        json!("Lorem <strong>Ipsum</strong>")
    );
}

#[test]
fn published_article_refuses_draft_methods() {
    let class = article_class(DispatchOptions::default()).unwrap();
    let mut article = new_article(&class).unwrap();
    article.call("publishing", &[]).unwrap();

    let err = article.call("setTitle", &[json!("Again")]).unwrap_err();
    match err {
        StatesError::MethodNotImplemented { method, detail } => {
            assert_eq!(method, "setTitle");
            assert!(detail.contains("StateDefault"), "detail: {detail}");
            assert!(detail.contains("Published"), "detail: {detail}");
        }
        other => panic!("expected MethodNotImplemented, got {other:?}"),
    }
}

#[test]
fn private_formatter_is_hidden_from_external_callers() {
    let class = article_class(DispatchOptions::default()).unwrap();
    let mut article = new_article(&class).unwrap();
    article.call("setBody", &[json!("[i]x[/i]")]).unwrap();
    article.call("publishing", &[]).unwrap();

    let err = article.call("formatBody", &[]).unwrap_err();
    assert!(matches!(err, StatesError::MethodNotImplemented { .. }));
    // Reached through a public method of the same class it works.
    assert_eq!(
        article.call("getFormattedBody", &[]).unwrap(),
        json!("<em>x</em>")
    );
}

#[test]
fn publishing_twice_is_not_possible() {
    let class = article_class(DispatchOptions::default()).unwrap();
    let mut article = new_article(&class).unwrap();
    article.call("publishing", &[]).unwrap();
    assert!(article.call("publishing", &[]).is_err());
}

// ---------------------------------------------------------------------------
// Restored article
// ---------------------------------------------------------------------------

#[test]
fn stored_published_article_restores_as_published() {
    let class = article_class(DispatchOptions::default()).unwrap();
    let mut article = create(
        &class,
        data(&[
            ("is_published", json!(true)),
            ("title", json!("T2")),
            ("body", json!("B2")),
        ]),
    )
    .unwrap();

    assert_eq!(enabled(&article), ["StateDefault", "Published"]);
    assert_eq!(article.call("getTitle", &[]).unwrap(), json!("T2"));
    assert_eq!(article.call("getBody", &[]).unwrap(), json!("B2"));
    assert!(article.call("setBody", &[json!("x")]).is_err());
}

#[test]
fn stored_draft_article_restores_as_draft() {
    let class = article_class(DispatchOptions::default()).unwrap();
    let mut article = create(&class, data(&[("title", json!("T3"))])).unwrap();
    assert_eq!(enabled(&article), ["StateDefault", "Draft"]);
    article.call("setTitle", &[json!("T4")]).unwrap();
    assert_eq!(article.attribute("title"), Some(&json!("T4")));
}

#[test]
fn article_snapshot_restores_a_new_identity() {
    let class = article_class(DispatchOptions::default()).unwrap();
    let mut article = new_article(&class).unwrap();
    article.call("setTitle", &[json!("Kept")]).unwrap();
    article.call("publishing", &[]).unwrap();

    let json = article.snapshot().to_json().unwrap();
    let snapshot = states_proxy::ProxySnapshot::from_json(&json).unwrap();
    let mut restored = Proxy::restore(&class, snapshot).unwrap();

    assert_ne!(restored.id(), article.id());
    assert_eq!(enabled(&restored), enabled(&article));
    assert_eq!(restored.call("getTitle", &[]).unwrap(), json!("Kept"));
}

#[test]
fn snapshot_of_another_class_is_refused() {
    let article_class = article_class(DispatchOptions::default()).unwrap();
    let other = StatedClass::builder("Demo::Other")
        .state(State::builder("StateDefault").build().unwrap())
        .build()
        .unwrap();
    let snapshot = Proxy::new(&other).unwrap().snapshot();
    let err = Proxy::restore(&article_class, snapshot).unwrap_err();
    assert!(matches!(err, StatesError::InvalidArgument(_)));
}

#[test]
fn article_under_strict_resolution_behaves_the_same() {
    let options = DispatchOptions {
        resolution: Resolution::Strict,
        ..DispatchOptions::default()
    };
    let class = article_class(options).unwrap();
    let mut article = new_article(&class).unwrap();
    article.call("setTitle", &[json!("Strict")]).unwrap();
    article.call("publishing", &[]).unwrap();
    assert_eq!(article.call("getTitle", &[]).unwrap(), json!("Strict"));
}

// ---------------------------------------------------------------------------
// Automated states
// ---------------------------------------------------------------------------

fn automated_class() -> std::sync::Arc<StatedClass> {
    let engine = AssertionEngine::new()
        .with(
            PropertyAssertion::new(["State1"])
                .unwrap()
                .with("foo", IsEqual::new("bar"))
                .unwrap(),
        )
        .with(
            PropertyAssertion::new(["State2"])
                .unwrap()
                .with("foo1", IsEqual::new("bar1"))
                .unwrap()
                .with("foo2", IsNull)
                .unwrap(),
        );
    StatedClass::builder("Demo::Automated")
        .state(State::builder("StateDefault").build().unwrap())
        .state(State::builder("State1").build().unwrap())
        .state(State::builder("State2").build().unwrap())
        .automated(engine)
        .build()
        .unwrap()
}

#[test]
fn automated_states_follow_attributes() {
    let class = automated_class();
    let mut proxy = Proxy::new(&class).unwrap();
    assert_eq!(enabled(&proxy), ["StateDefault"]);

    proxy.set_attribute("foo", "bar").unwrap();
    proxy.update_states().unwrap();
    assert_eq!(enabled(&proxy), ["State1"]);

    proxy.set_attribute("foo1", "bar1").unwrap();
    proxy.set_attribute("foo2", Value::Null).unwrap();
    proxy.update_states().unwrap();
    assert_eq!(enabled(&proxy), ["State1", "State2"]);

    proxy.set_attribute("foo", "baz").unwrap();
    proxy.update_states().unwrap();
    assert_eq!(enabled(&proxy), ["State2"]);
}

#[test]
fn automated_states_with_nothing_matching_leave_no_state_active() {
    let class = automated_class();
    let mut proxy = Proxy::new(&class).unwrap();
    proxy.set_attribute("foo2", "set").unwrap();
    proxy.update_states().unwrap();
    assert!(enabled(&proxy).is_empty());
}
