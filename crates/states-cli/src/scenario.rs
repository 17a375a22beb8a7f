//! # Scenarios Subcommand
//!
//! Replays the reference dispatch scenarios against the engine and reports
//! each as `PASS` or `FAIL`. The exit code is 1 when any scenario fails.
//!
//! 1. Draft article lifecycle through `publishing`.
//! 2. Article restored from stored data as `Published`.
//! 3. Assertion-driven states.
//! 4. Clone independence.
//! 5. First-match resolution and `Of` targeting.
//!
//! Scenarios define their own classes and ignore `--config`, except the
//! article scenarios which use the configured options.

use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use clap::Args;
use serde_json::{json, Map, Value};

use states_automated::{AssertionEngine, IsEqual, IsNull, PropertyAssertion};
use states_proxy::{DispatchOptions, Proxy, State, StateDefinitionExt, StatedClass};

use crate::article::{article_class, create, new_article};

/// Arguments for the `states scenarios` subcommand.
#[derive(Args, Debug)]
pub struct ScenarioArgs {
    /// Run only the scenario with this number.
    #[arg(long)]
    pub only: Option<usize>,
}

type Scenario = fn(&DispatchOptions) -> Result<()>;

/// Every scenario, numbered from 1.
pub const SCENARIOS: [(&str, Scenario); 5] = [
    ("draft article lifecycle", article_lifecycle),
    ("published article from data", article_from_data),
    ("assertion-driven states", automated_states),
    ("clone independence", clone_independence),
    ("first match and Of targeting", qualified_dispatch),
];

fn enabled(proxy: &Proxy) -> Vec<&str> {
    proxy.list_enabled_states().iter().map(|s| s.as_str()).collect()
}

fn article_lifecycle(options: &DispatchOptions) -> Result<()> {
    let class = article_class(options.clone())?;
    let mut article = new_article(&class)?;
    ensure!(enabled(&article) == ["StateDefault", "Draft"], "new article is not a draft");

    article.call("setTitle", &[json!("Hello")])?;
    article.call("setBody", &[json!("Lorem [b]Ipsum[/b]")])?;
    ensure!(article.call("getTitle", &[])? == json!("Hello"), "title not stored");

    article.call("publishing", &[])?;
    ensure!(
        enabled(&article) == ["StateDefault", "Published"],
        "publishing left {:?} active",
        enabled(&article)
    );
    ensure!(
        article.call("getFormattedBody", &[])? == json!("Lorem <strong>Ipsum</strong>"),
        "body not formatted"
    );
    ensure!(
        article.call("setTitle", &[json!("Again")]).is_err(),
        "published article still accepts setTitle"
    );
    Ok(())
}

fn article_from_data(options: &DispatchOptions) -> Result<()> {
    let class = article_class(options.clone())?;
    let mut data = Map::new();
    data.insert("is_published".to_string(), json!(true));
    data.insert("title".to_string(), json!("T2"));
    data.insert("body".to_string(), json!("B2"));
    let mut article = create(&class, data)?;

    ensure!(
        enabled(&article) == ["StateDefault", "Published"],
        "stored article restored as {:?}",
        enabled(&article)
    );
    ensure!(article.call("getTitle", &[])? == json!("T2"), "title not restored");
    ensure!(
        article.call("setBody", &[json!("x")]).is_err(),
        "published article still accepts setBody"
    );
    Ok(())
}

fn automated_states(_: &DispatchOptions) -> Result<()> {
    let engine = AssertionEngine::new()
        .with(PropertyAssertion::new(["State1"])?.with("foo", IsEqual::new("bar"))?)
        .with(
            PropertyAssertion::new(["State2"])?
                .with("foo1", IsEqual::new("bar1"))?
                .with("foo2", IsNull)?,
        );
    let class = StatedClass::builder("Demo::Automated")
        .state(State::builder("StateDefault").build()?)
        .state(State::builder("State1").build()?)
        .state(State::builder("State2").build()?)
        .automated(engine)
        .build()?;

    let mut proxy = Proxy::new(&class)?;
    proxy.set_attribute("foo", "bar")?;
    proxy.update_states()?;
    ensure!(enabled(&proxy) == ["State1"], "expected State1, got {:?}", enabled(&proxy));

    proxy.set_attribute("foo1", "bar1")?;
    proxy.set_attribute("foo2", Value::Null)?;
    proxy.update_states()?;
    ensure!(
        enabled(&proxy) == ["State1", "State2"],
        "expected State1 and State2, got {:?}",
        enabled(&proxy)
    );
    Ok(())
}

fn counter_class() -> Result<Arc<StatedClass>> {
    let a = State::builder("A")
        .public("increment", |this, _| {
            let next = this.get("counter").and_then(Value::as_i64).unwrap_or(0) + 1;
            this.set("counter", next)?;
            Ok(json!(next))
        })
        .build()?;
    let b = State::builder("B")
        .public("counter", |this, _| Ok(this.get_or_null("counter")))
        .build()?;
    Ok(StatedClass::builder("Demo::Counter").state(a).state(b).build()?)
}

fn clone_independence(_: &DispatchOptions) -> Result<()> {
    let class = counter_class()?;
    let mut original = Proxy::with_state(&class, "A")?;
    original.enable_state("B")?;
    original.set_attribute("counter", 1)?;

    let mut clone = original.try_clone().context("clone failed")?;
    ensure!(enabled(&clone) == enabled(&original), "clone has other active states");
    clone.call("increment", &[])?;

    ensure!(clone.call("counter", &[])? == json!(2), "clone did not increment");
    ensure!(original.call("counter", &[])? == json!(1), "original changed with its clone");
    ensure!(enabled(&original) == ["A", "B"], "original states changed");
    Ok(())
}

fn qualified_dispatch(_: &DispatchOptions) -> Result<()> {
    let first = State::builder("FirstState")
        .public("render", |_, _| Ok(json!("first")))
        .build()?;
    let second = State::builder("SecondState")
        .public("render", |_, _| Ok(json!("second")))
        .build()?;
    let class = StatedClass::builder("Demo::Widget")
        .state(first)
        .state(second)
        .build()?;

    let mut widget = Proxy::with_state(&class, "FirstState")?;
    widget.enable_state("SecondState")?;
    ensure!(widget.call("render", &[])? == json!("first"), "first match not honoured");
    ensure!(
        widget.call("renderOfSecondState", &[])? == json!("second"),
        "Of targeting not honoured"
    );
    Ok(())
}

/// Outcome of each selected scenario: number, title, error if it failed.
pub fn run_selected(
    only: Option<usize>,
    options: &DispatchOptions,
) -> Vec<(usize, &'static str, Option<anyhow::Error>)> {
    SCENARIOS
        .iter()
        .enumerate()
        .map(|(index, (title, scenario))| (index + 1, *title, scenario))
        .filter(|(number, _, _)| only.map_or(true, |only| only == *number))
        .map(|(number, title, scenario)| (number, title, scenario(options).err()))
        .collect()
}

/// Run the scenarios and print a report.
pub fn run_scenarios(args: &ScenarioArgs, options: &DispatchOptions) -> Result<u8> {
    if let Some(only) = args.only {
        ensure!(
            (1..=SCENARIOS.len()).contains(&only),
            "no scenario {only}: pick 1 to {}",
            SCENARIOS.len()
        );
    }
    let mut failed = 0;
    for (number, title, error) in run_selected(args.only, options) {
        match error {
            None => println!("PASS {number}. {title}"),
            Some(err) => {
                failed += 1;
                println!("FAIL {number}. {title}: {err:#}");
            }
        }
    }
    Ok(u8::from(failed > 0))
}
