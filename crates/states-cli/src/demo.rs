//! # Demo Subcommand
//!
//! Walks an article through its lifecycle and prints each call with its
//! result:
//!
//! ```text
//! states demo --title Hello --body "Lorem [b]Ipsum[/b]" --snapshot
//! ```

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{json, Value};

use states_core::StatesError;
use states_proxy::{DispatchOptions, Proxy};

use crate::article::{article_class, new_article};

/// Arguments for the `states demo` subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Title given to the draft.
    #[arg(long, default_value = "Hello")]
    pub title: String,

    /// Body given to the draft, with BBCode markup.
    #[arg(long, default_value = "Lorem [b]Ipsum[/b]")]
    pub body: String,

    /// Print the final proxy snapshot as JSON.
    #[arg(long)]
    pub snapshot: bool,
}

/// Run the demo and print its transcript.
pub fn run_demo(args: &DemoArgs, options: &DispatchOptions) -> Result<u8> {
    for line in demo_transcript(args, options)? {
        println!("{line}");
    }
    Ok(0)
}

fn active(proxy: &Proxy) -> String {
    proxy
        .list_enabled_states()
        .iter()
        .map(|state| state.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn call(
    proxy: &mut Proxy,
    lines: &mut Vec<String>,
    method: &str,
    args: &[Value],
) -> Result<Value, StatesError> {
    let rendered = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let outcome = proxy.call(method, args);
    match &outcome {
        Ok(value) => lines.push(format!("{method}({rendered}) -> {value}")),
        Err(err) => lines.push(format!("{method}({rendered}) !! {err}")),
    }
    outcome
}

/// The demo as printed lines.
pub fn demo_transcript(args: &DemoArgs, options: &DispatchOptions) -> Result<Vec<String>> {
    let class = article_class(options.clone()).context("failed to define the article class")?;
    let mut article = new_article(&class).context("failed to create the article")?;
    let mut lines = vec![format!("new article [{}]", active(&article))];

    call(&mut article, &mut lines, "setTitle", &[json!(args.title)])?;
    call(&mut article, &mut lines, "setBody", &[json!(args.body)])?;
    call(&mut article, &mut lines, "getTitle", &[])?;
    call(&mut article, &mut lines, "publishing", &[])?;
    lines.push(format!("published [{}]", active(&article)));
    call(&mut article, &mut lines, "getFormattedBody", &[])?;

    // Draft is gone; the failure is part of the demo.
    if call(&mut article, &mut lines, "setTitle", &[json!("Too late")]).is_ok() {
        tracing::warn!(proxy = %article.id(), "published article still accepts setTitle");
    }

    if args.snapshot {
        lines.push(article.snapshot().to_json()?);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(snapshot: bool) -> DemoArgs {
        DemoArgs {
            title: "Hello".to_string(),
            body: "Lorem [b]Ipsum[/b]".to_string(),
            snapshot,
        }
    }

    #[test]
    fn test_transcript() {
        let lines = demo_transcript(&args(false), &DispatchOptions::default()).unwrap();
        assert_eq!(lines[0], "new article [StateDefault, Draft]");
        assert!(lines.contains(&"getTitle() -> \"Hello\"".to_string()));
        assert!(lines.contains(&"published [StateDefault, Published]".to_string()));
        assert!(lines.contains(&"getFormattedBody() -> \"Lorem <strong>Ipsum</strong>\"".to_string()));
        assert!(lines.last().unwrap().starts_with("setTitle(\"Too late\") !!"));
    }

    #[test]
    fn test_transcript_with_snapshot() {
        let lines = demo_transcript(&args(true), &DispatchOptions::default()).unwrap();
        let snapshot: Value = serde_json::from_str(lines.last().unwrap()).unwrap();
        assert_eq!(snapshot["class"], json!("Demo::Article"));
        assert_eq!(snapshot["active_states"], json!(["StateDefault", "Published"]));
        assert_eq!(snapshot["attributes"]["is_published"], json!(true));
    }

    #[test]
    fn test_unknown_default_state_fails() {
        let options = DispatchOptions {
            default_state: states_core::StateName::new("Archived").unwrap(),
            ..DispatchOptions::default()
        };
        assert!(demo_transcript(&args(false), &options).is_err());
    }
}
