//! # Inspect Subcommand
//!
//! Prints the definition of the article class: options, capabilities and,
//! per state, its aliases, declaring class and method table.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use states_core::{StateName, StatedClassName};
use states_proxy::{Capability, DispatchOptions, StatedClass};
use states_state::MethodDescriptor;

use crate::article::article_class;

/// Output format.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable listing.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Arguments for the `states inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// One state of a class report.
#[derive(Debug, Serialize)]
pub struct StateReport {
    pub name: StateName,
    pub aliases: Vec<StateName>,
    pub declared_in: Option<StatedClassName>,
    pub private_mode: bool,
    pub methods: Vec<MethodDescriptor>,
}

/// The definition of a stated class.
#[derive(Debug, Serialize)]
pub struct ClassReport {
    pub class: StatedClassName,
    pub parent: Option<StatedClassName>,
    pub options: DispatchOptions,
    pub capabilities: Vec<Capability>,
    pub automated: bool,
    pub states: Vec<StateReport>,
}

/// Describe `class` as a proxy of it would see its states.
pub fn describe_class(class: &StatedClass) -> ClassReport {
    let states = class
        .instantiate_states()
        .iter()
        .map(|state| StateReport {
            name: state.name().clone(),
            aliases: state.aliases().to_vec(),
            declared_in: state.declared_in().cloned(),
            private_mode: state.is_private_mode(),
            methods: state.methods().into_iter().cloned().collect(),
        })
        .collect();
    ClassReport {
        class: class.name().clone(),
        parent: class.parent().map(|parent| parent.name().clone()),
        options: class.options().clone(),
        capabilities: class.capabilities().iter().copied().collect(),
        automated: class.is_automated(),
        states,
    }
}

/// Render a report as text lines.
pub fn render_text(report: &ClassReport) -> Vec<String> {
    let mut lines = vec![format!("class {}", report.class)];
    if let Some(parent) = &report.parent {
        lines.push(format!("  extends {parent}"));
    }
    lines.push(format!(
        "  resolution: {:?}, auto_update: {:?}, default_state: {}",
        report.options.resolution, report.options.auto_update, report.options.default_state
    ));
    if !report.capabilities.is_empty() {
        let capabilities: Vec<&str> = report.capabilities.iter().map(Capability::as_str).collect();
        lines.push(format!("  capabilities: {}", capabilities.join(", ")));
    }
    for state in &report.states {
        lines.push(format!("  state {}", state.name));
        for method in &state.methods {
            let marker = if method.is_static { " static" } else { "" };
            lines.push(format!("    {}{marker} {}", method.visibility, method.name));
        }
    }
    lines
}

/// Print the article class definition.
pub fn run_inspect(args: &InspectArgs, options: &DispatchOptions) -> Result<u8> {
    let class = article_class(options.clone()).context("failed to define the article class")?;
    let report = describe_class(&class);
    match args.format {
        OutputFormat::Text => {
            for line in render_text(&report) {
                println!("{line}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(0)
}
