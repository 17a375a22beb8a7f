//! # states CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, loads
//! the dispatch options and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use states_cli::config::load_options;
use states_cli::demo::{run_demo, DemoArgs};
use states_cli::inspect::{run_inspect, InspectArgs};
use states_cli::scenario::{run_scenarios, ScenarioArgs};

/// States CLI
///
/// Runs and inspects stated classes built on the States dispatch engine.
#[derive(Parser, Debug)]
#[command(name = "states", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    /// Path to a dispatch options file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk an article through its lifecycle.
    Demo(DemoArgs),

    /// Print the article class definition.
    Inspect(InspectArgs),

    /// Replay the reference dispatch scenarios.
    Scenarios(ScenarioArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    let result = load_options(cli.config.as_deref()).and_then(|options| match &cli.command {
        Commands::Demo(args) => run_demo(args, &options),
        Commands::Inspect(args) => run_inspect(args, &options),
        Commands::Scenarios(args) => run_scenarios(args, &options),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
