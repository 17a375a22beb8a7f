//! # states-cli — States Command-Line Interface
//!
//! A clap-based front end over the dispatch engine. It ships the article
//! demo class and runs it, inspects it, and replays the reference
//! scenarios.
//!
//! ## Subcommands
//!
//! - `demo`: Article lifecycle transcript, optionally with a snapshot
//! - `inspect`: Class definition as text or JSON
//! - `scenarios`: Reference dispatch scenarios with PASS/FAIL output
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handlers return `anyhow::Result<u8>`; the `u8` is the exit code.
//! - Dispatch options come from `--config` (YAML or JSON).

pub mod article;
pub mod config;
pub mod demo;
pub mod inspect;
pub mod scenario;
