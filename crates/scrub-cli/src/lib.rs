//! Command-line front end for the lecture scrubber.
//!
//! This crate provides:
//! - clap argument definitions for every subcommand
//! - Environment configuration and tracing setup
//! - Confirmation prompts and render progress
//! - Subcommand handlers on top of `scrub-media`

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod report;

pub use cli::{Cli, Commands};
pub use commands::Context;
pub use config::ToolConfig;
pub use error::{CliError, CliResult};
