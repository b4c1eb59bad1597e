//! CLI module
//!
//! Command-line interface for running sensors.
//!
//! # Commands
//!
//! - `validate` - Check a definitions file
//! - `list` - Show sensors, status and cursor
//! - `tick` - Evaluate one sensor once
//! - `run` - Evaluate sensors on their intervals until Ctrl-C
//! - `start` / `stop` - Override a sensor's status
//! - `reset` - Forget a sensor's cursor

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
