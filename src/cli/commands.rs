//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sensor CDK CLI
#[derive(Parser, Debug)]
#[command(name = "sensor-cdk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Sensor definitions file (YAML)
    #[arg(short = 'f', long, global = true, default_value = "sensors.yaml")]
    pub file: PathBuf,

    /// State file (JSON)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate sensor definitions
    Validate,

    /// List sensors with their status and cursor
    List,

    /// Evaluate one sensor once
    Tick {
        /// Sensor name
        sensor: String,

        /// Evaluate from this cursor instead of the stored one (not persisted)
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Evaluate running sensors on their intervals
    Run {
        /// Run a single pass and exit
        #[arg(long)]
        once: bool,

        /// Also evaluate stopped sensors
        #[arg(long)]
        include_stopped: bool,

        /// Seconds between checks for due sensors
        #[arg(long, default_value = "1")]
        poll_interval: u64,
    },

    /// Mark a sensor as running
    Start {
        /// Sensor name
        sensor: String,
    },

    /// Mark a sensor as stopped
    Stop {
        /// Sensor name
        sensor: String,
    },

    /// Forget a sensor's cursor so it re-evaluates from the beginning
    Reset {
        /// Sensor name
        sensor: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
