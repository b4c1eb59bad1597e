// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Sensor Connector Development Kit (CDK)
//!
//! Cursor-driven change sensors for data orchestration. A sensor polls a
//! source, compares what it finds against a persisted watermark, and
//! requests one downstream run per new item.
//!
//! ## Features
//!
//! - **Directory sensors**: new or modified files, filtered by name regex
//! - **Channel sensors**: new chat messages, filtered by keyword and author
//! - **Watermark cursors**: exactly the items newer than the last evaluation
//! - **YAML definitions**: declarative sensors with injected secrets
//! - **Daemon**: interval scheduling with persisted state and start/stop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sensor_cdk::{load_sensors, Result, Secrets};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let file = load_sensors("sensors.yaml")?;
//!     let sensors = file.build_all(&Secrets::from_env())?;
//!
//!     let evaluation = sensors[0].tick(None).await;
//!     for request in &evaluation.run_requests {
//!         println!("{} -> {}", request.run_key, request.job_name);
//!     }
//!     // Persist evaluation.cursor for the next tick
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Sensor::tick                            │
//! │   cursor → watermark → fetch → filter → run requests + cursor   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴──┬──────────────┬───────────────┐
//! │    Source    │      Filter      │    State     │    Daemon     │
//! ├──────────────┼──────────────────┼──────────────┼───────────────┤
//! │ Directory    │ Name regex       │ Cursor       │ Interval      │
//! │ Channel      │ Keyword          │ Status       │ Run sink      │
//! │ (HTTP, retry,│ Author           │ Last tick    │ Ctrl-C        │
//! │  rate limit) │                  │              │               │
//! └──────────────┴──────────────────┴──────────────┴───────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Add docs before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the CDK
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Persisted cursors and sensor status
pub mod state;

/// Candidate filters
pub mod filter;

/// Candidate sources (directories, chat channels)
pub mod source;

/// Sensors and the watermark poller
pub mod sensor;

/// YAML loader for sensor definitions
pub mod loader;

/// Interval scheduling of sensors
pub mod daemon;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use loader::{load_sensors, load_sensors_from_str, Secrets, SensorsFile};
pub use sensor::{Evaluation, RunRequest, Sensor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
