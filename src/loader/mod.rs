//! YAML Loader module
//!
//! Parse sensor definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `SensorsFile` - the definitions file
//! - `SensorDefinition` - one sensor, tagged by source `type`
//! - `Secrets` - credentials injected when building sensors
//! - YAML parsing with validation
//!
//! ```yaml
//! sensors:
//!   - name: csv_drop
//!     type: filesystem
//!     directory: /data/incoming
//!     pattern: '.*\.csv$'
//!     job: load_csv
//!   - name: deploys
//!     type: channel
//!     channel: C0123456
//!     token: { env: SLACK_BOT_TOKEN }
//!     keyword: deploy
//!     job: run_deploy
//!     default_status: running
//! ```

mod parser;
mod types;

pub use parser::{load_sensors, load_sensors_from_str};
pub use types::{
    ChannelDefinition, FilesystemDefinition, HttpDefinition, SecretRef, Secrets,
    SensorDefinition, SensorsFile, SourceDefinition,
};
