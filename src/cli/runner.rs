//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::daemon::{Daemon, DaemonConfig, JsonLinesSink};
use crate::error::{Error, Result};
use crate::loader::{load_sensors, Secrets, SensorDefinition, SensorsFile};
use crate::state::StateManager;
use crate::types::SensorStatus;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::List => self.list().await,
            Commands::Tick { sensor, cursor } => self.tick(sensor, cursor.as_deref()).await,
            Commands::Run {
                once,
                include_stopped,
                poll_interval,
            } => self.run_daemon(*once, *include_stopped, *poll_interval).await,
            Commands::Start { sensor } => self.set_status(sensor, SensorStatus::Running).await,
            Commands::Stop { sensor } => self.set_status(sensor, SensorStatus::Stopped).await,
            Commands::Reset { sensor } => self.reset(sensor).await,
        }
    }

    /// Load sensor definitions
    fn load_sensors(&self) -> Result<SensorsFile> {
        load_sensors(&self.cli.file)
    }

    /// Find one definition by name
    fn find_sensor<'a>(&self, file: &'a SensorsFile, name: &str) -> Result<&'a SensorDefinition> {
        file.get(name).ok_or_else(|| Error::sensor_not_found(name))
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// State that survives the process, required by status and reset commands
    fn load_persistent_state(&self, command: &str) -> Result<StateManager> {
        match &self.cli.state {
            Some(path) => StateManager::from_file(path),
            None => Err(Error::config(format!(
                "'{command}' needs a state file, pass --state <PATH>"
            ))),
        }
    }

    /// Validate sensor definitions
    fn validate(&self) -> Result<()> {
        let file = self.load_sensors()?;

        for sensor in &file.sensors {
            for warning in sensor.warnings() {
                self.output_message(&json!({
                    "type": "LOG",
                    "log": {
                        "level": "WARN",
                        "message": format!("Sensor '{}' will skip every evaluation: {warning}", sensor.name)
                    }
                }));
            }
        }

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "{} is valid with {} sensors",
                    self.cli.file.display(),
                    file.sensors.len()
                )
            }
        }));

        Ok(())
    }

    /// List sensors with effective status and stored cursor
    async fn list(&self) -> Result<()> {
        let file = self.load_sensors()?;
        let state = self.load_state()?;
        let snapshot = state.state().await;

        let sensors: Vec<Value> = file
            .sensors
            .iter()
            .map(|def| {
                let stored = snapshot.get_sensor(&def.name);
                json!({
                    "name": def.name,
                    "type": def.kind(),
                    "location": def.location(),
                    "job": def.job,
                    "minimum_interval_seconds": def.minimum_interval_seconds,
                    "status": stored.map_or(def.default_status, |s| s.status_or(def.default_status)),
                    "cursor": stored.and_then(|s| s.cursor.clone()),
                    "last_tick": stored.and_then(|s| s.last_tick),
                    "last_skip_reason": stored.and_then(|s| s.last_skip_reason.clone()),
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "SENSORS",
            "sensors": sensors
        }));

        Ok(())
    }

    /// Evaluate one sensor once
    async fn tick(&self, name: &str, cursor_override: Option<&str>) -> Result<()> {
        let file = self.load_sensors()?;
        let sensor = self.find_sensor(&file, name)?.build(&Secrets::from_env())?;
        let state = self.load_state()?;

        let cursor = match cursor_override {
            Some(cursor) => Some(cursor.to_string()),
            None => state.get_cursor(name).await,
        };
        let evaluation = sensor.tick(cursor.as_deref()).await;

        if cursor_override.is_none() {
            state
                .record_tick(
                    name,
                    Utc::now(),
                    evaluation.cursor.clone(),
                    evaluation.skip_reason.clone(),
                )
                .await?;
        }

        self.output_message(&json!({
            "type": "EVALUATION",
            "sensor": name,
            "previous_cursor": cursor,
            "evaluation": evaluation
        }));

        Ok(())
    }

    /// Run the daemon
    async fn run_daemon(&self, once: bool, include_stopped: bool, poll_interval: u64) -> Result<()> {
        let file = self.load_sensors()?;
        let sensors = file.build_all(&Secrets::from_env())?;
        let state = self.load_state()?;

        let sink = match self.cli.format {
            OutputFormat::Json => JsonLinesSink::new(),
            OutputFormat::Pretty => JsonLinesSink::pretty(),
        };
        let daemon = Daemon::new(sensors, state, sink).with_config(DaemonConfig {
            poll_interval: Duration::from_secs(poll_interval.max(1)),
            include_stopped,
        });

        if once {
            let outcomes = daemon.run_pass(Utc::now()).await;
            daemon.state().save().await?;
            info!("Evaluated {} sensor(s)", outcomes.len());

            let failed: Vec<_> = outcomes
                .iter()
                .filter(|o| o.error.is_some())
                .map(|o| o.sensor.as_str())
                .collect();
            if !failed.is_empty() {
                return Err(Error::Other(format!(
                    "Sensor(s) failed: {}",
                    failed.join(", ")
                )));
            }
            return Ok(());
        }

        daemon.run().await
    }

    /// Override a sensor's status
    async fn set_status(&self, name: &str, status: SensorStatus) -> Result<()> {
        let file = self.load_sensors()?;
        self.find_sensor(&file, name)?;
        let state = self.load_persistent_state(self.command_name())?;

        state.set_status(name, status).await?;

        self.output_message(&json!({
            "type": "STATUS",
            "sensor": name,
            "status": status
        }));

        Ok(())
    }

    /// Reset a sensor's cursor
    async fn reset(&self, name: &str) -> Result<()> {
        let file = self.load_sensors()?;
        self.find_sensor(&file, name)?;
        let state = self.load_persistent_state(self.command_name())?;

        let previous = state.get_cursor(name).await;
        state.clear_cursor(name).await?;

        self.output_message(&json!({
            "type": "RESET",
            "sensor": name,
            "previous_cursor": previous
        }));

        Ok(())
    }

    fn command_name(&self) -> &'static str {
        match self.cli.command {
            Commands::Validate => "validate",
            Commands::List => "list",
            Commands::Tick { .. } => "tick",
            Commands::Run { .. } => "run",
            Commands::Start { .. } => "start",
            Commands::Stop { .. } => "stop",
            Commands::Reset { .. } => "reset",
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
