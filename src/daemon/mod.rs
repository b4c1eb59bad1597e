//! Daemon module
//!
//! Drives a set of sensors: each running sensor is evaluated once its
//! minimum interval has elapsed, its run requests are handed to a
//! `RunSink`, and its cursor is persisted through the `StateManager`.
//!
//! Sensors are evaluated one after another, so a sensor is never evaluated
//! concurrently with itself.

mod sink;

pub use sink::{JsonLinesSink, MemorySink, RunSink};

use crate::error::{Error, Result, ResultExt};
use crate::sensor::{Evaluation, Sensor};
use crate::state::StateManager;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Daemon settings
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// How often to check which sensors are due
    pub poll_interval: Duration,
    /// Evaluate sensors whose effective status is stopped
    pub include_stopped: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            include_stopped: false,
        }
    }
}

/// Outcome of one sensor evaluation during a pass
#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// Sensor name
    pub sensor: String,
    /// The evaluation; a skip carrying the error if the tick failed
    pub evaluation: Evaluation,
    /// Why submitting or persisting failed, if it did
    pub error: Option<String>,
}

/// Runs sensors against persisted state
pub struct Daemon<K> {
    sensors: Vec<Sensor>,
    state: StateManager,
    sink: K,
    config: DaemonConfig,
}

impl<K: RunSink> Daemon<K> {
    /// Create a daemon
    pub fn new(sensors: Vec<Sensor>, state: StateManager, sink: K) -> Self {
        Self {
            sensors,
            state,
            sink,
            config: DaemonConfig::default(),
        }
    }

    /// Replace settings
    #[must_use]
    pub fn with_config(mut self, config: DaemonConfig) -> Self {
        self.config = config;
        self
    }

    /// Managed sensors
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// The run sink
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// The state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Evaluate one sensor from its stored cursor, submit its run requests
    /// and record the outcome.
    ///
    /// The cursor is only persisted after every run request was accepted by
    /// the sink; a sink failure leaves it unchanged so the runs are
    /// requested again on the next evaluation.
    pub async fn tick_sensor(&self, sensor: &Sensor, now: DateTime<Utc>) -> Result<Evaluation> {
        let cursor = self.state.get_cursor(sensor.name()).await;
        let evaluation = sensor.tick(cursor.as_deref()).await;

        for request in &evaluation.run_requests {
            self.sink
                .submit(sensor.name(), request)
                .await
                .with_context(|| format!("Failed to submit run {}", request.run_key))?;
        }

        self.state
            .record_tick(
                sensor.name(),
                now,
                evaluation.cursor.clone(),
                evaluation.skip_reason.clone(),
            )
            .await?;

        Ok(evaluation)
    }

    /// Evaluate every active sensor that is due at `now`.
    ///
    /// A sensor whose runs cannot be submitted or whose state cannot be
    /// written keeps its old cursor; the failure is recorded as its skip
    /// reason and the pass moves on to the next sensor.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();

        for sensor in &self.sensors {
            let status = self
                .state
                .status(sensor.name(), sensor.default_status())
                .await;
            if !status.is_running() && !self.config.include_stopped {
                continue;
            }

            let due = {
                let state = self.state.state().await;
                let interval = chrono::Duration::from_std(sensor.minimum_interval())
                    .unwrap_or(chrono::Duration::MAX);
                state
                    .get_sensor(sensor.name())
                    .map_or(true, |s| s.is_due(now, interval))
            };
            if !due {
                debug!("Sensor {} not due yet", sensor.name());
                continue;
            }

            let outcome = match self.tick_sensor(sensor, now).await {
                Ok(evaluation) => TickOutcome {
                    sensor: sensor.name().to_string(),
                    evaluation,
                    error: None,
                },
                Err(e) => self.record_failure(sensor, now, &e).await,
            };
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn record_failure(
        &self,
        sensor: &Sensor,
        now: DateTime<Utc>,
        e: &Error,
    ) -> TickOutcome {
        let reason = e.to_string();
        error!("Sensor {} tick failed: {reason}", sensor.name());

        if let Err(e) = self
            .state
            .record_tick(sensor.name(), now, None, Some(reason.clone()))
            .await
        {
            warn!("Could not record failure of sensor {}: {e}", sensor.name());
        }

        TickOutcome {
            sensor: sensor.name().to_string(),
            evaluation: Evaluation::skipped(reason.clone()),
            error: Some(reason),
        }
    }

    /// Run passes until Ctrl-C
    pub async fn run(&self) -> Result<()> {
        info!(
            "Daemon started with {} sensor(s), checking every {:?}",
            self.sensors.len(),
            self.config.poll_interval
        );

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl-C, shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_pass(Utc::now()).await;
                }
            }
        }

        self.state.save().await?;
        info!("Daemon stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
