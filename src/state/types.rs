//! State types for tracking sensor progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::types::{SensorStatus, Watermark};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete state for a set of sensors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-sensor state
    #[serde(default)]
    pub sensors: HashMap<String, SensorState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a sensor
    pub fn get_sensor(&self, sensor: &str) -> Option<&SensorState> {
        self.sensors.get(sensor)
    }

    /// Get mutable state for a sensor, creating if needed
    pub fn get_sensor_mut(&mut self, sensor: &str) -> &mut SensorState {
        self.sensors.entry(sensor.to_string()).or_default()
    }

    /// Get cursor for a sensor
    pub fn get_cursor(&self, sensor: &str) -> Option<&str> {
        self.sensors.get(sensor)?.cursor.as_deref()
    }

    /// Set cursor for a sensor
    pub fn set_cursor(&mut self, sensor: &str, cursor: String) {
        self.get_sensor_mut(sensor).cursor = Some(cursor);
    }

    /// Decoded watermark for a sensor (zero when absent or malformed)
    pub fn watermark(&self, sensor: &str) -> Watermark {
        Watermark::from_cursor(self.get_cursor(sensor))
    }
}

/// State for a single sensor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorState {
    /// Last persisted watermark, string-encoded
    #[serde(default)]
    pub cursor: Option<String>,

    /// Status set by `start`/`stop`, overriding the definition default
    #[serde(default)]
    pub status: Option<SensorStatus>,

    /// When the sensor was last evaluated
    #[serde(default)]
    pub last_tick: Option<DateTime<Utc>>,

    /// Skip reason reported by the last evaluation, if any
    #[serde(default)]
    pub last_skip_reason: Option<String>,
}

impl SensorState {
    /// Create a new empty sensor state
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective status given the definition's default
    pub fn status_or(&self, default: SensorStatus) -> SensorStatus {
        self.status.unwrap_or(default)
    }

    /// Whether at least `interval` has passed since the last tick
    pub fn is_due(&self, now: DateTime<Utc>, interval: chrono::Duration) -> bool {
        self.last_tick.map_or(true, |last| now - last >= interval)
    }
}
