//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.

use super::types::State;
use crate::error::{Error, Result};
use crate::types::{SensorStatus, Watermark};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// State manager for persisting and loading sensor state
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file
    path: PathBuf,
    /// Current state (cached)
    state: Arc<RwLock<State>>,
    /// Whether to auto-save on every update
    auto_save: bool,
}

impl StateManager {
    /// Create a new state manager with the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: Arc::new(RwLock::new(State::new())),
            auto_save: true,
        }
    }

    /// Create a state manager with auto-save disabled
    pub fn without_auto_save(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: Arc::new(RwLock::new(State::new())),
            auto_save: false,
        }
    }

    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(State::new())),
            auto_save: false,
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?
        } else {
            State::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
            auto_save: true,
        })
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json)
            .map_err(|e| Error::state(format!("Failed to parse state JSON: {e}")))?;

        Ok(Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(state)),
            auto_save: false,
        })
    }

    /// Load state from file
    pub async fn load(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;

        let loaded_state: State = serde_json::from_str(&contents)
            .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?;

        let mut state = self.state.write().await;
        *state = loaded_state;

        Ok(())
    }

    /// Save current state to file
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = self.to_json_pretty().await?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        Ok(())
    }

    /// Get a read lock on the current state
    pub async fn state(&self) -> tokio::sync::RwLockReadGuard<'_, State> {
        self.state.read().await
    }

    /// Export state as JSON string
    pub async fn to_json(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Export state as pretty-printed JSON string
    pub async fn to_json_pretty(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Get cursor for a sensor
    pub async fn get_cursor(&self, sensor: &str) -> Option<String> {
        let state = self.state.read().await;
        state.get_cursor(sensor).map(ToString::to_string)
    }

    /// Decoded watermark for a sensor
    pub async fn watermark(&self, sensor: &str) -> Watermark {
        let state = self.state.read().await;
        state.watermark(sensor)
    }

    /// Set cursor for a sensor
    pub async fn set_cursor(&self, sensor: &str, cursor: String) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.set_cursor(sensor, cursor);
        }

        self.auto_save().await
    }

    /// Effective status of a sensor given its definition default
    pub async fn status(&self, sensor: &str, default: SensorStatus) -> SensorStatus {
        let state = self.state.read().await;
        state
            .get_sensor(sensor)
            .map_or(default, |s| s.status_or(default))
    }

    /// Override the status of a sensor
    pub async fn set_status(&self, sensor: &str, status: SensorStatus) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.get_sensor_mut(sensor).status = Some(status);
        }

        self.auto_save().await
    }

    /// Record the outcome of one evaluation.
    ///
    /// The cursor is only replaced when `cursor` is `Some`; a skipped
    /// evaluation leaves the previous watermark in place.
    pub async fn record_tick(
        &self,
        sensor: &str,
        at: DateTime<Utc>,
        cursor: Option<String>,
        skip_reason: Option<String>,
    ) -> Result<()> {
        {
            let mut state = self.state.write().await;
            let entry = state.get_sensor_mut(sensor);
            entry.last_tick = Some(at);
            entry.last_skip_reason = skip_reason;
            if let Some(cursor) = cursor {
                entry.cursor = Some(cursor);
            }
        }

        self.auto_save().await
    }

    /// Clear all state
    pub async fn clear(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            *state = State::new();
        }

        self.auto_save().await
    }

    /// Reset the watermark of a single sensor, keeping its status override
    pub async fn clear_cursor(&self, sensor: &str) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if let Some(entry) = state.sensors.get_mut(sensor) {
                entry.cursor = None;
                entry.last_tick = None;
                entry.last_skip_reason = None;
            }
        }

        self.auto_save().await
    }

    /// Clear all state for a specific sensor
    pub async fn clear_sensor(&self, sensor: &str) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.sensors.remove(sensor);
        }

        self.auto_save().await
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    async fn auto_save(&self) -> Result<()> {
        if self.auto_save {
            self.save().await?;
        }
        Ok(())
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
            auto_save: self.auto_save,
        }
    }
}
