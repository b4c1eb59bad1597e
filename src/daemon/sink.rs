//! Run sinks
//!
//! Where run requests go once a sensor has produced them.

use crate::error::{Error, Result};
use crate::sensor::RunRequest;
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use tokio::sync::Mutex;

/// Receives run requests from the daemon
#[async_trait]
pub trait RunSink: Send + Sync {
    /// Accept one run request produced by `sensor`
    async fn submit(&self, sensor: &str, request: &RunRequest) -> Result<()>;
}

#[derive(Serialize)]
struct RunLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    sensor: &'a str,
    #[serde(flatten)]
    request: &'a RunRequest,
}

/// Writes each run request to stdout as one JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesSink {
    pretty: bool,
}

impl JsonLinesSink {
    /// Compact, one request per line
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

#[async_trait]
impl RunSink for JsonLinesSink {
    async fn submit(&self, sensor: &str, request: &RunRequest) -> Result<()> {
        let line = RunLine {
            kind: "RUN_REQUEST",
            sensor,
            request,
        };
        let json = if self.pretty {
            serde_json::to_string_pretty(&line)?
        } else {
            serde_json::to_string(&line)?
        };

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}").map_err(Error::Io)?;
        stdout.flush().map_err(Error::Io)?;
        Ok(())
    }
}

/// Keeps run requests in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    requests: Mutex<Vec<(String, RunRequest)>>,
}

impl MemorySink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, with the submitting sensor
    pub async fn requests(&self) -> Vec<(String, RunRequest)> {
        self.requests.lock().await.clone()
    }

    /// Run keys received so far
    pub async fn run_keys(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|(_, r)| r.run_key.clone())
            .collect()
    }
}

#[async_trait]
impl RunSink for MemorySink {
    async fn submit(&self, sensor: &str, request: &RunRequest) -> Result<()> {
        self.requests
            .lock()
            .await
            .push((sensor.to_string(), request.clone()));
        Ok(())
    }
}

#[async_trait]
impl<T: RunSink + ?Sized> RunSink for std::sync::Arc<T> {
    async fn submit(&self, sensor: &str, request: &RunRequest) -> Result<()> {
        (**self).submit(sensor, request).await
    }
}
