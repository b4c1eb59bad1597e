//! Sensor module
//!
//! A sensor binds a poller to a target job, a minimum interval and an
//! initial activation state, and turns a persisted cursor into run
//! requests.
//!
//! # Overview
//!
//! - `Sensor` - one configured poller, evaluated via `tick`
//! - `WatermarkPoller` - fetch, filter, emit, advance
//! - `Evaluation` / `RunRequest` - what a tick produces
//!
//! Evaluation is single-threaded and non-reentrant per sensor. Every failure
//! during a tick (unreachable source, invalid filter, API error, timeout)
//! yields zero run requests and leaves the cursor unchanged.

mod poller;
mod types;

pub use poller::{evaluate_candidates, Poller, WatermarkPoller};
pub use types::{Evaluation, EvaluationStats, RunRequest, RunTarget};

use crate::source::SourceKind;
use crate::types::{SensorStatus, Watermark};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default minimum time between two evaluations
pub const DEFAULT_MINIMUM_INTERVAL: Duration = Duration::from_secs(30);

/// Default upper bound on one evaluation
pub const DEFAULT_EVALUATION_TIMEOUT: Duration = Duration::from_secs(60);

/// A configured, evaluable sensor
pub struct Sensor {
    target: RunTarget,
    poller: Box<dyn Poller>,
    minimum_interval: Duration,
    evaluation_timeout: Duration,
    default_status: SensorStatus,
}

impl Sensor {
    /// Create a sensor starting `job_name` for each new candidate
    pub fn new(
        name: impl Into<String>,
        job_name: impl Into<String>,
        poller: impl Poller + 'static,
    ) -> Self {
        Self {
            target: RunTarget::new(name, job_name),
            poller: Box::new(poller),
            minimum_interval: DEFAULT_MINIMUM_INTERVAL,
            evaluation_timeout: DEFAULT_EVALUATION_TIMEOUT,
            default_status: SensorStatus::default(),
        }
    }

    /// Set minimum interval between evaluations
    #[must_use]
    pub fn with_minimum_interval(mut self, interval: Duration) -> Self {
        self.minimum_interval = interval;
        self
    }

    /// Set evaluation timeout
    #[must_use]
    pub fn with_evaluation_timeout(mut self, timeout: Duration) -> Self {
        self.evaluation_timeout = timeout;
        self
    }

    /// Set initial activation state
    #[must_use]
    pub fn with_default_status(mut self, status: SensorStatus) -> Self {
        self.default_status = status;
        self
    }

    /// Sensor name
    pub fn name(&self) -> &str {
        &self.target.sensor
    }

    /// Target job
    pub fn job_name(&self) -> &str {
        &self.target.job_name
    }

    /// Kind of source polled
    pub fn kind(&self) -> SourceKind {
        self.poller.kind()
    }

    /// Source location
    pub fn location(&self) -> String {
        self.poller.location()
    }

    /// Minimum interval between evaluations
    pub fn minimum_interval(&self) -> Duration {
        self.minimum_interval
    }

    /// Initial activation state
    pub fn default_status(&self) -> SensorStatus {
        self.default_status
    }

    /// Evaluate once against a persisted cursor.
    ///
    /// An absent or malformed cursor is treated as zero. The returned
    /// evaluation's `cursor` is `Some` only when the watermark advanced.
    pub async fn tick(&self, cursor: Option<&str>) -> Evaluation {
        let watermark = Watermark::from_cursor(cursor);
        debug!(
            "Evaluating sensor {} ({} {}) from watermark {watermark}",
            self.name(),
            self.kind(),
            self.location()
        );

        let evaluation = match tokio::time::timeout(
            self.evaluation_timeout,
            self.poller.poll(watermark, &self.target),
        )
        .await
        {
            Ok(evaluation) => evaluation,
            Err(_) => {
                let timeout_ms = self.evaluation_timeout.as_millis() as u64;
                warn!("Sensor {} timed out after {timeout_ms}ms", self.name());
                Evaluation::skipped(
                    crate::error::Error::EvaluationTimeout { timeout_ms }.to_string(),
                )
            }
        };

        match &evaluation.skip_reason {
            None => info!(
                "Sensor {} requested {} run(s), cursor {}",
                self.name(),
                evaluation.run_requests.len(),
                evaluation.cursor.as_deref().unwrap_or("unchanged")
            ),
            Some(reason) => info!("Sensor {} skipped: {reason}", self.name()),
        }

        evaluation
    }
}

impl std::fmt::Debug for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sensor")
            .field("name", &self.target.sensor)
            .field("job_name", &self.target.job_name)
            .field("kind", &self.poller.kind())
            .field("location", &self.poller.location())
            .field("minimum_interval", &self.minimum_interval)
            .field("default_status", &self.default_status)
            .finish_non_exhaustive()
    }
}
