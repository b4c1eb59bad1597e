//! Sensor types
//!
//! Run requests and evaluation results produced by a sensor tick.

use crate::source::{Candidate, SourceKind};
use crate::types::{JsonValue, Watermark};
use serde::Serialize;
use std::collections::BTreeMap;

/// A request to start one downstream run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRequest {
    /// Deduplication key, unique to the candidate's identity and timestamp
    pub run_key: String,
    /// Job to start
    pub job_name: String,
    /// Configuration handed to the run (file or message metadata)
    pub run_config: JsonValue,
    /// Tags attached to the run
    pub tags: BTreeMap<String, String>,
}

/// Where a sensor's run requests go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTarget {
    /// Sensor name
    pub sensor: String,
    /// Job started for each surviving candidate
    pub job_name: String,
}

impl RunTarget {
    /// Create a target
    pub fn new(sensor: impl Into<String>, job_name: impl Into<String>) -> Self {
        Self {
            sensor: sensor.into(),
            job_name: job_name.into(),
        }
    }

    /// Build the run request for a candidate
    pub fn run_request<C: Candidate>(&self, candidate: &C, kind: SourceKind) -> RunRequest {
        let mut tags = BTreeMap::new();
        tags.insert("sensor".to_string(), self.sensor.clone());
        tags.insert("source".to_string(), kind.to_string());
        tags.insert("timestamp".to_string(), candidate.timestamp().to_cursor());

        RunRequest {
            run_key: candidate.run_key(),
            job_name: self.job_name.clone(),
            run_config: candidate.payload(),
            tags,
        }
    }
}

/// Counters from one evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationStats {
    /// Candidates returned by the source
    pub candidates: usize,
    /// Candidates at or before the watermark
    pub stale: usize,
    /// New candidates rejected by the filter
    pub filtered_out: usize,
}

/// Result of one sensor evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    /// Runs to start, ordered by increasing candidate timestamp
    pub run_requests: Vec<RunRequest>,
    /// New cursor to persist; `None` leaves the previous cursor in place
    pub cursor: Option<String>,
    /// Why no run was requested
    pub skip_reason: Option<String>,
    /// Counters
    pub stats: EvaluationStats,
}

impl Evaluation {
    /// An evaluation that requested nothing and keeps the cursor
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skip_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Whether any run was requested
    pub fn has_runs(&self) -> bool {
        !self.run_requests.is_empty()
    }

    /// Watermark to use for the next evaluation.
    ///
    /// Never lower than `previous`.
    pub fn next_watermark(&self, previous: Watermark) -> Watermark {
        previous.max(Watermark::from_cursor(self.cursor.as_deref()))
    }
}
