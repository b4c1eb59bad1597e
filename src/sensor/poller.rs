//! Watermark poller
//!
//! Read watermark, fetch candidates, filter, emit one run request per
//! surviving candidate, advance the watermark.

use super::types::{Evaluation, EvaluationStats, RunTarget};
use crate::filter::{FilterSet, FilterSpec};
use crate::source::{Candidate, CandidateSource, SourceKind};
use crate::types::Watermark;
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// Object-safe view of a source paired with its filter
#[async_trait]
pub trait Poller: Send + Sync {
    /// Kind of source polled
    fn kind(&self) -> SourceKind;

    /// Human-readable source location
    fn location(&self) -> String;

    /// Run one evaluation. Never fails: problems become a skip reason.
    async fn poll(&self, watermark: Watermark, target: &RunTarget) -> Evaluation;
}

/// A candidate source with a filter spec compiled on every poll
pub struct WatermarkPoller<S, F> {
    source: S,
    filter: F,
}

impl<S, F> WatermarkPoller<S, F>
where
    S: CandidateSource,
    F: FilterSpec<Item = S::Item>,
{
    /// Pair a source with a filter
    pub fn new(source: S, filter: F) -> Self {
        Self { source, filter }
    }

    /// The wrapped source
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[async_trait]
impl<S, F> Poller for WatermarkPoller<S, F>
where
    S: CandidateSource,
    F: FilterSpec<Item = S::Item>,
{
    fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    fn location(&self) -> String {
        self.source.location()
    }

    async fn poll(&self, watermark: Watermark, target: &RunTarget) -> Evaluation {
        let filter = match self.filter.compile() {
            Ok(filter) => filter,
            Err(e) => return skip(target, &e),
        };

        let candidates = match self.source.fetch(watermark).await {
            Ok(candidates) => candidates,
            Err(e) => return skip(target, &e),
        };

        evaluate_candidates(
            watermark,
            &filter,
            candidates,
            target,
            self.source.kind(),
            &self.source.location(),
        )
    }
}

/// Turn fetched candidates into an evaluation.
///
/// - candidates at or before `watermark` are ignored
/// - the new cursor is the latest timestamp among all newer candidates,
///   matched or not, and is only set when at least one newer candidate exists
/// - run requests are ordered by timestamp, then identity
pub fn evaluate_candidates<C: Candidate>(
    watermark: Watermark,
    filter: &FilterSet<C>,
    candidates: Vec<C>,
    target: &RunTarget,
    kind: SourceKind,
    location: &str,
) -> Evaluation {
    let mut stats = EvaluationStats {
        candidates: candidates.len(),
        ..EvaluationStats::default()
    };
    let mut newest: Option<Watermark> = None;
    let mut matched = Vec::new();

    for candidate in candidates {
        let ts = candidate.timestamp();
        if !ts.is_after(watermark) {
            stats.stale += 1;
            continue;
        }
        newest = Some(newest.map_or(ts, |n| n.max(ts)));

        if filter.matches(&candidate) {
            matched.push(candidate);
        } else {
            debug!("{} filtered out: {}", target.sensor, candidate.identity());
            stats.filtered_out += 1;
        }
    }

    matched.sort_by(|a, b| {
        a.timestamp()
            .seconds()
            .total_cmp(&b.timestamp().seconds())
            .then_with(|| a.identity().cmp(&b.identity()))
    });

    let run_requests: Vec<_> = matched
        .iter()
        .map(|c| target.run_request(c, kind))
        .collect();

    let skip_reason = if !run_requests.is_empty() {
        None
    } else if newest.is_some() {
        Some(format!(
            "No new {} in {location} matched filter ({})",
            item_noun(kind),
            filter.describe()
        ))
    } else {
        Some(format!("No new {} in {location}", item_noun(kind)))
    };

    Evaluation {
        run_requests,
        cursor: newest.map(Watermark::to_cursor),
        skip_reason,
        stats,
    }
}

/// Skip the evaluation, logging at error level when retrying cannot help
fn skip(target: &RunTarget, e: &crate::error::Error) -> Evaluation {
    if e.is_transient() {
        warn!("Sensor {}: {e}", target.sensor);
    } else {
        error!("Sensor {}: {e}", target.sensor);
    }
    Evaluation::skipped(e.to_string())
}

fn item_noun(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Filesystem => "files",
        SourceKind::Channel => "messages",
    }
}
