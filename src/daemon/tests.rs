//! Tests for the daemon

use super::*;
use crate::filter::FileFilterSpec;
use crate::sensor::WatermarkPoller;
use crate::source::DirectorySource;
use crate::types::SensorStatus;
use chrono::TimeZone;
use pretty_assertions::assert_eq;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tempfile::{tempdir, TempDir};

fn write_file(path: &Path, mtime: u64) {
    std::fs::write(path, "x").unwrap();
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(UNIX_EPOCH + Duration::from_secs(mtime))
        .unwrap();
}

fn directory_sensor(name: &str, dir: &Path, status: SensorStatus) -> Sensor {
    Sensor::new(
        name,
        "load",
        WatermarkPoller::new(DirectorySource::new(dir), FileFilterSpec::default()),
    )
    .with_minimum_interval(Duration::from_secs(30))
    .with_default_status(status)
}

fn fixture() -> (TempDir, Arc<MemorySink>, Daemon<Arc<MemorySink>>) {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.csv"), 100);
    write_file(&dir.path().join("b.csv"), 200);

    let sink = Arc::new(MemorySink::new());
    let daemon = Daemon::new(
        vec![directory_sensor("inbox", dir.path(), SensorStatus::Running)],
        StateManager::in_memory(),
        Arc::clone(&sink),
    );
    (dir, sink, daemon)
}

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

#[tokio::test]
async fn test_tick_sensor_submits_and_persists() {
    let (_dir, sink, daemon) = fixture();

    let evaluation = daemon
        .tick_sensor(&daemon.sensors()[0], at(1_000))
        .await
        .unwrap();

    assert_eq!(evaluation.run_requests.len(), 2);
    assert_eq!(sink.requests().await.len(), 2);
    assert_eq!(
        daemon.state().get_cursor("inbox").await.as_deref(),
        Some("200")
    );
}

#[tokio::test]
async fn test_second_pass_requests_nothing_new() {
    let (dir, sink, daemon) = fixture();

    daemon.run_pass(at(1_000)).await;
    let outcomes = daemon.run_pass(at(1_100)).await;

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].evaluation.run_requests.is_empty());
    assert_eq!(sink.requests().await.len(), 2);

    write_file(&dir.path().join("c.csv"), 300);
    daemon.run_pass(at(1_200)).await;

    let keys = sink.run_keys().await;
    assert_eq!(keys.len(), 3);
    assert!(keys[2].ends_with("c.csv:300"));
}

#[tokio::test]
async fn test_pass_respects_minimum_interval() {
    let (_dir, _sink, daemon) = fixture();

    assert_eq!(daemon.run_pass(at(1_000)).await.len(), 1);
    assert!(daemon.run_pass(at(1_010)).await.is_empty());
    assert_eq!(daemon.run_pass(at(1_030)).await.len(), 1);
}

#[tokio::test]
async fn test_pass_skips_stopped_sensors() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.csv"), 100);
    let sink = Arc::new(MemorySink::new());
    let daemon = Daemon::new(
        vec![directory_sensor("idle", dir.path(), SensorStatus::Stopped)],
        StateManager::in_memory(),
        Arc::clone(&sink),
    );

    assert!(daemon.run_pass(at(1_000)).await.is_empty());

    daemon
        .state()
        .set_status("idle", SensorStatus::Running)
        .await
        .unwrap();
    assert_eq!(daemon.run_pass(at(1_000)).await.len(), 1);
    assert_eq!(sink.requests().await.len(), 1);
}

#[tokio::test]
async fn test_include_stopped() {
    let dir = tempdir().unwrap();
    let daemon = Daemon::new(
        vec![directory_sensor("idle", dir.path(), SensorStatus::Stopped)],
        StateManager::in_memory(),
        MemorySink::new(),
    )
    .with_config(DaemonConfig {
        include_stopped: true,
        ..DaemonConfig::default()
    });

    assert_eq!(daemon.run_pass(at(1_000)).await.len(), 1);
}

#[tokio::test]
async fn test_skip_keeps_cursor_and_records_reason() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");
    let state = StateManager::in_memory();
    state.set_cursor("lost", "42".to_string()).await.unwrap();

    let daemon = Daemon::new(
        vec![directory_sensor("lost", &missing, SensorStatus::Running)],
        state,
        MemorySink::new(),
    );
    daemon.run_pass(at(1_000)).await;

    let state = daemon.state().state().await;
    let entry = state.get_sensor("lost").unwrap();
    assert_eq!(entry.cursor.as_deref(), Some("42"));
    assert_eq!(entry.last_tick, Some(at(1_000)));
    assert!(entry
        .last_skip_reason
        .as_deref()
        .unwrap()
        .contains("Directory not found"));
}

/// Rejects runs of one sensor and records everything else
struct RejectingSink {
    reject: &'static str,
    accepted: MemorySink,
}

#[async_trait::async_trait]
impl RunSink for RejectingSink {
    async fn submit(&self, sensor: &str, request: &crate::sensor::RunRequest) -> Result<()> {
        if sensor == self.reject {
            return Err(Error::Other("sink unavailable".to_string()));
        }
        self.accepted.submit(sensor, request).await
    }
}

#[tokio::test]
async fn test_failing_sink_keeps_cursor_and_pass_continues() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("a.csv"), 100);
    let daemon = Daemon::new(
        vec![
            directory_sensor("broken", dir.path(), SensorStatus::Running),
            directory_sensor("inbox", dir.path(), SensorStatus::Running),
        ],
        StateManager::in_memory(),
        RejectingSink {
            reject: "broken",
            accepted: MemorySink::new(),
        },
    );

    let outcomes = daemon.run_pass(at(1_000)).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].sensor, "broken");
    let error = outcomes[0].error.as_deref().unwrap();
    assert!(error.contains("Failed to submit run"));
    assert!(error.contains("sink unavailable"));
    assert!(outcomes[0].evaluation.run_requests.is_empty());
    assert!(outcomes[1].error.is_none());

    assert_eq!(daemon.state().get_cursor("broken").await, None);
    assert_eq!(
        daemon.state().get_cursor("inbox").await.as_deref(),
        Some("100")
    );
    assert_eq!(daemon.sink().accepted.requests().await.len(), 1);

    let state = daemon.state().state().await;
    let broken = state.get_sensor("broken").unwrap();
    assert_eq!(broken.last_tick, Some(at(1_000)));
    assert!(broken
        .last_skip_reason
        .as_deref()
        .unwrap()
        .contains("sink unavailable"));
}
