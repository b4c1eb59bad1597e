//! Candidate and source types
//!
//! A candidate is one discoverable unit (a file, a chat message) with an
//! identity and a timestamp. Sources enumerate candidates newer than a
//! watermark.

use crate::error::Result;
use crate::types::{JsonValue, Watermark};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;

// ============================================================================
// Candidate
// ============================================================================

/// An item discovered by a source and considered for triggering
pub trait Candidate: Send + Sync {
    /// Stable identity (file path, message ts)
    fn identity(&self) -> String;

    /// Modification or send time
    fn timestamp(&self) -> Watermark;

    /// Deterministic key unique to (identity, timestamp).
    ///
    /// Re-evaluating the same candidate yields the same key, so a host
    /// with run-key deduplication will not start it twice.
    fn run_key(&self) -> String;

    /// Run configuration handed to the downstream job
    fn payload(&self) -> JsonValue;
}

/// A file seen in a watched directory
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Full path
    pub path: PathBuf,
    /// Base name
    pub file_name: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time
    pub modified: Watermark,
    /// The watched directory the file was found under
    pub directory: PathBuf,
}

impl Candidate for FileEntry {
    fn identity(&self) -> String {
        self.path.display().to_string()
    }

    fn timestamp(&self) -> Watermark {
        self.modified
    }

    fn run_key(&self) -> String {
        format!("{}:{}", self.path.display(), self.modified)
    }

    fn payload(&self) -> JsonValue {
        json!({
            "path": self.path.display().to_string(),
            "file_name": self.file_name,
            "size": self.size,
            "modified": self.modified.seconds(),
            "directory": self.directory.display().to_string(),
        })
    }
}

/// A message posted to a chat channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    /// Raw message timestamp as returned by the API (also its id)
    pub ts: String,
    /// Parsed send time
    pub timestamp: Watermark,
    /// Message text
    pub text: String,
    /// Author id, absent for some bot and system messages
    pub user: Option<String>,
    /// Channel the message was posted to
    pub channel: String,
    /// Parent message ts when posted in a thread
    pub thread_ts: Option<String>,
}

impl Candidate for ChannelMessage {
    fn identity(&self) -> String {
        self.ts.clone()
    }

    fn timestamp(&self) -> Watermark {
        self.timestamp
    }

    fn run_key(&self) -> String {
        format!("{}:{}", self.channel, self.ts)
    }

    fn payload(&self) -> JsonValue {
        json!({
            "text": self.text,
            "user": self.user,
            "channel": self.channel,
            "ts": self.ts,
            "thread_ts": self.thread_ts,
        })
    }
}

// ============================================================================
// Source
// ============================================================================

/// Which kind of source a sensor polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A local directory
    Filesystem,
    /// A chat channel
    Channel,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filesystem => write!(f, "filesystem"),
            Self::Channel => write!(f, "channel"),
        }
    }
}

/// Enumerates candidates from one location
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Candidate type produced by this source
    type Item: Candidate;

    /// Kind of source
    fn kind(&self) -> SourceKind;

    /// Human-readable location (directory path, channel id)
    fn location(&self) -> String;

    /// Fetch candidates that may be newer than `after`.
    ///
    /// An error means the source as a whole could not be enumerated
    /// (missing directory, API failure). Problems with a single item are
    /// logged and the item is left out instead.
    ///
    /// Sources may return items at or before `after`; the poller drops
    /// them.
    async fn fetch(&self, after: Watermark) -> Result<Vec<Self::Item>>;
}
