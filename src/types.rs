//! Common types used throughout Sensor CDK
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Watermark
// ============================================================================

/// Last-seen timestamp boundary of a sensor, in seconds since the epoch.
///
/// Always finite and non-negative. Persisted between evaluations as a cursor
/// string; an absent or malformed cursor reads back as [`Watermark::ZERO`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Watermark(f64);

impl Watermark {
    /// The epoch; every sensor starts here
    pub const ZERO: Watermark = Watermark(0.0);

    /// Create a watermark, rejecting negative and non-finite values
    pub fn new(seconds: f64) -> Option<Self> {
        if seconds.is_finite() && seconds >= 0.0 {
            // collapse -0.0 so it never prints as "-0"
            Some(Self(seconds + 0.0))
        } else {
            None
        }
    }

    /// Decode a persisted cursor, falling back to zero
    pub fn from_cursor(cursor: Option<&str>) -> Self {
        cursor
            .and_then(|c| c.parse::<Watermark>().ok())
            .unwrap_or(Self::ZERO)
    }

    /// Convert a filesystem timestamp
    pub fn from_system_time(time: SystemTime) -> Result<Self> {
        let since_epoch = time
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Other(format!("Timestamp before epoch: {e}")))?;
        Ok(Self(since_epoch.as_secs_f64()))
    }

    /// Seconds since the epoch
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Encode as a cursor string (shortest round-trip decimal)
    pub fn to_cursor(self) -> String {
        self.to_string()
    }

    /// Strictly later than `other`.
    ///
    /// Candidates equal to the watermark were already seen by a previous
    /// evaluation, so only strictly newer ones qualify.
    pub fn is_after(self, other: Watermark) -> bool {
        self.0 > other.0
    }

    /// The later of two watermarks
    #[must_use]
    pub fn max(self, other: Watermark) -> Self {
        if other.is_after(self) {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Watermark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| Error::state(format!("Malformed cursor '{s}': {e}")))?;
        Self::new(value).ok_or_else(|| Error::state(format!("Cursor out of range: '{s}'")))
    }
}

// ============================================================================
// Sensor Status
// ============================================================================

/// Activation state of a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    /// Evaluated by the daemon on its interval
    #[serde(alias = "active")]
    Running,
    /// Registered but not evaluated until started
    #[default]
    #[serde(alias = "paused")]
    Stopped,
}

impl SensorStatus {
    /// Whether the daemon should evaluate this sensor
    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use test_case::test_case;

    #[test_case(None, 0.0 ; "absent")]
    #[test_case(Some(""), 0.0 ; "empty")]
    #[test_case(Some("abc"), 0.0 ; "garbage")]
    #[test_case(Some("-5"), 0.0 ; "negative")]
    #[test_case(Some("NaN"), 0.0 ; "nan")]
    #[test_case(Some("inf"), 0.0 ; "infinite")]
    #[test_case(Some("50"), 50.0 ; "integer")]
    #[test_case(Some(" 1700000000.0001 "), 1_700_000_000.0001 ; "fractional with whitespace")]
    fn test_watermark_from_cursor(cursor: Option<&str>, expected: f64) {
        assert_eq!(Watermark::from_cursor(cursor).seconds(), expected);
    }

    #[test]
    fn test_watermark_cursor_format() {
        assert_eq!(Watermark::new(200.0).unwrap().to_cursor(), "200");
        assert_eq!(Watermark::new(20.5).unwrap().to_cursor(), "20.5");
        assert_eq!(Watermark::new(-0.0).unwrap().to_cursor(), "0");
        assert_eq!(Watermark::ZERO.to_cursor(), "0");
    }

    #[test]
    fn test_watermark_strict_ordering() {
        let w = Watermark::new(100.0).unwrap();
        assert!(!w.is_after(w));
        assert!(Watermark::new(100.5).unwrap().is_after(w));
        assert!(!Watermark::new(99.0).unwrap().is_after(w));
    }

    #[test]
    fn test_watermark_max() {
        let a = Watermark::new(10.0).unwrap();
        let b = Watermark::new(20.0).unwrap();
        assert_eq!(a.max(b), b);
        assert_eq!(b.max(a), b);
    }

    #[test]
    fn test_watermark_from_system_time() {
        let time = UNIX_EPOCH + Duration::from_secs(1234);
        assert_eq!(Watermark::from_system_time(time).unwrap().to_cursor(), "1234");
    }

    #[test]
    fn test_sensor_status_serde() {
        let status: SensorStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, SensorStatus::Running);

        let status: SensorStatus = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(status, SensorStatus::Stopped);

        assert_eq!(SensorStatus::default(), SensorStatus::Stopped);
        assert_eq!(SensorStatus::Running.to_string(), "running");
    }
}
