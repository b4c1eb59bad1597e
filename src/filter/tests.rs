//! Tests for filter predicates

use super::*;
use crate::error::Error;
use crate::source::{ChannelMessage, FileEntry};
use crate::types::Watermark;
use std::path::PathBuf;
use test_case::test_case;

fn file(name: &str) -> FileEntry {
    FileEntry {
        path: PathBuf::from("/data").join(name),
        file_name: name.to_string(),
        size: 1,
        modified: Watermark::new(1.0).unwrap(),
        directory: PathBuf::from("/data"),
    }
}

fn message(text: &str, user: Option<&str>) -> ChannelMessage {
    ChannelMessage {
        ts: "10.000100".to_string(),
        timestamp: Watermark::new(10.0001).unwrap(),
        text: text.to_string(),
        user: user.map(ToString::to_string),
        channel: "C1".to_string(),
        thread_ts: None,
    }
}

// ============================================================================
// File Filter Tests
// ============================================================================

#[test_case(r".*\.csv$", "a.csv", true ; "csv matches")]
#[test_case(r".*\.csv$", "b.txt", false ; "txt rejected")]
#[test_case(r".*\.csv$", "a.csv.bak", false ; "anchored end")]
#[test_case(r"report", "daily_report.pdf", true ; "unanchored search")]
#[test_case(r"^report", "daily_report.pdf", false ; "anchored start")]
fn test_file_name_pattern(pattern: &str, name: &str, expected: bool) {
    let filter = FileFilterSpec::pattern(pattern).compile().unwrap();
    assert_eq!(filter.matches(&file(name)), expected);
}

#[test]
fn test_default_file_pattern_matches_everything() {
    let filter = FileFilterSpec::default().compile().unwrap();
    assert_eq!(filter.len(), 1);
    assert!(filter.matches(&file("anything")));
    assert!(filter.matches(&file(".hidden")));
}

#[test]
fn test_invalid_pattern_fails_whole_compile() {
    let err = FileFilterSpec::pattern("[unclosed").compile().unwrap_err();
    match err {
        Error::InvalidPattern { pattern, .. } => assert_eq!(pattern, "[unclosed"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_pattern_matches_name_not_directory() {
    let filter = FileFilterSpec::pattern("data").compile().unwrap();
    // the directory is "/data" but the name is not
    assert!(!filter.matches(&file("a.csv")));
}

// ============================================================================
// Message Filter Tests
// ============================================================================

#[test]
fn test_empty_message_filter_matches_all() {
    let filter = MessageFilterSpec::default().compile().unwrap();
    assert!(filter.is_empty());
    assert!(filter.matches(&message("hello", None)));
    assert_eq!(filter.describe(), "any");
}

#[test]
fn test_keyword_filter() {
    let spec = MessageFilterSpec {
        keyword: Some("deploy".to_string()),
        author: None,
    };
    let filter = spec.compile().unwrap();

    assert!(filter.matches(&message("deploy now", Some("U1"))));
    assert!(filter.matches(&message("please redeploy", Some("U1"))));
    assert!(!filter.matches(&message("hello", Some("U1"))));
    // case-sensitive
    assert!(!filter.matches(&message("Deploy now", Some("U1"))));
}

#[test]
fn test_keyword_and_author_are_anded() {
    let spec = MessageFilterSpec {
        keyword: Some("deploy".to_string()),
        author: Some("U1".to_string()),
    };
    let filter = spec.compile().unwrap();

    assert_eq!(filter.len(), 2);
    assert!(filter.matches(&message("deploy now", Some("U1"))));
    assert!(!filter.matches(&message("deploy now", Some("U2"))));
    assert!(!filter.matches(&message("deploy now", None)));
    assert!(!filter.matches(&message("hello", Some("U1"))));
    assert_eq!(filter.describe(), "text contains \"deploy\" and author = U1");
}

#[test]
fn test_empty_strings_are_ignored() {
    let spec = MessageFilterSpec {
        keyword: Some(String::new()),
        author: Some(String::new()),
    };
    assert!(spec.compile().unwrap().is_empty());
}

#[test]
fn test_filter_set_builder() {
    let filter = FilterSet::new()
        .with(KeywordContains("a".to_string()))
        .with(AuthorEquals("U9".to_string()));
    assert_eq!(filter.len(), 2);
    assert!(filter.matches(&message("abc", Some("U9"))));
}
