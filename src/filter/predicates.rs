//! Concrete predicates for files and messages

use super::types::{FilterSet, FilterSpec, Predicate};
use crate::error::{Error, Result};
use crate::source::{ChannelMessage, FileEntry};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern used when a filesystem sensor configures none
pub const DEFAULT_FILE_PATTERN: &str = ".*";

// ============================================================================
// File predicates
// ============================================================================

/// File base name matches a regular expression (unanchored search)
#[derive(Debug, Clone)]
pub struct FileNamePattern {
    regex: Regex,
}

impl FileNamePattern {
    /// Compile a pattern
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self { regex })
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl Predicate<FileEntry> for FileNamePattern {
    fn matches(&self, item: &FileEntry) -> bool {
        self.regex.is_match(&item.file_name)
    }

    fn describe(&self) -> String {
        format!("name ~ /{}/", self.regex.as_str())
    }
}

/// Filter configuration for filesystem sensors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilterSpec {
    /// File name regex; `None` matches every file
    #[serde(default)]
    pub pattern: Option<String>,
}

impl FileFilterSpec {
    /// Filter on a file name pattern
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
        }
    }
}

impl FilterSpec for FileFilterSpec {
    type Item = FileEntry;

    fn compile(&self) -> Result<FilterSet<FileEntry>> {
        let pattern = self.pattern.as_deref().unwrap_or(DEFAULT_FILE_PATTERN);
        Ok(FilterSet::new().with(FileNamePattern::compile(pattern)?))
    }
}

// ============================================================================
// Message predicates
// ============================================================================

/// Message text contains a keyword (case-sensitive)
#[derive(Debug, Clone)]
pub struct KeywordContains(pub String);

impl Predicate<ChannelMessage> for KeywordContains {
    fn matches(&self, item: &ChannelMessage) -> bool {
        item.text.contains(&self.0)
    }

    fn describe(&self) -> String {
        format!("text contains {:?}", self.0)
    }
}

/// Message was posted by a given author id
#[derive(Debug, Clone)]
pub struct AuthorEquals(pub String);

impl Predicate<ChannelMessage> for AuthorEquals {
    fn matches(&self, item: &ChannelMessage) -> bool {
        item.user.as_deref() == Some(self.0.as_str())
    }

    fn describe(&self) -> String {
        format!("author = {}", self.0)
    }
}

/// Filter configuration for channel sensors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFilterSpec {
    /// Substring the message text must contain
    #[serde(default)]
    pub keyword: Option<String>,
    /// Author id the message must come from
    #[serde(default)]
    pub author: Option<String>,
}

impl FilterSpec for MessageFilterSpec {
    type Item = ChannelMessage;

    fn compile(&self) -> Result<FilterSet<ChannelMessage>> {
        let mut set = FilterSet::new();
        if let Some(keyword) = self.keyword.as_ref().filter(|k| !k.is_empty()) {
            set.push(Box::new(KeywordContains(keyword.clone())));
        }
        if let Some(author) = self.author.as_ref().filter(|a| !a.is_empty()) {
            set.push(Box::new(AuthorEquals(author.clone())));
        }
        Ok(set)
    }
}
