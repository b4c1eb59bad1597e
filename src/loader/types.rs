//! Loader types
//!
//! Declarative sensor definition types for YAML parsing.

use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use crate::source::{DEFAULT_API_BASE_URL, DEFAULT_MAX_DEPTH, DEFAULT_MAX_ENTRIES};
use crate::types::SensorStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// ============================================================================
// Sensors File
// ============================================================================

/// Top-level definitions file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorsFile {
    /// Sensor definitions, in declaration order
    #[serde(default)]
    pub sensors: Vec<SensorDefinition>,
}

impl SensorsFile {
    /// Find a definition by name
    pub fn get(&self, name: &str) -> Option<&SensorDefinition> {
        self.sensors.iter().find(|s| s.name == name)
    }

    /// Sensor names in declaration order
    pub fn names(&self) -> Vec<&str> {
        self.sensors.iter().map(|s| s.name.as_str()).collect()
    }
}

// ============================================================================
// Sensor Definition
// ============================================================================

/// One sensor: common settings plus a source-specific section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SensorDefinition {
    /// Unique sensor name
    pub name: String,
    /// Job started for each new candidate
    pub job: String,
    /// Minimum seconds between evaluations
    #[serde(default = "default_minimum_interval")]
    pub minimum_interval_seconds: u64,
    /// Upper bound on one evaluation, in seconds
    #[serde(default = "default_evaluation_timeout")]
    pub evaluation_timeout_seconds: u64,
    /// Activation state before any override
    #[serde(default)]
    pub default_status: SensorStatus,
    /// Source-specific settings
    #[serde(flatten)]
    pub source: SourceDefinition,
}

fn default_minimum_interval() -> u64 {
    30
}

fn default_evaluation_timeout() -> u64 {
    60
}

/// Source-specific settings, selected by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDefinition {
    /// Watch a local directory
    Filesystem(FilesystemDefinition),
    /// Watch a chat channel
    Channel(ChannelDefinition),
}

/// Directory watch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilesystemDefinition {
    /// Directory to watch
    pub directory: PathBuf,
    /// Regex matched against file base names
    #[serde(default)]
    pub pattern: Option<String>,
    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,
    /// Maximum subdirectory depth when recursive
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum files returned per evaluation
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

/// Channel watch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChannelDefinition {
    /// Channel id
    pub channel: String,
    /// API token
    pub token: SecretRef,
    /// Substring required in message text
    #[serde(default)]
    pub keyword: Option<String>,
    /// Author id required on messages
    #[serde(default)]
    pub author: Option<String>,
    /// API root
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Messages requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Pages fetched per evaluation
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpDefinition,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    crate::source::DEFAULT_PAGE_SIZE
}

fn default_max_pages() -> u32 {
    crate::source::DEFAULT_MAX_PAGES
}

// ============================================================================
// HTTP Definition
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpDefinition {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Maximum retries
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Client-side rate limit
    #[serde(default)]
    pub rate_limit: RateLimiterConfig,
}

impl Default for HttpDefinition {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            rate_limit: RateLimiterConfig::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

// ============================================================================
// Secrets
// ============================================================================

/// Where a secret value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretRef {
    /// Named lookup in the injected secrets
    Env(String),
    /// Literal value
    Value(String),
}

impl SecretRef {
    /// Resolve against a set of secrets
    pub fn resolve(&self, secrets: &Secrets) -> Result<String> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Env(name) => secrets
                .get(name)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
                .ok_or_else(|| Error::missing_secret(name)),
        }
    }
}

/// Named secret values available when building sensors
#[derive(Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// No secrets
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process environment
    pub fn from_env() -> Self {
        Self {
            values: std::env::vars().collect(),
        }
    }

    /// Add a secret
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add a secret in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Look up a secret
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.values.keys().collect();
        names.sort();
        f.debug_struct("Secrets").field("names", &names).finish()
    }
}
