//! YAML parser for sensor definitions
//!
//! Parses and validates sensor definition files, and builds runnable
//! sensors from them.

use crate::error::{Error, Result};
use crate::filter::{FileFilterSpec, FilterSpec, MessageFilterSpec};
use crate::http::{HttpClient, HttpClientConfig};
use crate::loader::types::{
    ChannelDefinition, FilesystemDefinition, Secrets, SensorDefinition, SensorsFile,
    SourceDefinition,
};
use crate::sensor::{Sensor, WatermarkPoller};
use crate::source::{ChannelSource, DirectorySource, SourceKind};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Largest page size accepted by `conversations.history`
const MAX_PAGE_SIZE: u32 = 1000;

/// Load sensor definitions from a YAML file
///
/// # Examples
///
/// ```ignore
/// let file = load_sensors("sensors.yaml")?;
/// let sensors = file.build_all(&Secrets::from_env())?;
/// ```
pub fn load_sensors(path: impl AsRef<Path>) -> Result<SensorsFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read sensors file '{}': {e}",
            path.display()
        ))
    })?;
    load_sensors_from_str(&content)
}

/// Load sensor definitions from a YAML string
pub fn load_sensors_from_str(yaml: &str) -> Result<SensorsFile> {
    let file: SensorsFile = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse sensors YAML: {e}")))?;

    validate_sensors(&file)?;
    Ok(file)
}

/// Validate a definitions file
fn validate_sensors(file: &SensorsFile) -> Result<()> {
    let mut seen = HashSet::new();
    for sensor in &file.sensors {
        validate_sensor(sensor)?;
        if !seen.insert(sensor.name.as_str()) {
            return Err(Error::config(format!(
                "Duplicate sensor name: {}",
                sensor.name
            )));
        }
    }
    Ok(())
}

/// Validate a single definition
fn validate_sensor(sensor: &SensorDefinition) -> Result<()> {
    if sensor.name.trim().is_empty() {
        return Err(Error::config("Sensor name cannot be empty"));
    }

    if sensor.job.trim().is_empty() {
        return Err(Error::config(format!(
            "Sensor '{}' job cannot be empty",
            sensor.name
        )));
    }

    if sensor.minimum_interval_seconds == 0 {
        return Err(Error::invalid_value(
            format!("{}.minimum_interval_seconds", sensor.name),
            "must be greater than zero",
        ));
    }

    if sensor.evaluation_timeout_seconds == 0 {
        return Err(Error::invalid_value(
            format!("{}.evaluation_timeout_seconds", sensor.name),
            "must be greater than zero",
        ));
    }

    match &sensor.source {
        SourceDefinition::Filesystem(fs) => {
            if fs.directory.as_os_str().is_empty() {
                return Err(Error::config(format!(
                    "Sensor '{}' directory cannot be empty",
                    sensor.name
                )));
            }
            if fs.max_entries == 0 {
                return Err(Error::invalid_value(
                    format!("{}.max_entries", sensor.name),
                    "must be greater than zero",
                ));
            }
        }
        SourceDefinition::Channel(ch) => {
            if ch.channel.trim().is_empty() {
                return Err(Error::config(format!(
                    "Sensor '{}' channel cannot be empty",
                    sensor.name
                )));
            }
            if !(1..=MAX_PAGE_SIZE).contains(&ch.page_size) {
                return Err(Error::invalid_value(
                    format!("{}.page_size", sensor.name),
                    format!("must be between 1 and {MAX_PAGE_SIZE}"),
                ));
            }
            if ch.max_pages == 0 {
                return Err(Error::invalid_value(
                    format!("{}.max_pages", sensor.name),
                    "must be greater than zero",
                ));
            }
            url::Url::parse(&ch.api_base_url)?;
        }
    }

    Ok(())
}

impl SensorsFile {
    /// Build every sensor, failing on the first missing secret
    pub fn build_all(&self, secrets: &Secrets) -> Result<Vec<Sensor>> {
        self.sensors.iter().map(|s| s.build(secrets)).collect()
    }
}

impl SensorDefinition {
    /// Kind of source this sensor polls
    pub fn kind(&self) -> SourceKind {
        match &self.source {
            SourceDefinition::Filesystem(_) => SourceKind::Filesystem,
            SourceDefinition::Channel(_) => SourceKind::Channel,
        }
    }

    /// Human-readable source location
    pub fn location(&self) -> String {
        match &self.source {
            SourceDefinition::Filesystem(fs) => fs.directory.display().to_string(),
            SourceDefinition::Channel(ch) => ch.channel.clone(),
        }
    }

    /// Problems that will make every evaluation skip, such as a pattern
    /// that does not compile. Loading still succeeds.
    pub fn warnings(&self) -> Vec<String> {
        let compiled = match &self.source {
            SourceDefinition::Filesystem(fs) => file_filter(fs).compile().map(|_| ()),
            SourceDefinition::Channel(ch) => message_filter(ch).compile().map(|_| ()),
        };
        compiled.err().map(|e| e.to_string()).into_iter().collect()
    }

    /// Build a runnable sensor, resolving secrets
    pub fn build(&self, secrets: &Secrets) -> Result<Sensor> {
        let sensor = match &self.source {
            SourceDefinition::Filesystem(fs) => {
                let source = DirectorySource::new(&fs.directory)
                    .recursive(fs.recursive)
                    .max_depth(fs.max_depth)
                    .max_entries(fs.max_entries);
                Sensor::new(
                    &self.name,
                    &self.job,
                    WatermarkPoller::new(source, file_filter(fs)),
                )
            }
            SourceDefinition::Channel(ch) => {
                let token = ch.token.resolve(secrets)?;
                let config = HttpClientConfig::builder()
                    .base_url(&ch.api_base_url)
                    .timeout(Duration::from_secs(ch.http.timeout_secs))
                    .max_retries(ch.http.max_retries)
                    .rate_limit(ch.http.rate_limit.clone())
                    .bearer_token(token)
                    .build();
                let source = ChannelSource::new(HttpClient::with_config(config)?, &ch.channel)
                    .page_size(ch.page_size)
                    .max_pages(ch.max_pages);
                Sensor::new(
                    &self.name,
                    &self.job,
                    WatermarkPoller::new(source, message_filter(ch)),
                )
            }
        };

        Ok(sensor
            .with_minimum_interval(Duration::from_secs(self.minimum_interval_seconds))
            .with_evaluation_timeout(Duration::from_secs(self.evaluation_timeout_seconds))
            .with_default_status(self.default_status))
    }
}

fn file_filter(fs: &FilesystemDefinition) -> FileFilterSpec {
    FileFilterSpec {
        pattern: fs.pattern.clone(),
    }
}

fn message_filter(ch: &ChannelDefinition) -> MessageFilterSpec {
    MessageFilterSpec {
        keyword: ch.keyword.clone(),
        author: ch.author.clone(),
    }
}
