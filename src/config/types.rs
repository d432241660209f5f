use crate::source::tokenizer::{
    DEFAULT_FIELD_SEPARATOR, DEFAULT_RECORD_SEPARATOR, DEFAULT_TRIM_PATTERN,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    /// File path or http(s) URL
    pub location: String,
    #[serde(default)]
    pub delimiters: DelimiterPatterns,
    pub timestamp: TimestampConfig,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default = "default_bucket_width", with = "humantime_serde")]
    pub bucket_width: Duration,
}

fn default_bucket_width() -> Duration {
    Duration::from_secs(5 * 60)
}

impl SourceConfig {
    pub fn location(&self) -> Location {
        if self.location.starts_with("http://") || self.location.starts_with("https://") {
            Location::Url(self.location.clone())
        } else {
            Location::File(PathBuf::from(&self.location))
        }
    }

    /// Bucket width in milliseconds, saturating at i64::MAX.
    pub fn bucket_width_ms(&self) -> i64 {
        i64::try_from(self.bucket_width.as_millis()).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Url(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelimiterPatterns {
    #[serde(default = "default_record")]
    pub record: String,
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_trim")]
    pub trim: String,
}

fn default_record() -> String {
    DEFAULT_RECORD_SEPARATOR.to_string()
}

fn default_field() -> String {
    DEFAULT_FIELD_SEPARATOR.to_string()
}

fn default_trim() -> String {
    DEFAULT_TRIM_PATTERN.to_string()
}

impl Default for DelimiterPatterns {
    fn default() -> Self {
        Self {
            record: default_record(),
            field: default_field(),
            trim: default_trim(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampConfig {
    pub index: usize,
    /// strptime format string, 'iso8601', 'epoch', or 'epoch_ms'
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub index: usize,
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Int,
    Float,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(default = "default_follow")]
    pub follow: bool,
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_follow() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            follow: default_follow(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}
