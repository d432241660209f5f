use crate::config::types::{FieldConfig, FieldKind, SourceConfig};
use crate::source::timestamp::{TimestampError, TimestampParser};
use crate::source::tokenizer::FieldRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Typed value of a mapped field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
}

/// Typed projection of one field record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Epoch milliseconds, None when the timestamp field did not parse
    pub timestamp: Option<i64>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl LogEntry {
    pub fn is_valid(&self) -> bool {
        self.timestamp.is_some()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text value of a field, for fields mapped as strings.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub index: usize,
    pub name: String,
    pub kind: FieldKind,
}

impl From<&FieldConfig> for FieldMapping {
    fn from(config: &FieldConfig) -> Self {
        Self {
            index: config.index,
            name: config.name.clone(),
            kind: config.kind,
        }
    }
}

/// Maps field records to log entries using a positional schema.
#[derive(Debug, Clone)]
pub struct RecordMapper {
    timestamp_index: usize,
    timestamp: TimestampParser,
    fields: Vec<FieldMapping>,
}

impl RecordMapper {
    pub fn new(timestamp_index: usize, timestamp: TimestampParser, fields: Vec<FieldMapping>) -> Self {
        Self {
            timestamp_index,
            timestamp,
            fields,
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, TimestampError> {
        let timestamp = TimestampParser::new(&config.timestamp.format)?;
        let fields = config.fields.iter().map(FieldMapping::from).collect();

        Ok(Self::new(config.timestamp.index, timestamp, fields))
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Map one record. Out-of-range indices leave the field absent.
    pub fn map(&self, record: &FieldRecord) -> LogEntry {
        let timestamp = record
            .get(self.timestamp_index)
            .and_then(|value| self.timestamp.parse(value));

        let fields = self
            .fields
            .iter()
            .filter_map(|mapping| {
                let raw = record.get(mapping.index)?;
                let value = convert(raw, mapping.kind)?;
                Some((mapping.name.clone(), value))
            })
            .collect();

        LogEntry { timestamp, fields }
    }

    pub fn map_all(&self, records: &[FieldRecord]) -> Vec<LogEntry> {
        records.iter().map(|record| self.map(record)).collect()
    }
}

fn convert(raw: &str, kind: FieldKind) -> Option<FieldValue> {
    match kind {
        FieldKind::String => Some(FieldValue::Text(raw.to_string())),
        FieldKind::Int => raw.parse().ok().map(FieldValue::Int),
        FieldKind::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(FieldValue::Float),
    }
}

/// Drop every entry whose timestamp did not parse.
pub fn retain_valid(entries: Vec<LogEntry>) -> Vec<LogEntry> {
    entries.into_iter().filter(LogEntry::is_valid).collect()
}
