use regex::Regex;
use thiserror::Error;

pub const DEFAULT_RECORD_SEPARATOR: &str = r"\n";
pub const DEFAULT_FIELD_SEPARATOR: &str = r#"[-"]"#;
pub const DEFAULT_TRIM_PATTERN: &str = r#"["\[\]]"#;

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("invalid {which} pattern '{pattern}': {source}")]
    InvalidPattern {
        which: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Compiled delimiter patterns for one source.
#[derive(Debug, Clone)]
pub struct DelimiterConfig {
    record: Regex,
    field: Regex,
    trim: Regex,
}

impl DelimiterConfig {
    /// Compile the record separator, field separator and trim patterns.
    pub fn new(record: &str, field: &str, trim: &str) -> Result<Self, TokenizerError> {
        Ok(Self {
            record: compile("record", record)?,
            field: compile("field", field)?,
            trim: compile("trim", trim)?,
        })
    }

    pub fn record_separator(&self) -> &str {
        self.record.as_str()
    }

    pub fn field_separator(&self) -> &str {
        self.field.as_str()
    }

    pub fn trim_pattern(&self) -> &str {
        self.trim.as_str()
    }
}

impl Default for DelimiterConfig {
    fn default() -> Self {
        Self {
            record: Regex::new(DEFAULT_RECORD_SEPARATOR).expect("default record separator compiles"),
            field: Regex::new(DEFAULT_FIELD_SEPARATOR).expect("default field separator compiles"),
            trim: Regex::new(DEFAULT_TRIM_PATTERN).expect("default trim pattern compiles"),
        }
    }
}

fn compile(which: &'static str, pattern: &str) -> Result<Regex, TokenizerError> {
    Regex::new(pattern).map_err(|source| TokenizerError::InvalidPattern {
        which,
        pattern: pattern.to_string(),
        source,
    })
}

/// Positional fields of one tokenized record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord(Vec<String>);

impl FieldRecord {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// Field at `index`, or `None` when the record is shorter.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

/// Split a raw blob into field records.
///
/// The blob is trimmed, split into records on the record separator and each
/// record is split into fields on the field separator. Every field is trimmed
/// and stripped of all trim-pattern matches. Malformed records simply produce
/// fewer or more fields.
pub fn tokenize(blob: &str, delimiters: &DelimiterConfig) -> Vec<FieldRecord> {
    delimiters
        .record
        .split(blob.trim())
        .map(|record| tokenize_record(record, delimiters))
        .collect()
}

fn tokenize_record(record: &str, delimiters: &DelimiterConfig) -> FieldRecord {
    let fields = delimiters
        .field
        .split(record)
        .map(|field| delimiters.trim.replace_all(field.trim(), "").into_owned())
        .collect();

    FieldRecord(fields)
}
