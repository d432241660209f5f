pub mod mapper;
pub mod timestamp;
pub mod tokenizer;

pub use mapper::{retain_valid, FieldMapping, FieldValue, LogEntry, RecordMapper};
pub use timestamp::{TimestampError, TimestampFormat, TimestampParser};
pub use tokenizer::{tokenize, DelimiterConfig, FieldRecord, TokenizerError};

/// Full current content of one log source.
pub type RawBlob = String;
