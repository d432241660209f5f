use crate::aggregate::classifier::{classify_by_time, Bucket};
use crate::config::types::SourceConfig;
use crate::source::mapper::{retain_valid, RecordMapper};
use crate::source::timestamp::TimestampError;
use crate::source::tokenizer::{tokenize, DelimiterConfig, TokenizerError};
use std::num::NonZeroI64;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("timestamp error: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("bucket width must be at least 1ms, got {0}ms")]
    InvalidBucketWidth(i64),
}

/// Tokenize, map, filter and bucket the content of one source.
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    delimiters: DelimiterConfig,
    mapper: RecordMapper,
    bucket_width: NonZeroI64,
}

impl IngestionPipeline {
    pub fn new(
        delimiters: DelimiterConfig,
        mapper: RecordMapper,
        bucket_width_ms: i64,
    ) -> Result<Self, PipelineError> {
        let bucket_width = NonZeroI64::new(bucket_width_ms)
            .filter(|width| width.get() > 0)
            .ok_or(PipelineError::InvalidBucketWidth(bucket_width_ms))?;

        Ok(Self {
            delimiters,
            mapper,
            bucket_width,
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, PipelineError> {
        let patterns = &config.delimiters;
        let delimiters = DelimiterConfig::new(&patterns.record, &patterns.field, &patterns.trim)?;
        let mapper = RecordMapper::from_config(config)?;

        Self::new(delimiters, mapper, config.bucket_width_ms())
    }

    pub fn bucket_width_ms(&self) -> i64 {
        self.bucket_width.get()
    }

    /// Recompute the full aggregation for `blob`.
    pub fn run(&self, blob: &str) -> Vec<Bucket> {
        let records = tokenize(blob, &self.delimiters);
        let entries = retain_valid(self.mapper.map_all(&records));
        let buckets = classify_by_time(&entries, self.bucket_width);

        debug!(
            records = records.len(),
            valid = entries.len(),
            buckets = buckets.len(),
            "Ingested blob"
        );

        buckets
    }
}
