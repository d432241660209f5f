use crate::aggregate::classifier::Bucket;
use crate::config::types::{Config, SourceConfig};
use crate::pipeline::ingest::{IngestionPipeline, PipelineError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown source '{0}'")]
    UnknownSource(String),

    #[error("duplicate source '{0}'")]
    DuplicateSource(String),

    #[error("source '{name}': {source}")]
    Pipeline {
        name: String,
        #[source]
        source: PipelineError,
    },
}

/// The published aggregation of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Number of replacements so far, zero before the first ingestion
    pub generation: u64,
    pub buckets: Arc<[Bucket]>,
}

impl Default for Aggregation {
    fn default() -> Self {
        Self {
            generation: 0,
            buckets: Arc::from(Vec::<Bucket>::new()),
        }
    }
}

/// One configured source and its current aggregation.
#[derive(Debug)]
pub struct Source {
    config: SourceConfig,
    pipeline: IngestionPipeline,
    current: watch::Sender<Aggregation>,
    // Held across recompute and publish so generations follow arrival order
    ingest_lock: Mutex<()>,
}

impl Source {
    pub fn new(config: SourceConfig) -> Result<Self, PipelineError> {
        let pipeline = IngestionPipeline::from_config(&config)?;
        let (current, _) = watch::channel(Aggregation::default());

        Ok(Self {
            config,
            pipeline,
            current,
            ingest_lock: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn bucket_width_ms(&self) -> i64 {
        self.pipeline.bucket_width_ms()
    }

    pub fn aggregation(&self) -> Aggregation {
        self.current.borrow().clone()
    }

    pub fn buckets(&self) -> Arc<[Bucket]> {
        Arc::clone(&self.current.borrow().buckets)
    }

    pub fn subscribe(&self) -> watch::Receiver<Aggregation> {
        self.current.subscribe()
    }

    /// Recompute from `blob` and replace the published aggregation.
    ///
    /// Concurrent calls are serialized, so the published aggregation always
    /// belongs to the call that took the highest generation.
    pub fn ingest(&self, blob: &str) -> Aggregation {
        // The lock guards no data, so poisoning is ignored
        let _guard = self
            .ingest_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let buckets: Arc<[Bucket]> = Arc::from(self.pipeline.run(blob));

        let mut published = Aggregation::default();
        self.current.send_modify(|aggregation| {
            aggregation.generation += 1;
            aggregation.buckets = buckets;
            published = aggregation.clone();
        });

        published
    }
}

/// Fixed set of sources, built once at startup.
#[derive(Debug)]
pub struct SourceRegistry {
    sources: Vec<Arc<Source>>,
    by_name: HashMap<String, usize>,
}

impl SourceRegistry {
    pub fn new(configs: impl IntoIterator<Item = SourceConfig>) -> Result<Self, RegistryError> {
        let mut sources = Vec::new();
        let mut by_name = HashMap::new();

        for config in configs {
            let name = config.name.clone();
            if by_name.contains_key(&name) {
                return Err(RegistryError::DuplicateSource(name));
            }

            let source = Source::new(config).map_err(|source| RegistryError::Pipeline {
                name: name.clone(),
                source,
            })?;
            info!(
                source = %name,
                location = %source.config().location,
                bucket_width_ms = source.bucket_width_ms(),
                "Registered source"
            );

            by_name.insert(name, sources.len());
            sources.push(Arc::new(source));
        }

        Ok(Self { sources, by_name })
    }

    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        Self::new(config.sources.iter().cloned())
    }

    /// Sources in configuration order.
    pub fn sources(&self) -> &[Arc<Source>] {
        &self.sources
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.name())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Source>> {
        self.by_name.get(name).map(|&i| &self.sources[i])
    }

    fn require(&self, name: &str) -> Result<&Arc<Source>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownSource(name.to_string()))
    }

    pub fn ingest(&self, name: &str, blob: &str) -> Result<Aggregation, RegistryError> {
        Ok(self.require(name)?.ingest(blob))
    }

    pub fn buckets(&self, name: &str) -> Result<Arc<[Bucket]>, RegistryError> {
        Ok(self.require(name)?.buckets())
    }

    pub fn aggregation(&self, name: &str) -> Result<Aggregation, RegistryError> {
        Ok(self.require(name)?.aggregation())
    }

    pub fn subscribe(&self, name: &str) -> Result<watch::Receiver<Aggregation>, RegistryError> {
        Ok(self.require(name)?.subscribe())
    }
}
