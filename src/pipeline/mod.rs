pub mod ingest;
pub mod worker;

pub use ingest::{IngestionPipeline, PipelineError};
pub use worker::{run_source_worker, spawn_worker, spawn_workers};
