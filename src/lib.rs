pub mod aggregate;
pub mod cli;
pub mod config;
pub mod pipeline;
pub mod registry;
pub mod source;
pub mod transport;
pub mod web;

pub use aggregate::Bucket;
pub use pipeline::IngestionPipeline;
pub use registry::{Aggregation, SourceRegistry};
