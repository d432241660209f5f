pub mod file;
pub mod http;

use crate::config::types::{Location, SourceConfig, TransportConfig};
use crate::source::RawBlob;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use thiserror::Error;

pub use file::FileTransport;
pub use http::HttpTransport;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http error fetching '{url}': {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Delivers the full current content of one source over time.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Read the full current content.
    async fn fetch(&mut self) -> Result<RawBlob, TransportError>;

    /// Wait until the content may have changed.
    ///
    /// Returns false once no further changes will be reported.
    async fn wait_for_change(&mut self) -> Result<bool, TransportError>;
}

/// Turn a transport into a stream of blobs. The first item is the current content.
pub fn subscribe<T: Transport>(transport: T) -> BoxStream<'static, Result<RawBlob, TransportError>> {
    stream::unfold((transport, true), |(mut transport, first)| async move {
        if !first {
            match transport.wait_for_change().await {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some((Err(e), (transport, false))),
            }
        }

        let item = transport.fetch().await;
        Some((item, (transport, false)))
    })
    .boxed()
}

/// Build the blob stream for a configured source.
pub fn for_source(
    source: &SourceConfig,
    config: &TransportConfig,
) -> BoxStream<'static, Result<RawBlob, TransportError>> {
    match source.location() {
        Location::File(path) => subscribe(FileTransport::new(
            path,
            config.poll_interval,
            config.follow,
        )),
        Location::Url(url) => subscribe(HttpTransport::new(
            url,
            config.poll_interval,
            config.follow,
        )),
    }
}
