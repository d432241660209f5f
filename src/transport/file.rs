use super::{Transport, TransportError};
use crate::source::RawBlob;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::time::sleep;
use tracing::debug;

/// Identity of one observed file state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

/// Polls a file's metadata and re-reads the whole file when it changes.
#[derive(Debug)]
pub struct FileTransport {
    path: PathBuf,
    poll_interval: Duration,
    follow: bool,
    last_seen: Option<Fingerprint>,
}

impl FileTransport {
    pub fn new(path: PathBuf, poll_interval: Duration, follow: bool) -> Self {
        Self {
            path,
            poll_interval,
            follow,
            last_seen: None,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn fingerprint(&self) -> Option<Fingerprint> {
        let metadata = tokio::fs::metadata(&self.path).await.ok()?;
        Some(Fingerprint {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    fn io_error(&self, source: std::io::Error) -> TransportError {
        TransportError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn fetch(&mut self) -> Result<RawBlob, TransportError> {
        // Fingerprint first so a write racing the read is picked up next poll
        self.last_seen = self.fingerprint().await;

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn wait_for_change(&mut self) -> Result<bool, TransportError> {
        if !self.follow {
            return Ok(false);
        }

        loop {
            sleep(self.poll_interval).await;

            let current = self.fingerprint().await;
            if current != self.last_seen {
                debug!(path = %self.path.display(), "File changed");
                return Ok(true);
            }
        }
    }
}
