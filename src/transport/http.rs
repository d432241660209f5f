use super::{Transport, TransportError};
use crate::source::RawBlob;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// Fetches a URL with GET, once or on every poll interval.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    poll_interval: Duration,
    follow: bool,
}

impl HttpTransport {
    pub fn new(url: String, poll_interval: Duration, follow: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            poll_interval,
            follow,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn http_error(&self, source: reqwest::Error) -> TransportError {
        TransportError::Http {
            url: self.url.clone(),
            source,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&mut self) -> Result<RawBlob, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.http_error(e))?;

        response.text().await.map_err(|e| self.http_error(e))
    }

    async fn wait_for_change(&mut self) -> Result<bool, TransportError> {
        if !self.follow {
            return Ok(false);
        }

        // No change detection over HTTP: every poll is a full re-fetch
        sleep(self.poll_interval).await;
        Ok(true)
    }
}
