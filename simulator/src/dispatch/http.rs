//! Remote ingestion sink: POSTs each record as JSON.

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::{Sink, SinkError};
use crate::event::TelemetryEvent;

/// Best-effort delivery to an HTTP ingestion endpoint.
///
/// The underlying client carries its own request timeout so abandoned
/// requests are torn down even when the caller stops polling.
pub struct HttpIngestSink {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpIngestSink {
    /// # Errors
    ///
    /// Returns `SinkError::Build` if the HTTP client cannot be constructed
    /// (for example when no TLS backend is available).
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Build(e.to_string()))?;
        Ok(Self::with_client(url, client, timeout))
    }

    /// Use a preconfigured client. `timeout` is only reported in errors;
    /// the client's own timeout governs requests.
    #[must_use]
    pub fn with_client(url: &str, client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            client,
            url: url.to_string(),
            timeout,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, event: &TelemetryEvent) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout(self.timeout)
                } else {
                    SinkError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SinkError::Status(status.as_u16()))
        }
    }
}

impl Sink for HttpIngestSink {
    fn name(&self) -> &'static str {
        "ingest"
    }

    fn deliver<'a>(&'a self, event: &'a TelemetryEvent) -> BoxFuture<'a, Result<(), SinkError>> {
        self.post(event).boxed()
    }
}
