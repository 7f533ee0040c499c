//! Output dispatcher: fans every synthesized record out to the configured sinks.
//!
//! # Failure model
//!
//! Sinks are independent. A sink that errors or exceeds the delivery timeout
//! is logged and skipped; the other sinks still receive the record and the
//! caller never sees the failure. There is no retry and no buffering.
//!
//! # Timing
//!
//! All deliveries of one batch run concurrently and each is bounded by the
//! dispatcher timeout, so a batch completes within roughly one timeout no
//! matter how many records it holds or how many sinks stall.

mod console;
mod http;

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, join_all};

use crate::event::TelemetryEvent;

pub use console::ConsoleSink;
pub use http::HttpIngestSink;

/// A destination for telemetry records.
pub trait Sink: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &str;

    fn deliver<'a>(&'a self, event: &'a TelemetryEvent) -> BoxFuture<'a, Result<(), SinkError>>;
}

/// Error delivering a record to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The sink could not be constructed.
    Build(String),
    /// The record could not be serialized.
    Encode(String),
    /// Connection, DNS or I/O failure.
    Transport(String),
    /// The remote endpoint answered with a non-success status.
    Status(u16),
    /// Delivery exceeded its time bound.
    Timeout(Duration),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build(message) => write!(f, "failed to build sink: {message}"),
            Self::Encode(message) => write!(f, "failed to encode record: {message}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::Status(code) => write!(f, "endpoint responded with status {code}"),
            Self::Timeout(timeout) => {
                write!(f, "delivery timed out after {}ms", timeout.as_millis())
            }
        }
    }
}

impl std::error::Error for SinkError {}

/// Fans records out to every sink with a bounded, swallowed-failure delivery.
pub struct Dispatcher {
    sinks: Vec<Arc<dyn Sink>>,
    timeout: Duration,
}

impl Dispatcher {
    /// Default per-delivery time bound.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            sinks: Vec::new(),
            timeout,
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Deliver one record to every sink.
    pub async fn dispatch(&self, event: &TelemetryEvent) {
        join_all(self.sinks.iter().map(|sink| self.deliver_to(sink.as_ref(), event))).await;
    }

    /// Deliver a tick's records to every sink.
    pub async fn dispatch_all(&self, events: &[TelemetryEvent]) {
        join_all(events.iter().map(|event| self.dispatch(event))).await;
    }

    async fn deliver_to(&self, sink: &dyn Sink, event: &TelemetryEvent) {
        let result = match tokio::time::timeout(self.timeout, sink.deliver(event)).await {
            Ok(result) => result,
            Err(_) => Err(SinkError::Timeout(self.timeout)),
        };
        if let Err(e) = result {
            tracing::debug!(
                "dropping {} record {} for sink '{}': {e}",
                event.scenario,
                event.request_id,
                sink.name()
            );
        }
    }
}
