//! Local sink: one JSON object per line.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, ready};

use super::{Sink, SinkError};
use crate::event::TelemetryEvent;

/// Writes each record synchronously as a JSON line.
///
/// Delivery always reports success. Encoding or write failures are logged,
/// never returned.
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn write_line(&self, event: &TelemetryEvent) -> Result<(), SinkError> {
        let mut line =
            serde_json::to_vec(event).map_err(|e| SinkError::Encode(e.to_string()))?;
        line.push(b'\n');

        // Keep writing after a panic in another writer.
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer
            .write_all(&line)
            .and_then(|()| writer.flush())
            .map_err(|e| SinkError::Transport(e.to_string()))
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn deliver<'a>(&'a self, event: &'a TelemetryEvent) -> BoxFuture<'a, Result<(), SinkError>> {
        if let Err(e) = self.write_line(event) {
            tracing::warn!("console sink failed to write record {}: {e}", event.request_id);
        }
        ready(Ok(())).boxed()
    }
}
