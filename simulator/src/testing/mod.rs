//! Sink doubles and fixtures shared by unit and end-to-end tests.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::DateTime;
use futures::FutureExt;
use futures::future::{BoxFuture, pending, ready};
use uuid::Uuid;

use crate::dispatch::{Sink, SinkError};
use crate::event::{Level, TelemetryEvent};

/// A healthy record tagged with `scenario`.
pub fn sample_event(scenario: &str) -> TelemetryEvent {
    TelemetryEvent {
        timestamp: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap_or_default(),
        service: "auth".to_string(),
        level: Level::Info,
        message: "Authentication successful".to_string(),
        request_id: Uuid::nil(),
        ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        endpoint: "/api/login".to_string(),
        method: "POST".to_string(),
        latency_ms: 300,
        status_code: 200,
        cpu_pct: Some(40.0),
        memory_mb: None,
        error_type: None,
        retry_count: None,
        scenario: scenario.to_string(),
    }
}

/// Keeps a copy of every delivered record.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<TelemetryEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn deliver<'a>(&'a self, event: &'a TelemetryEvent) -> BoxFuture<'a, Result<(), SinkError>> {
        self.events.lock().unwrap().push(event.clone());
        ready(Ok(())).boxed()
    }
}

/// Fails every delivery, counting attempts.
#[derive(Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Sink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn deliver<'a>(&'a self, _event: &'a TelemetryEvent) -> BoxFuture<'a, Result<(), SinkError>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        ready(Err(SinkError::Transport("connection refused".to_string()))).boxed()
    }
}

/// Never completes a delivery.
pub struct StallingSink;

impl Sink for StallingSink {
    fn name(&self) -> &'static str {
        "stalling"
    }

    fn deliver<'a>(&'a self, _event: &'a TelemetryEvent) -> BoxFuture<'a, Result<(), SinkError>> {
        pending().boxed()
    }
}
