//! Synthetic telemetry records.
//!
//! A [`TelemetryEvent`] is built once by the synthesizer and handed to the
//! dispatcher by shared reference; nothing mutates it afterwards.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Severity of a telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Error,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => f.write_str("INFO"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}

/// One synthetic service observation.
///
/// Serializes to the JSON object accepted by the ingestion endpoint
/// (`POST /ingest/log`), with the generating scenario appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub level: Level,
    pub message: String,
    pub request_id: Uuid,
    pub ip: IpAddr,
    pub endpoint: String,
    pub method: String,
    pub latency_ms: u32,
    pub status_code: u16,
    pub cpu_pct: Option<f64>,
    pub memory_mb: Option<f64>,
    pub error_type: Option<String>,
    pub retry_count: Option<u32>,
    /// Scenario id active when the record was generated, or `baseline`.
    pub scenario: String,
}

impl TelemetryEvent {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, Level::Error)
    }
}
