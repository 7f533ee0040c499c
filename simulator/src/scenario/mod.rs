//! Fault scenarios: parameter curves and the outcome profiles they feed.
//!
//! A scenario is split in two halves:
//!
//! - a [`ParameterCurve`], a deterministic function from elapsed scenario
//!   seconds to [`EmissionParams`], and
//! - an [`OutcomeProfile`], the fixed mapping the synthesizer uses to turn an
//!   error/success draw into concrete record fields.
//!
//! All randomness belongs to the synthesizer. Curves only clamp.
//!
//! # Invariants
//!
//! - `params(t).rate` is within `bounds().rate` for every `t`
//! - `params(t).error_probability` is within `bounds().error_probability`
//!   (and therefore within `[0, 1]`) for every `t`

pub mod auth_failure;
pub mod baseline;
pub mod cascading_failure;
pub mod db_exhaustion;
pub mod latency_degradation;
mod ramp;
mod registry;
pub mod traffic_anomaly;

use std::sync::Arc;

use serde::Serialize;

pub use ramp::{LinearRamp, StepRamp};
pub use registry::{BASELINE_ID, ScenarioRegistry};

/// Inclusive `[min, max]` range a curve output is clamped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    #[must_use]
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp `value` into the range. Does not panic when `min > max`;
    /// the lower bound wins in that case.
    #[must_use]
    pub fn clamp(&self, value: T) -> T {
        let value = if value > self.max { self.max } else { value };
        if value < self.min { self.min } else { value }
    }
}

/// Documented output ranges of a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveBounds {
    pub rate: Bounds<u32>,
    pub error_probability: Bounds<f64>,
}

impl CurveBounds {
    /// Clamp rate and error probability of `params` into these bounds.
    #[must_use]
    pub fn apply(&self, mut params: EmissionParams) -> EmissionParams {
        params.rate = self.rate.clamp(params.rate);
        let p = if params.error_probability.is_nan() {
            self.error_probability.min
        } else {
            params.error_probability
        };
        params.error_probability = self.error_probability.clamp(p).clamp(0.0, 1.0);
        params
    }
}

/// A CPU or memory gauge value for the records of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gauge {
    /// Emitted as `null`.
    Absent,
    Fixed(f64),
    /// Drawn per record by the synthesizer, rounded to a whole number.
    Uniform { min: f64, max: f64 },
}

/// Scenario-specific fields that travel with the emission parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Auxiliary {
    None,
    /// Retry count stamped on error records.
    Retries { retry_count: u32 },
    /// Simulated connection pool occupancy.
    Pool { connections: f64 },
    /// Failure phase of a cascading outage. `service` replaces the profile
    /// target's service and `upstream` names the dependency that timed out.
    Phase {
        phase: u8,
        service: String,
        upstream: String,
    },
}

/// Everything the synthesizer needs for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionParams {
    /// Records to synthesize this tick.
    pub rate: u32,
    pub latency_ms: u32,
    /// Uniform jitter in `0..=latency_jitter_ms` added per record.
    pub latency_jitter_ms: u32,
    pub error_probability: f64,
    pub cpu_pct: Gauge,
    pub memory_mb: Gauge,
    pub aux: Auxiliary,
}

/// Deterministic mapping from elapsed scenario time to emission parameters.
pub trait ParameterCurve: Send + Sync + std::fmt::Debug {
    fn bounds(&self) -> CurveBounds;

    /// Parameters for the tick at `elapsed_secs`. Implementations must
    /// return values already clamped to [`Self::bounds`].
    fn params(&self, elapsed_secs: u64) -> EmissionParams;
}

/// The service/endpoint a record claims to come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub service: String,
    pub endpoint: String,
    pub method: String,
}

impl Target {
    #[must_use]
    pub fn new(service: &str, endpoint: &str, method: &str) -> Self {
        Self {
            service: service.to_string(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }
}

/// Record fields selected by an error or success draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
    pub status_code: u16,
    pub error_type: Option<String>,
}

impl Outcome {
    #[must_use]
    pub fn success(message: &str) -> Self {
        Self {
            message: message.to_string(),
            status_code: 200,
            error_type: None,
        }
    }

    #[must_use]
    pub fn failure(message: &str, status_code: u16, error_type: &str) -> Self {
        Self {
            message: message.to_string(),
            status_code,
            error_type: Some(error_type.to_string()),
        }
    }
}

/// How the error branch changes a record's latency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorLatency {
    Unchanged,
    AddMs(u32),
    Scale(f64),
}

impl ErrorLatency {
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn apply(self, latency_ms: u32) -> u32 {
        match self {
            Self::Unchanged => latency_ms,
            Self::AddMs(extra) => latency_ms.saturating_add(extra),
            // `as` saturates float-to-int conversions.
            Self::Scale(factor) => (f64::from(latency_ms) * factor).round() as u32,
        }
    }
}

/// Where simulated client addresses come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddressPool {
    /// Any IPv4 address.
    Random,
    /// With probability `share`, an address in `prefix.1..=255`; otherwise any.
    Suspicious { share: f64, prefix: [u8; 3] },
}

/// The fixed per-scenario mapping from draws to record fields.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeProfile {
    /// Records cycle through the targets in order.
    pub targets: Vec<Target>,
    pub success: Outcome,
    pub failure: Outcome,
    pub error_latency: ErrorLatency,
    pub addresses: AddressPool,
}

/// Display metadata owned by callers (UIs, catalogues). The engine never
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioMetadata {
    pub title: String,
    pub description: String,
    pub signals: Vec<String>,
}

impl ScenarioMetadata {
    #[must_use]
    pub fn new(title: &str, description: &str, signals: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            signals: signals.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A registered fault scenario.
#[derive(Debug, Clone)]
pub struct ScenarioDescriptor {
    pub id: String,
    pub curve: Arc<dyn ParameterCurve>,
    pub profile: OutcomeProfile,
    pub metadata: Option<ScenarioMetadata>,
}

impl ScenarioDescriptor {
    #[must_use]
    pub fn new(id: &str, curve: Arc<dyn ParameterCurve>, profile: OutcomeProfile) -> Self {
        Self {
            id: id.to_string(),
            curve,
            profile,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ScenarioMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Swap the curve, keeping id, profile and metadata.
    #[must_use]
    pub fn with_curve(mut self, curve: Arc<dyn ParameterCurve>) -> Self {
        self.curve = curve;
        self
    }
}
