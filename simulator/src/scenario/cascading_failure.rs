//! Cascading failure: an upstream timeout spreads from one service to the next.
//!
//! Elapsed time is partitioned into ordered phases. A phase covers
//! `[previous until_secs, until_secs)`; the last phase is unbounded.

use std::sync::Arc;

use super::{
    AddressPool, Auxiliary, Bounds, CurveBounds, EmissionParams, ErrorLatency, Gauge, Outcome,
    OutcomeProfile, ParameterCurve, ScenarioDescriptor, ScenarioMetadata, Target,
};

pub const ID: &str = "cascading-failure";

#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    /// Exclusive upper bound in elapsed seconds. `None` never ends.
    pub until_secs: Option<u64>,
    pub service: String,
    /// Dependency named in the error message.
    pub upstream: String,
    pub error_probability: f64,
    pub latency_ms: u32,
    pub rate: u32,
}

impl Phase {
    fn new(
        until_secs: Option<u64>,
        service: &str,
        upstream: &str,
        error_probability: f64,
        latency_ms: u32,
        rate: u32,
    ) -> Self {
        Self {
            until_secs,
            service: service.to_string(),
            upstream: upstream.to_string(),
            error_probability,
            latency_ms,
            rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CascadingFailureCurve {
    pub phases: Vec<Phase>,
    /// `cpu = cpu_base + cpu_per_phase * phase + cpu_per_rate * rate`, clamped.
    pub cpu_base: f64,
    pub cpu_per_phase: f64,
    pub cpu_per_rate: f64,
    pub cpu_bounds: Bounds<f64>,
}

impl Default for CascadingFailureCurve {
    fn default() -> Self {
        Self {
            phases: vec![
                Phase::new(Some(45), "service-a", "external-api", 0.6, 1400, 5),
                Phase::new(Some(90), "service-b", "service-b", 0.4, 1800, 4),
                Phase::new(None, "service-c", "service-c", 0.7, 2800, 6),
            ],
            cpu_base: 30.0,
            cpu_per_phase: 15.0,
            cpu_per_rate: 2.0,
            cpu_bounds: Bounds::new(30.0, 85.0),
        }
    }
}

impl CascadingFailureCurve {
    /// Index of the phase covering `elapsed_secs`: the first phase whose
    /// bound lies above it, or the last phase. `None` only without phases.
    #[must_use]
    pub fn phase_index(&self, elapsed_secs: u64) -> Option<usize> {
        self.phases
            .iter()
            .position(|p| p.until_secs.is_none_or(|until| elapsed_secs < until))
            .or_else(|| self.phases.len().checked_sub(1))
    }
}

impl ParameterCurve for CascadingFailureCurve {
    fn bounds(&self) -> CurveBounds {
        let rate = Bounds::new(
            self.phases.iter().map(|p| p.rate).min().unwrap_or(0),
            self.phases.iter().map(|p| p.rate).max().unwrap_or(0),
        );
        let error_probability = Bounds::new(
            self.phases
                .iter()
                .map(|p| p.error_probability)
                .fold(f64::INFINITY, f64::min)
                .clamp(0.0, 1.0),
            self.phases
                .iter()
                .map(|p| p.error_probability)
                .fold(f64::NEG_INFINITY, f64::max)
                .clamp(0.0, 1.0),
        );
        CurveBounds {
            rate,
            error_probability,
        }
    }

    fn params(&self, elapsed_secs: u64) -> EmissionParams {
        let Some(index) = self.phase_index(elapsed_secs) else {
            return EmissionParams {
                rate: 0,
                latency_ms: 0,
                latency_jitter_ms: 0,
                error_probability: 0.0,
                cpu_pct: Gauge::Absent,
                memory_mb: Gauge::Absent,
                aux: Auxiliary::None,
            };
        };
        let phase = &self.phases[index];
        let number = u8::try_from(index + 1).unwrap_or(u8::MAX);
        let cpu = self.cpu_per_rate.mul_add(
            f64::from(phase.rate),
            self.cpu_per_phase.mul_add(f64::from(number), self.cpu_base),
        );

        self.bounds().apply(EmissionParams {
            rate: phase.rate,
            latency_ms: phase.latency_ms,
            latency_jitter_ms: 0,
            error_probability: phase.error_probability,
            cpu_pct: Gauge::Fixed(self.cpu_bounds.clamp(cpu)),
            memory_mb: Gauge::Absent,
            aux: Auxiliary::Phase {
                phase: number,
                service: phase.service.clone(),
                upstream: phase.upstream.clone(),
            },
        })
    }
}

#[must_use]
pub fn profile() -> OutcomeProfile {
    OutcomeProfile {
        // The active phase replaces the service name.
        targets: vec![Target::new("service-a", "/api/process", "POST")],
        success: Outcome::success("Response received"),
        failure: Outcome::failure("Upstream timeout", 502, "UPSTREAM_TIMEOUT"),
        error_latency: ErrorLatency::Unchanged,
        addresses: AddressPool::Random,
    }
}

#[must_use]
pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(ID, Arc::new(CascadingFailureCurve::default()), profile())
        .with_metadata(ScenarioMetadata::new(
            "Cascading Failure",
            "Simulates a failure in a dependency that propagates to upstream services.",
            &["Dependency 500s", "Retry Storm", "Circuit Breaker Open"],
        ))
}
