//! Payment latency creeping upward, with timeouts once it has degraded long enough.

use std::sync::Arc;

use super::{
    AddressPool, Auxiliary, Bounds, CurveBounds, EmissionParams, ErrorLatency, Gauge, LinearRamp,
    Outcome, OutcomeProfile, ParameterCurve, ScenarioDescriptor, ScenarioMetadata, StepRamp,
    Target,
};

pub const ID: &str = "latency-degradation";

#[derive(Debug, Clone, PartialEq)]
pub struct LatencyDegradationCurve {
    pub rate: StepRamp,
    pub latency_ms: LinearRamp,
    pub base_error_probability: f64,
    pub degraded_error_probability: f64,
    /// Strictly after this many seconds the degraded probability applies.
    pub degraded_after_secs: u64,
    pub cpu_pct: LinearRamp,
}

impl Default for LatencyDegradationCurve {
    fn default() -> Self {
        Self {
            rate: StepRamp::flat(1),
            latency_ms: LinearRamp::new(200.0, 10.0, 200.0, f64::from(u32::MAX)),
            base_error_probability: 0.01,
            degraded_error_probability: 0.1,
            degraded_after_secs: 120,
            cpu_pct: LinearRamp::new(20.0, 0.1, 20.0, 60.0),
        }
    }
}

impl ParameterCurve for LatencyDegradationCurve {
    fn bounds(&self) -> CurveBounds {
        let (lo, hi) = if self.base_error_probability <= self.degraded_error_probability {
            (self.base_error_probability, self.degraded_error_probability)
        } else {
            (self.degraded_error_probability, self.base_error_probability)
        };
        CurveBounds {
            rate: self.rate.bounds(),
            error_probability: Bounds::new(lo.clamp(0.0, 1.0), hi.clamp(0.0, 1.0)),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn params(&self, elapsed_secs: u64) -> EmissionParams {
        let error_probability = if elapsed_secs > self.degraded_after_secs {
            self.degraded_error_probability
        } else {
            self.base_error_probability
        };

        self.bounds().apply(EmissionParams {
            rate: self.rate.at(elapsed_secs),
            latency_ms: self.latency_ms.at(elapsed_secs).round() as u32,
            latency_jitter_ms: 0,
            error_probability,
            cpu_pct: Gauge::Fixed(self.cpu_pct.at(elapsed_secs)),
            memory_mb: Gauge::Absent,
            aux: Auxiliary::None,
        })
    }
}

#[must_use]
pub fn profile() -> OutcomeProfile {
    OutcomeProfile {
        targets: vec![Target::new("payment", "/api/pay", "POST")],
        success: Outcome::success("Payment processed successfully"),
        failure: Outcome::failure("Payment gateway timeout", 504, "GATEWAY_TIMEOUT"),
        error_latency: ErrorLatency::Unchanged,
        addresses: AddressPool::Random,
    }
}

#[must_use]
pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(ID, Arc::new(LatencyDegradationCurve::default()), profile())
        .with_metadata(ScenarioMetadata::new(
            "Latency Degradation",
            "Injects artificial latency into service responses to simulate performance degradation.",
            &["P99 Latency > 2s", "Timeout Errors", "Slow SQL Queries"],
        ))
}
