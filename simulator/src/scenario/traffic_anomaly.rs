//! Traffic anomaly: request volume climbs, mostly from one suspicious subnet.

use std::sync::Arc;

use super::{
    AddressPool, Auxiliary, Bounds, CurveBounds, EmissionParams, ErrorLatency, Gauge, LinearRamp,
    Outcome, OutcomeProfile, ParameterCurve, ScenarioDescriptor, ScenarioMetadata, StepRamp,
    Target,
};

pub const ID: &str = "traffic-anomaly";

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficAnomalyCurve {
    pub rate: StepRamp,
    pub latency_ms: u32,
    /// Per-record jitter is drawn by the synthesizer.
    pub latency_jitter_ms: u32,
    pub error_probability: LinearRamp,
    /// `cpu = cpu_base + cpu_per_rate * rate`, clamped.
    pub cpu_base: f64,
    pub cpu_per_rate: f64,
    pub cpu_bounds: Bounds<f64>,
}

impl Default for TrafficAnomalyCurve {
    fn default() -> Self {
        Self {
            rate: StepRamp::new(5, 10, 5, 15),
            latency_ms: 200,
            latency_jitter_ms: 100,
            error_probability: LinearRamp::flat(0.01),
            cpu_base: 10.0,
            cpu_per_rate: 2.0,
            cpu_bounds: Bounds::new(10.0, 50.0),
        }
    }
}

impl ParameterCurve for TrafficAnomalyCurve {
    fn bounds(&self) -> CurveBounds {
        CurveBounds {
            rate: self.rate.bounds(),
            error_probability: self.error_probability.bounds(),
        }
    }

    fn params(&self, elapsed_secs: u64) -> EmissionParams {
        let rate = self.rate.at(elapsed_secs);
        let cpu = self.cpu_per_rate.mul_add(f64::from(rate), self.cpu_base);

        self.bounds().apply(EmissionParams {
            rate,
            latency_ms: self.latency_ms,
            latency_jitter_ms: self.latency_jitter_ms,
            error_probability: self.error_probability.at(elapsed_secs),
            cpu_pct: Gauge::Fixed(self.cpu_bounds.clamp(cpu)),
            memory_mb: Gauge::Absent,
            aux: Auxiliary::None,
        })
    }
}

#[must_use]
pub fn profile() -> OutcomeProfile {
    OutcomeProfile {
        targets: vec![Target::new("frontend", "/", "GET")],
        success: Outcome::success("Page loaded"),
        failure: Outcome::failure("Internal Server Error", 500, "INTERNAL_SERVER_ERROR"),
        error_latency: ErrorLatency::Unchanged,
        addresses: AddressPool::Suspicious {
            share: 0.8,
            prefix: [192, 168, 1],
        },
    }
}

#[must_use]
pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(ID, Arc::new(TrafficAnomalyCurve::default()), profile()).with_metadata(
        ScenarioMetadata::new(
            "Traffic Anomaly",
            "Generates a sudden spike in request volume, simulating a DDoS or viral event.",
            &["Request Rate +500%", "Gateway 502s", "Autoscaling Lag"],
        ),
    )
}
