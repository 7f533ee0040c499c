//! Baseline: one healthy record per service, every tick.

use std::sync::Arc;

use super::{
    AddressPool, Auxiliary, Bounds, CurveBounds, EmissionParams, ErrorLatency, Gauge, Outcome,
    OutcomeProfile, ParameterCurve, ScenarioDescriptor, Target,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BaselineCurve {
    pub records_per_tick: u32,
    pub latency_ms: Bounds<u32>,
    pub cpu_pct: Bounds<f64>,
    pub memory_mb: Bounds<f64>,
}

impl Default for BaselineCurve {
    fn default() -> Self {
        Self {
            records_per_tick: 4,
            latency_ms: Bounds::new(20, 50),
            cpu_pct: Bounds::new(10.0, 30.0),
            memory_mb: Bounds::new(100.0, 300.0),
        }
    }
}

impl ParameterCurve for BaselineCurve {
    fn bounds(&self) -> CurveBounds {
        CurveBounds {
            rate: Bounds::new(self.records_per_tick, self.records_per_tick),
            error_probability: Bounds::new(0.0, 0.0),
        }
    }

    fn params(&self, _elapsed_secs: u64) -> EmissionParams {
        EmissionParams {
            rate: self.records_per_tick,
            latency_ms: self.latency_ms.min,
            latency_jitter_ms: self.latency_ms.max.saturating_sub(self.latency_ms.min),
            error_probability: 0.0,
            cpu_pct: Gauge::Uniform {
                min: self.cpu_pct.min,
                max: self.cpu_pct.max,
            },
            memory_mb: Gauge::Uniform {
                min: self.memory_mb.min,
                max: self.memory_mb.max,
            },
            aux: Auxiliary::None,
        }
    }
}

#[must_use]
pub fn profile() -> OutcomeProfile {
    OutcomeProfile {
        targets: vec![
            Target::new("auth", "/api/login", "POST"),
            Target::new("database", "/api/products", "GET"),
            Target::new("payment", "/api/pay", "POST"),
            Target::new("frontend", "/", "GET"),
        ],
        success: Outcome::success("Operation successful"),
        // Unreachable with a zero error probability.
        failure: Outcome::failure("Operation failed", 500, "INTERNAL_SERVER_ERROR"),
        error_latency: ErrorLatency::Unchanged,
        addresses: AddressPool::Random,
    }
}

#[must_use]
pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(
        super::BASELINE_ID,
        Arc::new(BaselineCurve::default()),
        profile(),
    )
}
