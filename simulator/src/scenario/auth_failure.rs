//! Auth failure storm: login errors ramp up while request volume holds steady.

use std::sync::Arc;

use super::{
    AddressPool, Auxiliary, CurveBounds, EmissionParams, ErrorLatency, Gauge, LinearRamp,
    Outcome, OutcomeProfile, ParameterCurve, ScenarioDescriptor, ScenarioMetadata, StepRamp,
    Target,
};

pub const ID: &str = "auth-failure";

#[derive(Debug, Clone, PartialEq)]
pub struct AuthFailureCurve {
    pub rate: StepRamp,
    pub error_probability: LinearRamp,
    pub base_latency_ms: u32,
    /// Added on top of `base_latency_ms`.
    pub latency_increase: LinearRamp,
    /// One more retry every this many seconds, up to `max_retries`.
    pub retry_every_secs: u64,
    pub max_retries: u32,
    pub cpu_pct: LinearRamp,
}

impl Default for AuthFailureCurve {
    fn default() -> Self {
        Self {
            rate: StepRamp::flat(3),
            error_probability: LinearRamp::new(0.02, 0.007, 0.02, 0.7),
            base_latency_ms: 300,
            latency_increase: LinearRamp::new(0.0, 5.0, 0.0, 250.0),
            retry_every_secs: 60,
            max_retries: 2,
            cpu_pct: LinearRamp::new(40.0, 0.4, 40.0, 85.0),
        }
    }
}

impl ParameterCurve for AuthFailureCurve {
    fn bounds(&self) -> CurveBounds {
        CurveBounds {
            rate: self.rate.bounds(),
            error_probability: self.error_probability.bounds(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn params(&self, elapsed_secs: u64) -> EmissionParams {
        let retries = elapsed_secs
            .checked_div(self.retry_every_secs)
            .unwrap_or(0);
        let retry_count = u32::try_from(retries)
            .unwrap_or(u32::MAX)
            .min(self.max_retries);
        let increase = self.latency_increase.at(elapsed_secs).round() as u32;

        self.bounds().apply(EmissionParams {
            rate: self.rate.at(elapsed_secs),
            latency_ms: self.base_latency_ms.saturating_add(increase),
            latency_jitter_ms: 0,
            error_probability: self.error_probability.at(elapsed_secs),
            cpu_pct: Gauge::Fixed(self.cpu_pct.at(elapsed_secs)),
            memory_mb: Gauge::Absent,
            aux: Auxiliary::Retries { retry_count },
        })
    }
}

#[must_use]
pub fn profile() -> OutcomeProfile {
    OutcomeProfile {
        targets: vec![Target::new("auth", "/api/login", "POST")],
        success: Outcome::success("Authentication successful"),
        failure: Outcome::failure(
            "JWT verification failed - invalid signature or expired token",
            401,
            "JWT_VERIFICATION_FAILED",
        ),
        error_latency: ErrorLatency::AddMs(50),
        addresses: AddressPool::Random,
    }
}

#[must_use]
pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(ID, Arc::new(AuthFailureCurve::default()), profile()).with_metadata(
        ScenarioMetadata::new(
            "Auth Failure Storm",
            "Simulates a credential stuffing attack resulting in a high rate of 401/403 errors.",
            &["High 401 Rate", "Login Latency Spike", "New IP Surge"],
        ),
    )
}
