//! Event synthesizer: turns emission parameters into telemetry records.
//!
//! All randomness in the engine lives here. Each record takes exactly one
//! uniform draw against `error_probability` to pick the error or success
//! branch of the scenario's [`OutcomeProfile`]; the remaining draws fill in
//! request ids, client addresses, latency jitter and gauge samples.
//!
//! Given the same seed, a synthesizer produces the same records.

use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::event::{Level, TelemetryEvent};
use crate::scenario::{
    AddressPool, Auxiliary, EmissionParams, Gauge, OutcomeProfile, ScenarioDescriptor,
};

/// Random record generator. One per tick task.
pub struct EventSynthesizer {
    rng: StdRng,
}

impl EventSynthesizer {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A synthesizer seeded from the OS entropy source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::new)
    }

    /// Produce `params.rate` records for `descriptor`, stamped with `now_ms`.
    ///
    /// Returns no records when the profile has no targets.
    pub fn synthesize(
        &mut self,
        descriptor: &ScenarioDescriptor,
        params: &EmissionParams,
        now_ms: u64,
    ) -> Vec<TelemetryEvent> {
        let profile = &descriptor.profile;
        if profile.targets.is_empty() {
            return Vec::new();
        }

        let timestamp = i64::try_from(now_ms)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_default();

        (0..params.rate as usize)
            .map(|i| self.record(&descriptor.id, profile, params, i, timestamp))
            .collect()
    }

    fn record(
        &mut self,
        scenario: &str,
        profile: &OutcomeProfile,
        params: &EmissionParams,
        index: usize,
        timestamp: DateTime<Utc>,
    ) -> TelemetryEvent {
        let target = &profile.targets[index % profile.targets.len()];
        let is_error = self.rng.random::<f64>() < params.error_probability;

        let mut latency_ms = params.latency_ms;
        if params.latency_jitter_ms > 0 {
            latency_ms = latency_ms.saturating_add(self.rng.random_range(0..=params.latency_jitter_ms));
        }

        let service = match &params.aux {
            Auxiliary::Phase { service, .. } => service.clone(),
            _ => target.service.clone(),
        };

        let (level, message, status_code, error_type, retry_count) = if is_error {
            let failure = &profile.failure;
            let message = match &params.aux {
                Auxiliary::Phase { upstream, .. } => format!("{} from {upstream}", failure.message),
                _ => failure.message.clone(),
            };
            let retry_count = match params.aux {
                Auxiliary::Retries { retry_count } => Some(retry_count),
                _ => None,
            };
            latency_ms = profile.error_latency.apply(latency_ms);
            (
                Level::Error,
                message,
                failure.status_code,
                failure.error_type.clone(),
                retry_count,
            )
        } else {
            let success = &profile.success;
            (
                Level::Info,
                success.message.clone(),
                success.status_code,
                success.error_type.clone(),
                None,
            )
        };

        TelemetryEvent {
            timestamp,
            service,
            level,
            message,
            request_id: self.request_id(),
            ip: self.client_address(profile.addresses),
            endpoint: target.endpoint.clone(),
            method: target.method.clone(),
            latency_ms,
            status_code,
            cpu_pct: self.sample(params.cpu_pct),
            memory_mb: self.sample(params.memory_mb),
            error_type,
            retry_count,
            scenario: scenario.to_string(),
        }
    }

    fn request_id(&mut self) -> Uuid {
        let mut bytes = [0u8; 16];
        self.rng.fill(&mut bytes);
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }

    fn client_address(&mut self, pool: AddressPool) -> IpAddr {
        match pool {
            AddressPool::Suspicious { share, prefix } if self.rng.random::<f64>() < share => {
                let host = self.rng.random_range(1..=255);
                IpAddr::V4(Ipv4Addr::new(prefix[0], prefix[1], prefix[2], host))
            }
            _ => IpAddr::V4(Ipv4Addr::from(self.rng.random::<u32>())),
        }
    }

    fn sample(&mut self, gauge: Gauge) -> Option<f64> {
        match gauge {
            Gauge::Absent => None,
            Gauge::Fixed(value) => Some(value),
            Gauge::Uniform { min, max } if min < max => {
                Some(self.rng.random_range(min..=max).round())
            }
            Gauge::Uniform { min, .. } => Some(min),
        }
    }
}
