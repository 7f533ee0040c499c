//! Database connection pool exhaustion.
//!
//! Simulated pool occupancy grows linearly; latency follows occupancy and
//! the error probability jumps in tiers as the pool fills.

use std::sync::Arc;

use super::{
    AddressPool, Auxiliary, Bounds, CurveBounds, EmissionParams, ErrorLatency, Gauge, LinearRamp,
    Outcome, OutcomeProfile, ParameterCurve, ScenarioDescriptor, ScenarioMetadata, StepRamp,
    Target,
};

pub const ID: &str = "db-exhaustion";

/// Error probability used once connections exceed `above_connections`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorTier {
    pub above_connections: f64,
    pub error_probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbExhaustionCurve {
    pub connections: LinearRamp,
    pub base_error_probability: f64,
    /// Checked highest threshold first.
    pub tiers: Vec<ErrorTier>,
    pub rate: StepRamp,
    /// `latency = base_latency_ms + latency_per_connection * connections`.
    pub base_latency_ms: f64,
    pub latency_per_connection: f64,
    /// `cpu = cpu_base + cpu_per_connection * connections`, clamped.
    pub cpu_base: f64,
    pub cpu_per_connection: f64,
    pub cpu_bounds: Bounds<f64>,
    /// `memory = memory_base + memory_per_connection * connections`, clamped.
    pub memory_base: f64,
    pub memory_per_connection: f64,
    pub memory_bounds: Bounds<f64>,
}

impl Default for DbExhaustionCurve {
    fn default() -> Self {
        Self {
            connections: LinearRamp::new(20.0, 0.8, 20.0, f64::MAX),
            base_error_probability: 0.02,
            tiers: vec![
                ErrorTier {
                    above_connections: 80.0,
                    error_probability: 0.7,
                },
                ErrorTier {
                    above_connections: 60.0,
                    error_probability: 0.3,
                },
            ],
            rate: StepRamp::new(2, 15, 2, 8),
            base_latency_ms: 400.0,
            latency_per_connection: 10.0,
            cpu_base: 30.0,
            cpu_per_connection: 0.5,
            cpu_bounds: Bounds::new(30.0, 90.0),
            memory_base: 200.0,
            memory_per_connection: 5.0,
            memory_bounds: Bounds::new(200.0, 1024.0),
        }
    }
}

impl DbExhaustionCurve {
    fn error_probability_at(&self, connections: f64) -> f64 {
        let mut tiers: Vec<&ErrorTier> = self.tiers.iter().collect();
        tiers.sort_by(|a, b| b.above_connections.total_cmp(&a.above_connections));
        tiers
            .into_iter()
            .find(|tier| connections > tier.above_connections)
            .map_or(self.base_error_probability, |tier| tier.error_probability)
    }
}

impl ParameterCurve for DbExhaustionCurve {
    fn bounds(&self) -> CurveBounds {
        let probabilities = self
            .tiers
            .iter()
            .map(|t| t.error_probability)
            .chain(std::iter::once(self.base_error_probability));
        let (min, max) = probabilities.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p), hi.max(p))
        });
        CurveBounds {
            rate: self.rate.bounds(),
            error_probability: Bounds::new(min.clamp(0.0, 1.0), max.clamp(0.0, 1.0)),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn params(&self, elapsed_secs: u64) -> EmissionParams {
        let connections = self.connections.at(elapsed_secs);
        let latency = self
            .latency_per_connection
            .mul_add(connections, self.base_latency_ms);
        let cpu = self.cpu_per_connection.mul_add(connections, self.cpu_base);
        let memory = self
            .memory_per_connection
            .mul_add(connections, self.memory_base);

        self.bounds().apply(EmissionParams {
            rate: self.rate.at(elapsed_secs),
            // `as` saturates float-to-int conversions.
            latency_ms: latency.round() as u32,
            latency_jitter_ms: 0,
            error_probability: self.error_probability_at(connections),
            cpu_pct: Gauge::Fixed(self.cpu_bounds.clamp(cpu)),
            memory_mb: Gauge::Fixed(self.memory_bounds.clamp(memory)),
            aux: Auxiliary::Pool { connections },
        })
    }
}

#[must_use]
pub fn profile() -> OutcomeProfile {
    OutcomeProfile {
        targets: vec![Target::new("database", "/api/products", "GET")],
        success: Outcome::success("Query executed successfully"),
        failure: Outcome::failure("Connection pool exhausted", 503, "CONNECTION_POOL_EXHAUSTED"),
        error_latency: ErrorLatency::Unchanged,
        addresses: AddressPool::Random,
    }
}

#[must_use]
pub fn descriptor() -> ScenarioDescriptor {
    ScenarioDescriptor::new(ID, Arc::new(DbExhaustionCurve::default()), profile()).with_metadata(
        ScenarioMetadata::new(
            "Database Exhaustion",
            "Simulates connection pool saturation and slow queries on the database.",
            &["DB Connection Pool Full", "Transaction Timeouts", "High CPU Usage"],
        ),
    )
}
