//! Registry of scenario descriptors, keyed by scenario id.
//!
//! Populated once at startup and read-only afterwards; the scheduler holds it
//! behind an `Arc` and only ever looks descriptors up.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    ScenarioDescriptor, auth_failure, baseline, cascading_failure, db_exhaustion,
    latency_degradation, traffic_anomaly,
};

/// Scenario tag stamped on baseline records. Not a startable scenario id.
pub const BASELINE_ID: &str = "baseline";

#[derive(Debug, Clone)]
pub struct ScenarioRegistry {
    scenarios: BTreeMap<String, Arc<ScenarioDescriptor>>,
    baseline: Arc<ScenarioDescriptor>,
}

impl ScenarioRegistry {
    /// An empty registry with the given baseline emitter.
    #[must_use]
    pub fn new(baseline: ScenarioDescriptor) -> Self {
        Self {
            scenarios: BTreeMap::new(),
            baseline: Arc::new(baseline),
        }
    }

    /// The five built-in fault scenarios plus the default baseline.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(baseline::descriptor())
            .with_scenario(auth_failure::descriptor())
            .with_scenario(cascading_failure::descriptor())
            .with_scenario(db_exhaustion::descriptor())
            .with_scenario(latency_degradation::descriptor())
            .with_scenario(traffic_anomaly::descriptor())
    }

    /// Register a scenario, replacing any scenario with the same id.
    ///
    /// A descriptor whose id is [`BASELINE_ID`] replaces the baseline instead.
    #[must_use]
    pub fn with_scenario(mut self, descriptor: ScenarioDescriptor) -> Self {
        if descriptor.id == BASELINE_ID {
            self.baseline = Arc::new(descriptor);
        } else {
            self.scenarios
                .insert(descriptor.id.clone(), Arc::new(descriptor));
        }
        self
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<ScenarioDescriptor>> {
        self.scenarios.get(id)
    }

    #[must_use]
    pub const fn baseline(&self) -> &Arc<ScenarioDescriptor> {
        &self.baseline
    }

    /// Registered fault scenarios in id order. The baseline is not included.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ScenarioDescriptor>> {
        self.scenarios.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for ScenarioRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
