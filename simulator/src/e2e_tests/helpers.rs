//! Common helpers for end-to-end tests.

use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::{Dispatcher, Sink};
use crate::event::TelemetryEvent;
use crate::scenario::ScenarioRegistry;
use crate::scheduler::{Scheduler, SchedulerSettings};
use crate::testing::RecordingSink;
use crate::time::SimulatedTimeSource;

/// Fixed seed so record draws repeat across runs.
pub const SEED: u64 = 7;

/// Tick period used by every engine built here.
pub const TICK: Duration = Duration::from_secs(1);

/// A scheduler wired to a simulated clock and a recording sink.
///
/// Must be built inside a `#[tokio::test(start_paused = true)]` test.
pub struct TestEngine {
    pub scheduler: Scheduler<SimulatedTimeSource>,
    pub time: Arc<SimulatedTimeSource>,
    pub sink: Arc<RecordingSink>,
}

impl TestEngine {
    /// Built-in scenarios, one recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::with(ScenarioRegistry::builtin(), Dispatcher::DEFAULT_TIMEOUT, Vec::new())
    }

    /// Custom registry, delivery timeout and extra sinks. The recording sink
    /// is always registered first.
    #[must_use]
    pub fn with(
        registry: ScenarioRegistry,
        timeout: Duration,
        extra_sinks: Vec<Arc<dyn Sink>>,
    ) -> Self {
        let time = Arc::new(SimulatedTimeSource::default_start());
        let sink = Arc::new(RecordingSink::new());

        let recording: Arc<dyn Sink> = sink.clone();
        let mut dispatcher = Dispatcher::new(timeout).with_sink(recording);
        for extra in extra_sinks {
            dispatcher = dispatcher.with_sink(extra);
        }

        let scheduler = Scheduler::new(
            Arc::new(registry),
            Arc::new(dispatcher),
            Arc::clone(&time),
            SchedulerSettings {
                tick_interval: TICK,
                seed: Some(SEED),
            },
        );

        Self {
            scheduler,
            time,
            sink,
        }
    }

    /// Let `n` ticks fire. Scenario time moves forward one second per tick,
    /// in step with the tick interval.
    pub async fn run_ticks(&self, n: u32) {
        for _ in 0..n {
            self.time.advance_secs(1);
            tokio::time::sleep(TICK).await;
            settle().await;
        }
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<TelemetryEvent> {
        self.sink.take()
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Give spawned tick tasks a chance to run at the current instant.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Distinct scenario tags in `events`, in first-seen order.
pub fn scenarios_of(events: &[TelemetryEvent]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for event in events {
        if !seen.contains(&event.scenario) {
            seen.push(event.scenario.clone());
        }
    }
    seen
}
