//! A tick task that dies is detected on the next stop call and the engine
//! falls back to a clean state.

use std::sync::Arc;

use super::helpers::TestEngine;
use crate::dispatch::Dispatcher;
use crate::scenario::{
    Bounds, CurveBounds, EmissionParams, ParameterCurve, ScenarioDescriptor, ScenarioRegistry,
    db_exhaustion,
};
use crate::scheduler::{RunState, StopOutcome};

/// Panics on every tick.
#[derive(Debug)]
struct ExplodingCurve;

impl ParameterCurve for ExplodingCurve {
    fn bounds(&self) -> CurveBounds {
        CurveBounds {
            rate: Bounds::new(1, 1),
            error_probability: Bounds::new(0.0, 0.0),
        }
    }

    fn params(&self, elapsed_secs: u64) -> EmissionParams {
        panic!("curve failed at {elapsed_secs}s");
    }
}

fn engine() -> TestEngine {
    let registry = ScenarioRegistry::builtin().with_scenario(ScenarioDescriptor::new(
        "exploding",
        Arc::new(ExplodingCurve),
        db_exhaustion::profile(),
    ));
    TestEngine::with(registry, Dispatcher::DEFAULT_TIMEOUT, Vec::new())
}

#[tokio::test(start_paused = true)]
async fn test_dead_tick_task_resets_on_stop() {
    let engine = engine();
    engine.scheduler.start_scenario("exploding").unwrap();

    engine.run_ticks(1).await;

    // Until a stop call checks, the state still claims the scenario.
    assert!(matches!(
        engine.scheduler.run_state().unwrap(),
        RunState::Active { .. }
    ));

    assert_eq!(
        engine.scheduler.stop_scenario("auth-failure").unwrap(),
        StopOutcome::NotRunning
    );

    // Reset to idle, then baseline resumed.
    assert_eq!(engine.scheduler.run_state().unwrap(), RunState::Baseline);
    assert_eq!(engine.scheduler.status().unwrap(), None);

    engine.run_ticks(1).await;
    let events = engine.take();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.scenario == "baseline"));
}

#[tokio::test(start_paused = true)]
async fn test_scenario_startable_after_reset() {
    let engine = engine();
    engine.scheduler.start_scenario("exploding").unwrap();
    engine.run_ticks(1).await;

    engine.scheduler.stop_baseline().unwrap();
    assert_eq!(engine.scheduler.run_state().unwrap(), RunState::Idle);

    engine.scheduler.start_scenario("auth-failure").unwrap();
    engine.run_ticks(1).await;
    assert_eq!(engine.take().len(), 3);
}
