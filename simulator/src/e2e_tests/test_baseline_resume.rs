//! Baseline emission yields to a fault scenario and comes back when the
//! scenario stops.

use super::helpers::{TestEngine, scenarios_of};
use crate::scheduler::{RunState, StopOutcome};

#[tokio::test(start_paused = true)]
async fn test_baseline_emits_healthy_records() {
    let engine = TestEngine::new();
    assert!(engine.scheduler.start_baseline().unwrap());

    engine.run_ticks(2).await;

    let events = engine.take();
    assert_eq!(events.len(), 8);
    assert!(events.iter().all(|e| e.scenario == "baseline"));
    assert!(events.iter().all(|e| e.status_code == 200 && e.error_type.is_none()));
    assert!(events.iter().all(|e| (20..=50).contains(&e.latency_ms)));
    assert_eq!(engine.scheduler.status().unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_replaces_then_resumes_baseline() {
    let engine = TestEngine::new();
    engine.scheduler.start_baseline().unwrap();
    engine.run_ticks(1).await;
    engine.take();

    engine.scheduler.start_scenario("auth-failure").unwrap();
    engine.run_ticks(3).await;
    assert_eq!(scenarios_of(&engine.take()), vec!["auth-failure"]);

    assert_eq!(
        engine.scheduler.stop_scenario("auth-failure").unwrap(),
        StopOutcome::Stopped
    );
    assert_eq!(engine.scheduler.run_state().unwrap(), RunState::Baseline);
    assert_eq!(engine.scheduler.status().unwrap(), None);

    engine.run_ticks(2).await;
    let events = engine.take();
    assert_eq!(scenarios_of(&events), vec!["baseline"]);
    assert_eq!(events.len(), 8);
}

#[tokio::test(start_paused = true)]
async fn test_stop_from_idle_start_also_resumes_baseline() {
    let engine = TestEngine::new();

    engine.scheduler.start_scenario("latency-degradation").unwrap();
    engine.scheduler.stop_scenario("latency-degradation").unwrap();

    assert_eq!(engine.scheduler.run_state().unwrap(), RunState::Baseline);
}

#[tokio::test(start_paused = true)]
async fn test_stop_baseline_goes_idle() {
    let engine = TestEngine::new();
    engine.scheduler.start_baseline().unwrap();

    engine.scheduler.stop_baseline().unwrap();
    assert_eq!(engine.scheduler.run_state().unwrap(), RunState::Idle);

    engine.run_ticks(3).await;
    assert!(engine.take().is_empty());
}
