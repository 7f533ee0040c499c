//! Starting a second scenario while one is active is refused and leaves the
//! active scenario untouched.

use super::helpers::{TestEngine, scenarios_of};
use crate::scheduler::{RunStatus, SchedulerError, StartOutcome};
use crate::time::TimeSource;

#[tokio::test(start_paused = true)]
async fn test_conflict_keeps_active_scenario() {
    let engine = TestEngine::new();

    let started = engine.scheduler.start_scenario("auth-failure").unwrap();
    let StartOutcome::Started(original) = started else {
        panic!("expected a fresh start, got {started:?}");
    };

    engine.run_ticks(3).await;

    let result = engine.scheduler.start_scenario("db-exhaustion");
    assert_eq!(
        result,
        Err(SchedulerError::ScenarioConflict {
            requested: "db-exhaustion".to_string(),
            active: "auth-failure".to_string(),
        })
    );

    assert_eq!(engine.scheduler.status().unwrap(), Some(original));
}

#[tokio::test(start_paused = true)]
async fn test_conflict_does_not_change_emission() {
    let engine = TestEngine::new();
    engine.scheduler.start_scenario("latency-degradation").unwrap();
    engine.run_ticks(1).await;
    engine.take();

    assert!(engine.scheduler.start_scenario("traffic-anomaly").is_err());
    engine.run_ticks(2).await;

    let events = engine.take();
    // latency-degradation emits one record per tick.
    assert_eq!(events.len(), 2);
    assert_eq!(scenarios_of(&events), vec!["latency-degradation"]);
}

#[tokio::test(start_paused = true)]
async fn test_conflict_reports_start_time_of_active() {
    let engine = TestEngine::new();
    let started_at = engine.time.now_ms();
    engine.scheduler.start_scenario("cascading-failure").unwrap();

    engine.run_ticks(10).await;
    assert!(engine.scheduler.start_scenario("auth-failure").is_err());

    assert_eq!(
        engine.scheduler.status().unwrap(),
        Some(RunStatus {
            scenario: "cascading-failure".to_string(),
            started_at,
        })
    );
}
