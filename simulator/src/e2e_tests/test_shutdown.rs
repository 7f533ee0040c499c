//! Shutdown stops every emitter, including the baseline.

use super::helpers::TestEngine;
use crate::scheduler::RunState;

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_all_emission() {
    let engine = TestEngine::new();
    engine.scheduler.start_baseline().unwrap();
    engine.run_ticks(1).await;
    engine.scheduler.start_scenario("cascading-failure").unwrap();
    engine.run_ticks(1).await;
    assert!(!engine.take().is_empty());

    engine.scheduler.shutdown().unwrap();

    assert_eq!(engine.scheduler.run_state().unwrap(), RunState::Idle);
    engine.run_ticks(3).await;
    assert!(engine.take().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_scheduler_stops_ticks() {
    let engine = TestEngine::new();
    engine.scheduler.start_scenario("auth-failure").unwrap();
    engine.run_ticks(1).await;
    engine.take();

    let TestEngine {
        scheduler,
        time,
        sink,
    } = engine;
    drop(scheduler);

    time.advance_secs(3);
    tokio::time::sleep(super::helpers::TICK * 3).await;
    super::helpers::settle().await;
    assert!(sink.is_empty());
}
