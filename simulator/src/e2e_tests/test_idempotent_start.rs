//! Starting the already active scenario is a no-op.

use super::helpers::TestEngine;
use crate::scheduler::StartOutcome;

#[tokio::test(start_paused = true)]
async fn test_repeated_start_keeps_start_time() {
    let engine = TestEngine::new();

    let first = engine.scheduler.start_scenario("db-exhaustion").unwrap();
    assert!(matches!(first, StartOutcome::Started(_)));

    engine.run_ticks(5).await;

    let second = engine.scheduler.start_scenario("db-exhaustion").unwrap();
    assert_eq!(second, StartOutcome::AlreadyRunning(first.status().clone()));
    assert_eq!(
        engine.scheduler.status().unwrap().as_ref(),
        Some(first.status())
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeated_start_does_not_double_emission() {
    let engine = TestEngine::new();
    engine.scheduler.start_scenario("traffic-anomaly").unwrap();
    engine.scheduler.start_scenario("traffic-anomaly").unwrap();
    engine.scheduler.start_scenario("traffic-anomaly").unwrap();

    engine.run_ticks(1).await;

    // Rate is 5 until ten seconds have elapsed.
    assert_eq!(engine.take().len(), 5);
}
