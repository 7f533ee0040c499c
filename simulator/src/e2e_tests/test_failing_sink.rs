//! A broken or stalled sink neither blocks the others nor delays ticks.

use std::sync::Arc;
use std::time::Duration;

use super::helpers::{TICK, TestEngine, settle};
use crate::dispatch::Sink;
use crate::scenario::ScenarioRegistry;
use crate::testing::{FailingSink, StallingSink};

const TIMEOUT: Duration = Duration::from_millis(200);

#[tokio::test(start_paused = true)]
async fn test_failing_sink_does_not_block_others() {
    let failing = Arc::new(FailingSink::new());
    let engine = TestEngine::with(
        ScenarioRegistry::builtin(),
        TIMEOUT,
        vec![failing.clone() as Arc<dyn Sink>],
    );
    engine.scheduler.start_scenario("traffic-anomaly").unwrap();

    engine.run_ticks(2).await;

    assert_eq!(engine.sink.len(), 10);
    assert_eq!(failing.attempts(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_stalled_sink_is_bounded_by_timeout() {
    let engine = TestEngine::with(
        ScenarioRegistry::builtin(),
        TIMEOUT,
        vec![Arc::new(StallingSink) as Arc<dyn Sink>],
    );
    engine.scheduler.start_scenario("traffic-anomaly").unwrap();

    // First tick: the recording sink gets its records right away even
    // though the stalled delivery holds the batch open.
    engine.time.advance_secs(1);
    tokio::time::sleep(TICK).await;
    settle().await;
    assert_eq!(engine.sink.len(), 5);

    // The batch is released after the timeout, well before the next tick.
    tokio::time::sleep(TIMEOUT).await;
    settle().await;

    // Second tick fires on schedule.
    engine.time.advance_secs(1);
    tokio::time::sleep(TICK - TIMEOUT).await;
    settle().await;
    assert_eq!(engine.sink.len(), 10);

    engine.run_ticks(3).await;
    assert_eq!(engine.sink.len(), 25);
}
