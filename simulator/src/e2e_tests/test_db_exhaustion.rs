//! Records emitted by db-exhaustion late in the scenario.

use super::helpers::TestEngine;
use crate::event::Level;
use crate::time::TimeSource;

#[tokio::test(start_paused = true)]
async fn test_db_exhaustion_at_one_hundred_seconds() {
    let engine = TestEngine::new();
    let started_at = engine.time.now_ms();
    engine.scheduler.start_scenario("db-exhaustion").unwrap();

    // The next tick observes exactly 100 elapsed seconds.
    engine.time.set(started_at + 99_000);
    engine.run_ticks(1).await;

    let events = engine.take();
    assert_eq!(events.len(), 8);

    for event in &events {
        assert_eq!(event.scenario, "db-exhaustion");
        assert_eq!(event.service, "database");
        assert_eq!(event.endpoint, "/api/products");
        assert_eq!(event.method, "GET");
        assert!(
            event.status_code == 200 || event.status_code == 503,
            "unexpected status {}",
            event.status_code
        );
        assert_eq!(event.is_error(), event.status_code == 503);
        if event.status_code == 503 {
            assert_eq!(event.error_type.as_deref(), Some("CONNECTION_POOL_EXHAUSTED"));
            assert_eq!(event.level, Level::Error);
        } else {
            assert_eq!(event.error_type, None);
            assert_eq!(event.level, Level::Info);
        }
        assert_eq!(event.latency_ms, 1400);
        assert_eq!(event.cpu_pct, Some(80.0));
        assert_eq!(event.memory_mb, Some(700.0));
        assert_eq!(event.retry_count, None);
    }
}

#[tokio::test(start_paused = true)]
async fn test_db_exhaustion_ramps_rate() {
    let engine = TestEngine::new();
    engine.scheduler.start_scenario("db-exhaustion").unwrap();

    engine.run_ticks(1).await;
    assert_eq!(engine.take().len(), 2);

    // Elapsed 2..=15: the rate steps up once at 15 seconds.
    engine.run_ticks(14).await;
    let events = engine.take();
    assert_eq!(events.len(), 13 * 2 + 3);
}

#[tokio::test(start_paused = true)]
async fn test_db_exhaustion_is_reproducible_with_seed() {
    let statuses = |events: Vec<crate::event::TelemetryEvent>| {
        events
            .into_iter()
            .map(|e| (e.status_code, e.request_id))
            .collect::<Vec<_>>()
    };

    let first = TestEngine::new();
    first.scheduler.start_scenario("db-exhaustion").unwrap();
    first.time.set(first.time.now_ms() + 99_000);
    first.run_ticks(1).await;
    let first = statuses(first.take());

    let second = TestEngine::new();
    second.scheduler.start_scenario("db-exhaustion").unwrap();
    second.time.set(second.time.now_ms() + 99_000);
    second.run_ticks(1).await;

    assert_eq!(first, statuses(second.take()));
}
