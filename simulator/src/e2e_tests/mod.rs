//! End-to-end tests at the scheduler level.
//!
//! Each test file covers one scheduling or emission property. Tick timing is
//! driven by tokio's paused clock and scenario time by a simulated time
//! source, so every run is deterministic.

#![cfg(test)]

mod helpers;

mod test_baseline_resume;
mod test_conflict;
mod test_db_exhaustion;
mod test_failing_sink;
mod test_idempotent_start;
mod test_resync;
mod test_shutdown;
