// Life of a tick:
// 1. The scheduler's tick task wakes on its interval
// 2. Elapsed seconds since the scenario started are read from the time source
// 3. The scenario's curve maps elapsed time to emission parameters
// 4. The synthesizer draws that many telemetry records
// 5. The dispatcher hands every record to every sink concurrently,
//    bounding each delivery by its timeout
//
// System components:
//  - Scenario registry and parameter curves
//  - Scheduler (run state + tick tasks)
//  - Event synthesizer
//  - Output dispatcher and sinks
//  - HTTP control surface

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::disallowed_methods
    )
)]

pub mod api;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod scenario;
pub mod scheduler;
pub mod synthesizer;
pub mod time;

#[cfg(test)]
mod e2e_tests;
#[cfg(test)]
mod testing;

pub use dispatch::{Dispatcher, Sink, SinkError};
pub use event::TelemetryEvent;
pub use scenario::ScenarioRegistry;
pub use scheduler::{Scheduler, SchedulerError, SchedulerSettings};
