//! Periodic tick tasks.
//!
//! Each running scenario (or the baseline) owns one tokio task that fires on
//! a fixed interval and runs one emission per tick. A tick runs to
//! completion before the task waits for the next one, so ticks of the same
//! task never overlap.
//!
//! # Cancellation
//!
//! The task holds the receiving half of a oneshot channel; [`TickHandle`]
//! holds the sender. Dropping or cancelling the handle closes the channel.
//! The loop checks the channel before every tick with a biased `select!`,
//! so once the handle is gone no new tick starts. A tick already in flight
//! is allowed to finish.
//!
//! The task holds no reference back to the scheduler state, so dropping the
//! scheduler drops every handle and every task exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::dispatch::Dispatcher;
use crate::scenario::ScenarioDescriptor;
use crate::synthesizer::EventSynthesizer;
use crate::time::{TimeSource, elapsed_secs};

/// Owner's side of a running tick task.
pub(super) struct TickHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl TickHandle {
    /// Spawn a tick task on `runtime` whose first tick fires one `period`
    /// from now.
    pub(super) fn spawn<T: TimeSource>(
        runtime: &Handle,
        period: Duration,
        mut emitter: Emitter<T>,
    ) -> Self {
        let (stop, mut stopped) = oneshot::channel::<()>();
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = interval.tick() => {}
                }
                emitter.tick().await;
            }
            tracing::debug!("tick task for '{}' exited", emitter.descriptor.id);
        });
        Self { stop, task }
    }

    /// Whether the task is still running. A task whose tick panicked is not.
    pub(super) fn is_live(&self) -> bool {
        !self.task.is_finished() && !self.stop.is_closed()
    }

    /// Stop scheduling ticks. Returns immediately.
    pub(super) fn cancel(self) {
        drop(self.stop);
    }
}

/// Everything one tick needs: the descriptor being emitted, the clock it
/// measures elapsed time against, and where records go.
pub(super) struct Emitter<T: TimeSource> {
    pub(super) time: Arc<T>,
    pub(super) dispatcher: Arc<Dispatcher>,
    pub(super) descriptor: Arc<ScenarioDescriptor>,
    pub(super) started_at_ms: u64,
    pub(super) synthesizer: EventSynthesizer,
}

impl<T: TimeSource> Emitter<T> {
    /// Compute parameters for the current elapsed time, synthesize the
    /// records and dispatch them.
    pub(super) async fn tick(&mut self) {
        let now_ms = self.time.now_ms();
        let elapsed = elapsed_secs(self.started_at_ms, now_ms);
        let params = self.descriptor.curve.params(elapsed);
        let events = self
            .synthesizer
            .synthesize(&self.descriptor, &params, now_ms);

        tracing::trace!(
            "tick '{}' at {elapsed}s: {} records",
            self.descriptor.id,
            events.len()
        );

        self.dispatcher.dispatch_all(&events).await;
    }
}
