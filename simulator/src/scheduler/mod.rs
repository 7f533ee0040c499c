//! Scenario scheduler: decides what is emitting and drives its ticks.
//!
//! The scheduler owns the run state and every tick task. All mutation goes
//! through its public operations under one `RwLock`; `status()` takes the
//! read side, so readers always see a consistent snapshot.
//!
//! # Run states
//!
//! - `Idle`: nothing emits.
//! - `Baseline`: the baseline emitter ticks.
//! - `Active`: exactly one named scenario ticks; the baseline does not.
//!
//! Starting a scenario stops the baseline. Stopping the last scenario
//! resumes it.
//!
//! # Invariants
//!
//! Checked at the end of every `stop_*` call:
//!
//! - `Idle`: no tick tasks
//! - `Baseline`: a live baseline task and no scenario tasks
//! - `Active(id)`: a live task for `id` only, no baseline task
//!
//! If the check fails (for example after a tick panicked), every task is
//! cancelled and the state is reset to `Idle`.

mod tick;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;

use crate::dispatch::Dispatcher;
use crate::scenario::{ScenarioDescriptor, ScenarioRegistry};
use crate::synthesizer::EventSynthesizer;
use crate::time::TimeSource;
use tick::{Emitter, TickHandle};

/// What is currently emitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Baseline,
    Active {
        scenario: String,
        started_at_ms: u64,
    },
}

/// Externally visible description of the active named scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    pub scenario: String,
    /// Milliseconds since Unix epoch.
    pub started_at: u64,
}

/// Result of a successful `start_scenario`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started(RunStatus),
    /// The scenario was already active; nothing changed.
    AlreadyRunning(RunStatus),
}

impl StartOutcome {
    #[must_use]
    pub const fn status(&self) -> &RunStatus {
        match self {
            Self::Started(status) | Self::AlreadyRunning(status) => status,
        }
    }
}

/// Result of `stop_scenario`. Stopping something that is not running is
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Errors returned by scheduler operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No scenario with this id is registered.
    UnknownScenario(String),
    /// A different scenario is active and must be stopped first.
    ScenarioConflict { requested: String, active: String },
    /// Called outside a tokio runtime.
    NoRuntime,
    /// The state lock was poisoned by a panicking holder.
    LockPoisoned,
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownScenario(id) => write!(f, "unknown scenario: {id}"),
            Self::ScenarioConflict { requested, active } => write!(
                f,
                "cannot start '{requested}': scenario '{active}' is already running"
            ),
            Self::NoRuntime => write!(f, "scheduler used outside a tokio runtime"),
            Self::LockPoisoned => write!(f, "scheduler state lock poisoned"),
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Scheduler tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    pub tick_interval: Duration,
    /// Base seed for tick task synthesizers. Each spawned task derives its
    /// own seed from it. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl SchedulerSettings {
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            seed: None,
        }
    }
}

/// Golden-ratio increment, spreads consecutive spawn indices across the
/// seed space.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

struct State {
    run: RunState,
    baseline: Option<TickHandle>,
    running: HashMap<String, TickHandle>,
}

impl State {
    fn is_consistent(&self) -> bool {
        match &self.run {
            RunState::Idle => self.baseline.is_none() && self.running.is_empty(),
            RunState::Baseline => {
                self.running.is_empty() && self.baseline.as_ref().is_some_and(TickHandle::is_live)
            }
            RunState::Active { scenario, .. } => {
                self.baseline.is_none()
                    && self.running.len() == 1
                    && self.running.get(scenario).is_some_and(TickHandle::is_live)
            }
        }
    }

    fn cancel_all(&mut self) {
        if let Some(baseline) = self.baseline.take() {
            baseline.cancel();
        }
        for (_, handle) in self.running.drain() {
            handle.cancel();
        }
        self.run = RunState::Idle;
    }
}

struct Shared<T: TimeSource> {
    registry: Arc<ScenarioRegistry>,
    dispatcher: Arc<Dispatcher>,
    time: Arc<T>,
    settings: SchedulerSettings,
    /// Tick tasks spawned so far. Mixed into the seed so every task draws
    /// its own stream.
    spawned: AtomicU64,
    state: RwLock<State>,
}

/// Handle to the scenario scheduler. Cheap to clone; clones share state.
///
/// Operations that start tick tasks must be called from within a tokio
/// runtime.
pub struct Scheduler<T: TimeSource> {
    shared: Arc<Shared<T>>,
}

impl<T: TimeSource> Clone for Scheduler<T> {
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: TimeSource> Scheduler<T> {
    #[must_use]
    pub fn new(
        registry: Arc<ScenarioRegistry>,
        dispatcher: Arc<Dispatcher>,
        time: Arc<T>,
        mut settings: SchedulerSettings,
    ) -> Self {
        // tokio intervals reject a zero period.
        settings.tick_interval = settings.tick_interval.max(Duration::from_millis(1));
        Self {
            shared: Arc::new(Shared {
                registry,
                dispatcher,
                time,
                settings,
                spawned: AtomicU64::new(0),
                state: RwLock::new(State {
                    run: RunState::Idle,
                    baseline: None,
                    running: HashMap::new(),
                }),
            }),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ScenarioRegistry {
        &self.shared.registry
    }

    #[must_use]
    pub fn settings(&self) -> SchedulerSettings {
        self.shared.settings
    }

    /// Begin baseline emission unless anything is already emitting.
    ///
    /// Returns whether the baseline was started.
    pub fn start_baseline(&self) -> Result<bool, SchedulerError> {
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        let mut state = self.write()?;
        Ok(self.start_baseline_locked(&runtime, &mut state))
    }

    /// Cancel baseline emission. Only clears the run state if it was
    /// `Baseline`.
    pub fn stop_baseline(&self) -> Result<(), SchedulerError> {
        let mut state = self.write()?;
        if let Some(handle) = state.baseline.take() {
            handle.cancel();
            tracing::info!("stopped baseline emitter");
        }
        if state.run == RunState::Baseline {
            state.run = RunState::Idle;
        }
        self.reconcile(&mut state);
        Ok(())
    }

    /// Make `id` the active scenario.
    ///
    /// Idempotent for the scenario that is already active. Fails with
    /// `ScenarioConflict` while a different scenario is active; the baseline
    /// never conflicts and is stopped instead.
    pub fn start_scenario(&self, id: &str) -> Result<StartOutcome, SchedulerError> {
        let descriptor = self
            .shared
            .registry
            .get(id)
            .ok_or_else(|| SchedulerError::UnknownScenario(id.to_string()))?;
        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        let mut state = self.write()?;

        if let RunState::Active {
            scenario,
            started_at_ms,
        } = &state.run
        {
            if scenario == id {
                return Ok(StartOutcome::AlreadyRunning(RunStatus {
                    scenario: scenario.clone(),
                    started_at: *started_at_ms,
                }));
            }
            tracing::warn!("refusing to start '{id}': '{scenario}' is already running");
            return Err(SchedulerError::ScenarioConflict {
                requested: id.to_string(),
                active: scenario.clone(),
            });
        }

        if let Some(baseline) = state.baseline.take() {
            baseline.cancel();
            tracing::info!("stopped baseline emitter for scenario '{id}'");
        }

        let started_at_ms = self.shared.time.now_ms();
        let handle = self.spawn_ticks(&runtime, descriptor, started_at_ms);
        state.running.insert(id.to_string(), handle);
        state.run = RunState::Active {
            scenario: id.to_string(),
            started_at_ms,
        };
        tracing::info!("started scenario '{id}' at {started_at_ms}");

        Ok(StartOutcome::Started(RunStatus {
            scenario: id.to_string(),
            started_at: started_at_ms,
        }))
    }

    /// Stop `id` if it is running. When nothing is left running, the
    /// baseline resumes.
    pub fn stop_scenario(&self, id: &str) -> Result<StopOutcome, SchedulerError> {
        let mut state = self.write()?;

        let outcome = match state.running.remove(id) {
            Some(handle) => {
                handle.cancel();
                tracing::info!("stopped scenario '{id}'");
                StopOutcome::Stopped
            }
            None => StopOutcome::NotRunning,
        };

        if outcome == StopOutcome::Stopped && state.running.is_empty() {
            state.run = RunState::Idle;
        }
        let resynced = self.reconcile(&mut state);

        if (outcome == StopOutcome::Stopped || resynced) && state.run == RunState::Idle {
            if let Ok(runtime) = Handle::try_current() {
                self.start_baseline_locked(&runtime, &mut state);
            }
        }
        Ok(outcome)
    }

    /// The active named scenario, or `None` when idle or on baseline.
    pub fn status(&self) -> Result<Option<RunStatus>, SchedulerError> {
        let state = self.read()?;
        Ok(match &state.run {
            RunState::Active {
                scenario,
                started_at_ms,
            } => Some(RunStatus {
                scenario: scenario.clone(),
                started_at: *started_at_ms,
            }),
            RunState::Idle | RunState::Baseline => None,
        })
    }

    pub fn run_state(&self) -> Result<RunState, SchedulerError> {
        Ok(self.read()?.run.clone())
    }

    /// Cancel every tick task and go idle. The baseline does not resume.
    pub fn shutdown(&self) -> Result<(), SchedulerError> {
        let mut state = self.write()?;
        state.cancel_all();
        tracing::info!("scheduler shut down");
        Ok(())
    }

    fn start_baseline_locked(&self, runtime: &Handle, state: &mut State) -> bool {
        if state.baseline.is_some() || !state.running.is_empty() {
            return false;
        }
        let descriptor = self.shared.registry.baseline();
        let handle = self.spawn_ticks(runtime, descriptor, self.shared.time.now_ms());
        state.baseline = Some(handle);
        state.run = RunState::Baseline;
        tracing::info!("started baseline emitter");
        true
    }

    /// Returns whether the state had to be reset.
    fn reconcile(&self, state: &mut State) -> bool {
        if state.is_consistent() {
            return false;
        }
        tracing::warn!(
            "scheduler state out of sync ({:?}, {} scenario tasks, baseline task: {}), resetting to idle",
            state.run,
            state.running.len(),
            state.baseline.is_some()
        );
        state.cancel_all();
        true
    }

    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
    fn spawn_ticks(
        &self,
        runtime: &Handle,
        descriptor: &Arc<ScenarioDescriptor>,
        started_at_ms: u64,
    ) -> TickHandle {
        let emitter = Emitter {
            time: Arc::clone(&self.shared.time),
            dispatcher: Arc::clone(&self.shared.dispatcher),
            descriptor: Arc::clone(descriptor),
            started_at_ms,
            synthesizer: EventSynthesizer::from_seed(self.next_seed()),
        };
        TickHandle::spawn(runtime, self.shared.settings.tick_interval, emitter)
    }

    /// Seed for the next tick task. The first task uses the configured seed
    /// unchanged; later ones are offset by their spawn index.
    fn next_seed(&self) -> Option<u64> {
        let index = self.shared.spawned.fetch_add(1, Ordering::Relaxed);
        self.shared
            .settings
            .seed
            .map(|seed| seed.wrapping_add(index.wrapping_mul(SEED_STRIDE)))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, SchedulerError> {
        self.shared
            .state
            .read()
            .map_err(|_| SchedulerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, SchedulerError> {
        self.shared
            .state
            .write()
            .map_err(|_| SchedulerError::LockPoisoned)
    }
}
