//! Time source abstraction for the scenario scheduler.
//!
//! The scheduler never reads the clock directly. Production code uses
//! [`SystemTimeSource`], tests drive elapsed scenario time with
//! [`SimulatedTimeSource`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

/// Abstraction over time operations.
pub trait TimeSource: Send + Sync + 'static {
    /// Get the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Real time source.
///
/// Reads the wall clock once at construction and then advances with tokio's
/// monotonic [`Instant`], so readings never go backwards even if the system
/// clock is adjusted while a scenario runs.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    anchor_epoch_ms: u64,
    anchor: Instant,
}

impl SystemTimeSource {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Milliseconds won't overflow u64 for billions of years
    pub fn new() -> Self {
        // duration_since(UNIX_EPOCH) only fails if system time is before 1970.
        let anchor_epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        Self {
            anchor_epoch_ms,
            anchor: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u64 {
        self.anchor_epoch_ms
            .saturating_add(self.anchor.elapsed().as_millis() as u64)
    }
}

/// A simulated time source for deterministic testing.
///
/// Time only advances when explicitly told to. The reading is atomic
/// because tick tasks share it with the test driving it.
///
/// # Example
///
/// ```
/// use simulator::time::{SimulatedTimeSource, TimeSource};
///
/// let time = SimulatedTimeSource::new(1000);
/// assert_eq!(time.now_ms(), 1000);
///
/// time.advance(100);
/// assert_eq!(time.now_ms(), 1100);
/// ```
#[derive(Debug)]
pub struct SimulatedTimeSource {
    /// Current simulated time in milliseconds since Unix epoch.
    current_time_ms: AtomicU64,
}

impl SimulatedTimeSource {
    #[must_use]
    pub const fn new(initial_time_ms: u64) -> Self {
        Self {
            current_time_ms: AtomicU64::new(initial_time_ms),
        }
    }

    /// Starts at `1_700_000_000_000` (approximately November 2023).
    #[must_use]
    pub const fn default_start() -> Self {
        Self::new(1_700_000_000_000)
    }

    /// Advance time by the given number of milliseconds.
    ///
    /// Time saturates at `u64::MAX` if overflow would occur.
    pub fn advance(&self, ms: u64) {
        let _ = self
            .current_time_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(ms))
            });
    }

    /// Advance time by whole seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance(secs.saturating_mul(1000));
    }

    /// Set the current time to a specific value. Can move time backwards.
    pub fn set(&self, time_ms: u64) {
        self.current_time_ms.store(time_ms, Ordering::SeqCst);
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now_ms(&self) -> u64 {
        self.current_time_ms.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedTimeSource {
    fn default() -> Self {
        Self::default_start()
    }
}

/// Whole seconds between `started_at_ms` and `now_ms`, floored.
///
/// A clock reading earlier than the start yields zero.
#[must_use]
pub const fn elapsed_secs(started_at_ms: u64, now_ms: u64) -> u64 {
    now_ms.saturating_sub(started_at_ms) / 1000
}
