//! Clamped ramps shared by the scenario curves.

use super::Bounds;

/// `start + slope_per_sec * t`, clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRamp {
    pub start: f64,
    pub slope_per_sec: f64,
    pub min: f64,
    pub max: f64,
}

impl LinearRamp {
    #[must_use]
    pub const fn new(start: f64, slope_per_sec: f64, min: f64, max: f64) -> Self {
        Self {
            start,
            slope_per_sec,
            min,
            max,
        }
    }

    /// A ramp that never moves.
    #[must_use]
    pub const fn flat(value: f64) -> Self {
        Self::new(value, 0.0, value, value)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn at(&self, elapsed_secs: u64) -> f64 {
        let raw = self.slope_per_sec.mul_add(elapsed_secs as f64, self.start);
        Bounds::new(self.min, self.max).clamp(raw)
    }

    #[must_use]
    pub const fn bounds(&self) -> Bounds<f64> {
        Bounds::new(self.min, self.max)
    }
}

/// `start + floor(t / step_every_secs)`, clamped to `[min, max]`.
///
/// With `step_every_secs = None` the ramp is flat at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRamp {
    pub start: u32,
    pub step_every_secs: Option<u64>,
    pub min: u32,
    pub max: u32,
}

impl StepRamp {
    #[must_use]
    pub const fn new(start: u32, step_every_secs: u64, min: u32, max: u32) -> Self {
        Self {
            start,
            step_every_secs: Some(step_every_secs),
            min,
            max,
        }
    }

    #[must_use]
    pub const fn flat(value: u32) -> Self {
        Self {
            start: value,
            step_every_secs: None,
            min: value,
            max: value,
        }
    }

    #[must_use]
    pub fn at(&self, elapsed_secs: u64) -> u32 {
        let steps = match self.step_every_secs {
            Some(every) if every > 0 => elapsed_secs / every,
            _ => 0,
        };
        let raw = u64::from(self.start).saturating_add(steps);
        let raw = u32::try_from(raw).unwrap_or(u32::MAX);
        Bounds::new(self.min, self.max).clamp(raw)
    }

    #[must_use]
    pub const fn bounds(&self) -> Bounds<u32> {
        Bounds::new(self.min, self.max)
    }
}
