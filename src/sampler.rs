//! Velocity sampler.
//!
//! Once per sampling window the accumulated deltas are latched as the
//! velocity that drives the phase generator, and the accumulator restarts
//! from zero. This decouples bursty report arrival from the waveform rate.

use crate::config::SAMPLE_WINDOW_MS;
use crate::motion::MotionAccumulator;
use crate::tick::msec_between;

/// Per-tick phase increment for each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Velocity {
    pub vx: i16,
    pub vy: i16,
}

impl Velocity {
    pub const ZERO: Self = Self { vx: 0, vy: 0 };
}

#[derive(Clone, Debug)]
pub struct VelocitySampler {
    reference_ms: u16,
    window_ms: u16,
    velocity: Velocity,
}

impl VelocitySampler {
    /// Sampler whose first window opens at `now_ms`.
    pub const fn new(now_ms: u16) -> Self {
        Self::with_window(now_ms, SAMPLE_WINDOW_MS)
    }

    pub const fn with_window(now_ms: u16, window_ms: u16) -> Self {
        Self {
            reference_ms: now_ms,
            window_ms,
            velocity: Velocity::ZERO,
        }
    }

    /// Latch and drain `accumulator` if the current window has elapsed.
    ///
    /// Returns `true` when a new velocity was latched.
    pub fn sample(&mut self, now_ms: u16, accumulator: &mut MotionAccumulator) -> bool {
        let end = self.reference_ms.wrapping_add(self.window_ms);
        if msec_between(now_ms, self.reference_ms, end) {
            return false;
        }

        let (vx, vy) = accumulator.take();
        self.velocity = Velocity { vx, vy };
        self.reference_ms = now_ms;
        true
    }

    /// Velocity latched at the end of the last window.
    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Drop the latched velocity without touching the window.
    pub fn clear(&mut self) {
        self.velocity = Velocity::ZERO;
    }

    pub fn reference_ms(&self) -> u16 {
        self.reference_ms
    }
}
