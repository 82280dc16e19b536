//! Quadrature phase generator.
//!
//! Each distinct hardware tick adds the latched velocity to a 16-bit phase
//! counter per axis. Bits 9..8 of the counter select one of four Gray-code
//! states, so the A/B outputs walk
//!
//! ```text
//! index : 0    1    2    3
//! (A,B) : 0,0  1,0  1,1  0,1
//! ```
//!
//! forwards for positive velocity and backwards for negative velocity.
//! The counter wraps freely; it is a phase, not a position.

use crate::sampler::Velocity;

/// Phase A level for each 2-bit index.
pub const PHASE_A: [bool; 4] = [false, true, true, false];

/// Phase B level for each 2-bit index.
pub const PHASE_B: [bool; 4] = [false, false, true, true];

/// Levels of one axis' A/B pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Quadrature {
    pub a: bool,
    pub b: bool,
}

impl Quadrature {
    /// Gray-code index (0..=3) taken from bits 9..8 of `phase`.
    pub fn index(phase: u16) -> usize {
        usize::from((phase >> 8) & 3)
    }

    pub fn from_phase(phase: u16) -> Self {
        let i = Self::index(phase);
        Self {
            a: PHASE_A[i],
            b: PHASE_B[i],
        }
    }
}

/// Both axes' outputs for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureFrame {
    pub x: Quadrature,
    pub y: Quadrature,
}

#[derive(Clone, Debug)]
pub struct PhaseGenerator {
    last_tick: u16,
    phase_x: u16,
    phase_y: u16,
}

impl PhaseGenerator {
    /// Generator that will first act on the tick after `start_tick`.
    pub const fn new(start_tick: u16) -> Self {
        Self {
            last_tick: start_tick,
            phase_x: 0,
            phase_y: 0,
        }
    }

    /// Advance by one step if `now_tick` differs from the last tick seen.
    ///
    /// Returns `None` when the tick has not changed; no state is touched.
    pub fn advance(&mut self, now_tick: u16, velocity: Velocity) -> Option<QuadratureFrame> {
        if now_tick == self.last_tick {
            return None;
        }
        self.last_tick = now_tick;
        self.phase_x = self.phase_x.wrapping_add(velocity.vx as u16);
        self.phase_y = self.phase_y.wrapping_add(velocity.vy as u16);
        Some(self.frame())
    }

    /// Outputs for the current phase counters.
    pub fn frame(&self) -> QuadratureFrame {
        QuadratureFrame {
            x: Quadrature::from_phase(self.phase_x),
            y: Quadrature::from_phase(self.phase_y),
        }
    }

    /// Raw `(phase_x, phase_y)` counters.
    pub fn phase(&self) -> (u16, u16) {
        (self.phase_x, self.phase_y)
    }
}
