//! Output mapper - drives the legacy mouse port lines.
//!
//! Line order (index → signal):
//! ```text
//! 0  X phase A
//! 1  X phase B
//! 2  Y phase A
//! 3  Y phase B
//! 4  Button 1 (left),   active-low
//! 5  Button 3 (middle), active-low
//! 6  Button 2 (right),  active-low
//! 7  Button 2 (right),  active-low, second connector
//! ```
//!
//! Line 7 mirrors line 6 bit for bit; some board revisions take the right
//! button from the second connector.

use crate::motion::ButtonState;
use crate::quadrature::QuadratureFrame;
use embedded_hal::digital::{OutputPin, PinState};

/// Number of driven lines.
pub const LINE_COUNT: usize = 8;

/// Physical output lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum Line {
    XA = 0,
    XB = 1,
    YA = 2,
    YB = 3,
    ButtonLeft = 4,
    ButtonMiddle = 5,
    ButtonRight = 6,
    ButtonRightCompat = 7,
}

impl Line {
    pub const ALL: [Line; LINE_COUNT] = [
        Line::XA,
        Line::XB,
        Line::YA,
        Line::YB,
        Line::ButtonLeft,
        Line::ButtonMiddle,
        Line::ButtonRight,
        Line::ButtonRightCompat,
    ];
}

/// Electrical level per line, `true` = high.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineLevels([bool; LINE_COUNT]);

impl LineLevels {
    /// Power-on state: every line high, buttons released.
    pub const IDLE: Self = Self([true; LINE_COUNT]);

    /// Levels for one generator frame and the current buttons.
    pub fn map(frame: &QuadratureFrame, buttons: &ButtonState) -> Self {
        Self([
            frame.x.a,
            frame.x.b,
            frame.y.a,
            frame.y.b,
            !buttons.left(),
            !buttons.middle(),
            !buttons.right(),
            !buttons.right(),
        ])
    }

    pub fn level(&self, line: Line) -> bool {
        self.0[line as usize]
    }

    pub fn as_array(&self) -> &[bool; LINE_COUNT] {
        &self.0
    }
}

/// Owns the output pins and writes [`LineLevels`] to them.
pub struct OutputMapper<P: OutputPin> {
    pins: [P; LINE_COUNT],
}

impl<P: OutputPin> OutputMapper<P> {
    /// Take ownership of the pins (in [`Line`] order) and drive them idle.
    pub fn new(pins: [P; LINE_COUNT]) -> Result<Self, P::Error> {
        let mut mapper = Self { pins };
        mapper.apply(&LineLevels::IDLE)?;
        Ok(mapper)
    }

    /// Drive every line to `levels`.
    pub fn apply(&mut self, levels: &LineLevels) -> Result<(), P::Error> {
        for (pin, &high) in self.pins.iter_mut().zip(levels.0.iter()) {
            pin.set_state(PinState::from(high))?;
        }
        Ok(())
    }

    pub fn pins(&self) -> &[P; LINE_COUNT] {
        &self.pins
    }

    /// Give the pins back.
    pub fn release(self) -> [P; LINE_COUNT] {
        self.pins
    }
}
