//! Motion accumulator and device-ready state machine.
//!
//! Every processed report adds its decoded X/Y values to a running sum and
//! overwrites the button state. The sum is drained by the velocity sampler
//! once per window. A report that says the source is gone, or is not a
//! mouse, zeroes everything and leaves the tracker not-ready.

use crate::hid::{decode_axis, decode_button, FieldDescriptor, BUTTON_COUNT};

/// Ready state of the upstream device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Readiness {
    #[default]
    NotReady,
    Ready,
}

/// What a single report did to the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportOutcome {
    /// Report ID did not match; nothing changed.
    Ignored,
    /// Device not ready or not a mouse; state zeroed.
    Reset,
    /// Deltas accumulated and buttons updated.
    Applied,
}

/// Signed 16-bit running sums of decoded motion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionAccumulator {
    pub x: i16,
    pub y: i16,
}

impl MotionAccumulator {
    pub const fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Add one report's contribution. Overflow wraps.
    pub fn add(&mut self, dx: i16, dy: i16) {
        self.x = self.x.wrapping_add(dx);
        self.y = self.y.wrapping_add(dy);
    }

    /// Return the sums and reset them to zero.
    pub fn take(&mut self) -> (i16, i16) {
        let sums = (self.x, self.y);
        *self = Self::new();
        sums
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Buttons 1..=3 as last reported: left, right, middle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState(pub [bool; BUTTON_COUNT]);

impl ButtonState {
    pub const RELEASED: Self = Self([false; BUTTON_COUNT]);

    pub fn left(&self) -> bool {
        self.0[0]
    }

    pub fn right(&self) -> bool {
        self.0[1]
    }

    pub fn middle(&self) -> bool {
        self.0[2]
    }

    pub fn any(&self) -> bool {
        self.0.iter().any(|&b| b)
    }
}

/// Report-driven half of the bridge: readiness, deltas, buttons.
#[derive(Clone, Debug, Default)]
pub struct MotionTracker {
    readiness: Readiness,
    accumulator: MotionAccumulator,
    buttons: ButtonState,
}

impl MotionTracker {
    pub const fn new() -> Self {
        Self {
            readiness: Readiness::NotReady,
            accumulator: MotionAccumulator::new(),
            buttons: ButtonState::RELEASED,
        }
    }

    /// Process one raw report against `descriptor`.
    ///
    /// With a non-zero report ID the first byte must match it and is
    /// stripped before decoding; a mismatch leaves every field untouched.
    pub fn report(&mut self, descriptor: &FieldDescriptor, data: &[u8]) -> ReportOutcome {
        let payload = if descriptor.report_id != 0 {
            match data.split_first() {
                Some((&id, rest)) if id == descriptor.report_id => rest,
                _ => return ReportOutcome::Ignored,
            }
        } else {
            data
        };

        if !descriptor.is_ready_mouse() {
            if self.readiness == Readiness::Ready {
                #[cfg(feature = "defmt")]
                defmt::info!(
                    "Mouse not ready (state={}, type={})",
                    descriptor.state,
                    descriptor.kind
                );
            }
            self.reset();
            return ReportOutcome::Reset;
        }

        if self.readiness == Readiness::NotReady {
            #[cfg(feature = "defmt")]
            defmt::info!("Mouse ready (report id {})", descriptor.report_id);
            self.readiness = Readiness::Ready;
        }

        let dx = decode_axis(&descriptor.axis[0], payload) as i16;
        let dy = decode_axis(&descriptor.axis[1], payload) as i16;
        self.accumulator.add(dx, dy);

        self.buttons = ButtonState(core::array::from_fn(|i| {
            decode_button(descriptor.button[i], payload)
        }));

        ReportOutcome::Applied
    }

    /// Zero deltas and buttons and drop to not-ready.
    pub fn reset(&mut self) {
        self.readiness = Readiness::NotReady;
        self.accumulator = MotionAccumulator::new();
        self.buttons = ButtonState::RELEASED;
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn accumulator(&self) -> MotionAccumulator {
        self.accumulator
    }

    /// Mutable access for the sampler, which drains the sums.
    pub fn accumulator_mut(&mut self) -> &mut MotionAccumulator {
        &mut self.accumulator
    }

    pub fn buttons(&self) -> ButtonState {
        self.buttons
    }
}
