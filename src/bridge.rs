//! The converter context.
//!
//! [`Bridge`] owns everything the report path and the polling path share:
//! the motion tracker fed by reports, the velocity sampler and the phase
//! generator. A single owner calls [`Bridge::report`] and [`Bridge::poll`]
//! from one execution context, so no locking is needed.

use crate::hid::{DeviceState, FieldDescriptor};
use crate::motion::{MotionTracker, ReportOutcome};
use crate::output::LineLevels;
use crate::quadrature::PhaseGenerator;
use crate::sampler::{Velocity, VelocitySampler};
use crate::tick::TickSource;

#[derive(Clone, Debug)]
pub struct Bridge {
    motion: MotionTracker,
    sampler: VelocitySampler,
    generator: PhaseGenerator,
}

impl Bridge {
    /// A not-ready bridge whose first sampling window and first tick start
    /// at the clock's current readings.
    pub fn new(clock: &impl TickSource) -> Self {
        Self::starting_at(clock.tick_msec(), clock.tick_raw())
    }

    pub const fn starting_at(now_ms: u16, now_tick: u16) -> Self {
        Self {
            motion: MotionTracker::new(),
            sampler: VelocitySampler::new(now_ms),
            generator: PhaseGenerator::new(now_tick),
        }
    }

    /// Feed one input report.
    ///
    /// A report from a device that is gone also clears the latched
    /// velocity, so the outputs stop on the next tick instead of running on
    /// for the rest of the window. Reports from a ready non-mouse device
    /// reset the tracker but leave the current window's velocity alone.
    pub fn report(&mut self, descriptor: &FieldDescriptor, data: &[u8]) -> ReportOutcome {
        let outcome = self.motion.report(descriptor, data);
        if outcome == ReportOutcome::Reset && descriptor.state == DeviceState::Disconnected {
            self.sampler.clear();
        }
        outcome
    }

    /// Latch a new velocity if the sampling window has elapsed.
    pub fn sample(&mut self, now_ms: u16) -> bool {
        let latched = self.sampler.sample(now_ms, self.motion.accumulator_mut());
        #[cfg(feature = "defmt")]
        if latched {
            let v = self.sampler.velocity();
            if v != Velocity::ZERO {
                defmt::trace!("velocity vx={} vy={}", v.vx, v.vy);
            }
        }
        latched
    }

    /// Step the generator if `now_tick` is new and return the line levels.
    pub fn advance(&mut self, now_tick: u16) -> Option<LineLevels> {
        let frame = self
            .generator
            .advance(now_tick, self.sampler.velocity())?;
        Some(LineLevels::map(&frame, &self.motion.buttons()))
    }

    /// One iteration of the polling loop: sample, then advance.
    ///
    /// Returns `None` when the raw tick has not moved since the last call;
    /// the lines should be left as they are.
    pub fn poll(&mut self, clock: &impl TickSource) -> Option<LineLevels> {
        self.sample(clock.tick_msec());
        self.advance(clock.tick_raw())
    }

    /// Levels for the current state without stepping anything.
    pub fn levels(&self) -> LineLevels {
        LineLevels::map(&self.generator.frame(), &self.motion.buttons())
    }

    pub fn motion(&self) -> &MotionTracker {
        &self.motion
    }

    pub fn velocity(&self) -> Velocity {
        self.sampler.velocity()
    }

    pub fn phase(&self) -> (u16, u16) {
        self.generator.phase()
    }
}
