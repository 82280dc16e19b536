//! Time sources.
//!
//! Both counters are free-running and wrap; only differences and window
//! membership are ever compared, never absolute values.

/// Free-running counters supplied by the timer hardware.
pub trait TickSource {
    /// Raw hardware tick. The waveform advances at most once per change.
    fn tick_raw(&self) -> u16;

    /// Wrapping millisecond counter.
    fn tick_msec(&self) -> u16;
}

/// Is `now` inside the half-open window `[begin, end)`, allowing for wrap?
pub fn msec_between(now: u16, begin: u16, end: u16) -> bool {
    now.wrapping_sub(begin) < end.wrapping_sub(begin)
}
