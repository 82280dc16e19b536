//! Status LED.
//!
//! Lit from boot. Each attach blinks it off for `STATUS_LED_PULSE_MS`.
//! Polled from the main loop so it never blocks the waveform.

use embassy_nrf::gpio::Output;
use embassy_time::{Duration, Instant};
use usb2quad::config::STATUS_LED_PULSE_MS;

pub struct StatusLed {
    /// Active-low.
    pin: Output<'static>,
    dark_until: Option<Instant>,
}

impl StatusLed {
    pub fn new(pin: Output<'static>) -> Self {
        let mut led = Self {
            pin,
            dark_until: None,
        };
        led.on();
        led
    }

    pub fn on(&mut self) {
        self.pin.set_low();
    }

    /// Start one blink.
    pub fn pulse(&mut self) {
        self.pin.set_high();
        self.dark_until = Some(Instant::now() + Duration::from_millis(STATUS_LED_PULSE_MS));
    }

    /// End the blink once its time is up.
    pub fn poll(&mut self, now: Instant) {
        if let Some(until) = self.dark_until {
            if now >= until {
                self.dark_until = None;
                self.on();
            }
        }
    }
}
