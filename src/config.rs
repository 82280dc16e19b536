//! Application-wide constants and compile-time configuration.
//!
//! Timing parameters, buffer sizes and the BLE link settings live here so
//! they can be tuned in one place.

use crate::host::HostPorts;

// Conversion timing

/// Velocity sampling window (ms). Deltas accumulated over one window become
/// the per-tick phase increment for the next.
pub const SAMPLE_WINDOW_MS: u16 = 10;

/// Period of the raw tick that steps the phase generator (µs).
///
/// A full quadrature cycle is 1024 phase units, so a velocity of 256 per
/// tick produces one output edge every `PHASE_TICK_US`.
pub const PHASE_TICK_US: u64 = 100;

// Host side

/// Ports whose devices are serviced. One BLE link slot per port.
pub const HOST_PORTS: HostPorts = HostPorts::HUB0.union(HostPorts::HUB1);

/// Depth of the transport → main loop event queue.
pub const HOST_EVENT_QUEUE_DEPTH: usize = 8;

/// Largest input report carried per event, report ID included.
pub const MAX_REPORT_SIZE: usize = 20;

/// Largest HID report descriptor (Report Map) read from a device.
pub const MAX_REPORT_MAP_SIZE: usize = 256;

// BLE

/// Duration of a BLE scan window (seconds).
pub const BLE_SCAN_DURATION_SECS: u64 = 8;

/// BLE connection interval range (in 1.25 ms units).
/// 6 = 7.5 ms, the shortest the SoftDevice allows.
pub const BLE_CONN_INTERVAL_MIN: u16 = 6;
pub const BLE_CONN_INTERVAL_MAX: u16 = 12;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// ATT MTU negotiated before the Report Map is read. The map arrives in a
/// single read response, so it must fit in `BLE_ATT_MTU - 1` bytes.
pub const BLE_ATT_MTU: u16 = 256;

/// Pause before a link slot scans again after a failure or disconnect (ms).
pub const RECONNECT_DELAY_MS: u64 = 1000;

// GPIO pin assignments (nRF52840-DK defaults)
//
// Concrete `embassy_nrf::peripherals::*` are picked in `main.rs`.
//
//   X phase A          → P0.03
//   X phase B          → P0.04
//   Y phase A          → P0.28
//   Y phase B          → P0.29
//   Button left        → P0.30
//   Button middle      → P0.31
//   Button right       → P0.02
//   Button right (2nd) → P1.15
//   Status LED         → P0.13 (LED1, active-low)

/// Length of the status LED blink when a device attaches (ms).
pub const STATUS_LED_PULSE_MS: u64 = 100;
