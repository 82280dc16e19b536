//! Bluetooth Low Energy HID transport.
//!
//! This module drives the Nordic SoftDevice S140 in **Central** role and
//! plays the part of a HID host stack for the converter:
//!
//! 1. **Scanner** - finds a peripheral advertising the HID-over-GATT
//!    Profile (HOGP).
//! 2. **HID Client** - reads the Report Map, subscribes to the input
//!    Reports and frames each notification with its report ID.
//! 3. **Link** - one task per host port; connects, secures the link and
//!    reports attach / report / detach as [`HostEvent`]s.
//!
//! Events reach the main loop through the [`HostEvent`] channel defined in
//! `main.rs`.
//!
//! [`HostEvent`]: usb2quad::HostEvent

pub mod hid_client;
pub mod link;
pub mod scanner;

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use heapless::String;
use nrf_softdevice::ble::Address;
use usb2quad::config::HOST_EVENT_QUEUE_DEPTH;
use usb2quad::HostEvent;

/// Producer end of the host event queue.
pub type EventSender =
    Sender<'static, CriticalSectionRawMutex, HostEvent, HOST_EVENT_QUEUE_DEPTH>;

/// Information about a discovered BLE peripheral.
#[derive(Clone, Format)]
pub struct DiscoveredDevice {
    /// BLE address.
    pub address: Address,
    /// Human-readable name (truncated to 32 bytes for `heapless::String`).
    pub name: String<32>,
    /// Received Signal Strength Indicator (dBm).
    pub rssi: i8,
}
