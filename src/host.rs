//! Boundary with the HID transport.
//!
//! The transport (USB host stack, or the BLE HID-over-GATT link on the
//! nRF52840 firmware) produces [`HostEvent`]s. [`HidHost`] keeps the current
//! field layout for the attached device and turns each event into one call on
//! a [`HidHandler`], mirroring the `report` / `detected` / `capability_flags`
//! callbacks a HID host library exposes.

use crate::config::MAX_REPORT_SIZE;
use crate::hid::FieldDescriptor;
use heapless::Vec;

/// Number of host ports a [`HidHost`] tracks layouts for.
pub const HUB_COUNT: usize = 2;

/// Set of host ports (hubs) the transport should service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HostPorts(u8);

impl HostPorts {
    pub const NONE: Self = Self(0);
    pub const HUB0: Self = Self(1 << 0);
    pub const HUB1: Self = Self(1 << 1);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The single-port set for `hub`; empty for hubs beyond the bitmask.
    pub fn from_hub(hub: u8) -> Self {
        Self(1u8.checked_shl(u32::from(hub)).unwrap_or(0))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Callbacks invoked by the transport, one per event.
pub trait HidHandler {
    /// One framed input report from the device on `hub`.
    fn report(&mut self, hub: u8, descriptor: &FieldDescriptor, data: &[u8]);

    /// A device has attached.
    fn detected(&mut self);

    /// Ports this application wants serviced.
    fn capability_flags(&self) -> HostPorts;
}

/// Events queued by the transport for the polling loop.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostEvent {
    /// Device enumerated; its layout replaces any previous one.
    Attached { hub: u8, descriptor: FieldDescriptor },
    /// Raw input report, report ID byte included when the device uses one.
    Report {
        hub: u8,
        data: Vec<u8, MAX_REPORT_SIZE>,
    },
    /// Device went away.
    Detached { hub: u8 },
}

impl HostEvent {
    pub fn hub(&self) -> u8 {
        match self {
            HostEvent::Attached { hub, .. }
            | HostEvent::Report { hub, .. }
            | HostEvent::Detached { hub } => *hub,
        }
    }

    /// Build a report event, truncating payloads longer than the queue slot.
    pub fn report(hub: u8, data: &[u8]) -> Self {
        Self::framed(hub, 0, data)
    }

    /// Build a report event from a payload that arrived without its report
    /// ID, putting `report_id` back in front when it is non-zero.
    ///
    /// HID-over-GATT notifications carry the ID out of band; framing them
    /// this way makes them identical to USB interrupt-IN data.
    pub fn framed(hub: u8, report_id: u8, payload: &[u8]) -> Self {
        let mut buf: Vec<u8, MAX_REPORT_SIZE> = Vec::new();
        if report_id != 0 {
            // Cannot fail: the buffer is empty.
            let _ = buf.push(report_id);
        }
        let room = MAX_REPORT_SIZE - buf.len();
        let len = payload.len().min(room);
        // Cannot fail: `len` is bounded by the remaining capacity.
        let _ = buf.extend_from_slice(&payload[..len]);
        HostEvent::Report { hub, data: buf }
    }
}

/// Tracks each port's device layout and dispatches transport events.
#[derive(Debug, Default)]
pub struct HidHost {
    descriptors: [FieldDescriptor; HUB_COUNT],
}

impl HidHost {
    pub const fn new() -> Self {
        Self {
            descriptors: [FieldDescriptor::detached(); HUB_COUNT],
        }
    }

    /// Layout of the device attached on `hub`.
    pub fn descriptor(&self, hub: u8) -> Option<&FieldDescriptor> {
        self.descriptors.get(usize::from(hub))
    }

    /// Deliver one event to `handler`.
    ///
    /// Events from ports the handler did not ask for, or that this host
    /// has no slot for, are dropped. A detach is delivered as an empty
    /// report against the detached layout so the handler sees the device
    /// leave the ready state.
    pub fn dispatch<H: HidHandler>(&mut self, event: HostEvent, handler: &mut H) {
        let hub = event.hub();
        if !handler
            .capability_flags()
            .contains(HostPorts::from_hub(hub))
        {
            return;
        }
        let Some(slot) = self.descriptors.get_mut(usize::from(hub)) else {
            return;
        };

        match event {
            HostEvent::Attached { descriptor, .. } => {
                *slot = descriptor;
                handler.detected();
            }
            HostEvent::Report { data, .. } => {
                handler.report(hub, slot, &data);
            }
            HostEvent::Detached { .. } => {
                *slot = FieldDescriptor::detached();
                handler.report(hub, slot, &[]);
            }
        }
    }
}
