//! BLE GATT HID Client - reads the Report Map and listens for input
//! reports on a connected peripheral.
//!
//! After GAP connection is established, this module:
//! 1. Discovers the HID Service (UUID 0x1812) and every HID Report
//!    characteristic (UUID 0x2A4D) with its descriptors.
//! 2. Raises the ATT MTU so the Report Map (UUID 0x2A4B) fits in one read,
//!    then reads and classifies it.
//! 3. Reads the Report Reference descriptor (0x2908) of each Report to
//!    learn its report ID, and enables CCCD notifications on the inputs.
//! 4. Frames every notification with the ID of the characteristic it came
//!    from and queues it for the main loop.
//!
//! If the Report Map arrives cut short the device is switched to Boot
//! Protocol (Protocol Mode 0x2A4E) and read through its Boot Mouse Input
//! Report (0x2A33) with the fixed boot layout.
//!
//! The `gatt_client` macro binds one handle per characteristic UUID, so a
//! device with several Report characteristics needs the hand-written
//! [`gatt_client::Client`] below.

use crate::ble::EventSender;
use crate::error::{BleError, Error};
use defmt::{debug, info, warn};
use heapless::Vec;
use nrf_softdevice::ble::gatt_client::{self, Characteristic, Descriptor, DiscoverError, HvxType};
use nrf_softdevice::ble::{Connection, Uuid};
use usb2quad::config::{BLE_ATT_MTU, MAX_REPORT_MAP_SIZE, MAX_REPORT_SIZE};
use usb2quad::hid::report_reference::REPORT_REFERENCE_UUID;
use usb2quad::hid::{report_map, FieldDescriptor, MapLayout, ReportReference};
use usb2quad::HostEvent;

const HID_SERVICE: Uuid = Uuid::new_16(0x1812);
const REPORT_MAP: Uuid = Uuid::new_16(0x2a4b);
const HID_REPORT: Uuid = Uuid::new_16(0x2a4d);
const PROTOCOL_MODE: Uuid = Uuid::new_16(0x2a4e);
const BOOT_MOUSE_INPUT: Uuid = Uuid::new_16(0x2a33);
const CCCD: Uuid = Uuid::new_16(0x2902);
const REPORT_REFERENCE: Uuid = Uuid::new_16(REPORT_REFERENCE_UUID);

/// Report characteristics tracked per device.
const MAX_REPORTS: usize = 8;

/// Handles of one Report characteristic.
#[derive(Clone, Copy, Default)]
struct ReportHandles {
    value: u16,
    cccd: u16,
    reference: u16,
    /// From the Report Reference; 0 when the descriptor is missing.
    report_id: u8,
    subscribed: bool,
}

/// One notification, with the report ID of its characteristic.
pub struct InputReport {
    pub report_id: u8,
    pub data: Vec<u8, MAX_REPORT_SIZE>,
}

/// GATT client for the HID-over-GATT service.
pub struct HidServiceClient {
    reports: Vec<ReportHandles, MAX_REPORTS>,
    report_map: u16,
    protocol_mode: u16,
    boot_mouse: ReportHandles,
    /// Reading the Boot Mouse Input Report instead of the Reports.
    boot: bool,
}

impl HidServiceClient {
    fn supports_boot_mouse(&self) -> bool {
        self.protocol_mode != 0 && self.boot_mouse.value != 0 && self.boot_mouse.cccd != 0
    }
}

fn handle_of(descriptors: &[Descriptor], uuid: Uuid) -> u16 {
    descriptors
        .iter()
        .find(|d| d.uuid == Some(uuid))
        .map_or(0, |d| d.handle)
}

impl gatt_client::Client for HidServiceClient {
    type Event = InputReport;

    fn uuid() -> Uuid {
        HID_SERVICE
    }

    fn new_undiscovered(_conn: Connection) -> Self {
        Self {
            reports: Vec::new(),
            report_map: 0,
            protocol_mode: 0,
            boot_mouse: ReportHandles::default(),
            boot: false,
        }
    }

    fn discovered_characteristic(
        &mut self,
        characteristic: &Characteristic,
        descriptors: &[Descriptor],
    ) {
        let Some(uuid) = characteristic.uuid else {
            return;
        };
        let handles = ReportHandles {
            value: characteristic.handle_value,
            cccd: handle_of(descriptors, CCCD),
            reference: handle_of(descriptors, REPORT_REFERENCE),
            ..ReportHandles::default()
        };

        if uuid == HID_REPORT {
            if self.reports.push(handles).is_err() {
                warn!("Too many HID Report characteristics, ignoring one");
            }
        } else if uuid == REPORT_MAP {
            self.report_map = characteristic.handle_value;
        } else if uuid == PROTOCOL_MODE {
            self.protocol_mode = characteristic.handle_value;
        } else if uuid == BOOT_MOUSE_INPUT {
            self.boot_mouse = handles;
        }
    }

    fn discovery_complete(&mut self) -> Result<(), DiscoverError> {
        if self.report_map == 0 || (self.reports.is_empty() && self.boot_mouse.value == 0) {
            return Err(DiscoverError::ServiceIncomplete);
        }
        Ok(())
    }

    fn on_hvx(
        &self,
        _conn: &Connection,
        type_: HvxType,
        handle: u16,
        data: &[u8],
    ) -> Option<InputReport> {
        if !matches!(type_, HvxType::Notification) {
            return None;
        }

        let report_id = if self.boot {
            (handle == self.boot_mouse.value).then_some(0)?
        } else {
            self.reports
                .iter()
                .find(|r| r.subscribed && r.value == handle)?
                .report_id
        };

        let len = data.len().min(MAX_REPORT_SIZE);
        let data = Vec::from_slice(&data[..len]).ok()?;
        Some(InputReport { report_id, data })
    }
}

async fn enable_notifications(conn: &Connection, cccd: u16) -> Result<(), Error> {
    gatt_client::write(conn, cccd, &[0x01, 0x00])
        .await
        .map_err(|_| BleError::NotifyFailed.into())
}

/// Switch to Boot Protocol and subscribe to the Boot Mouse Input Report.
async fn enter_boot_protocol(
    conn: &Connection,
    client: &mut HidServiceClient,
) -> Result<(), Error> {
    gatt_client::write_without_response(conn, client.protocol_mode, &[0x00])
        .await
        .map_err(|_| BleError::WriteFailed)?;
    enable_notifications(conn, client.boot_mouse.cccd).await?;
    client.boot = true;
    info!("Switched to boot protocol");
    Ok(())
}

/// Learn each Report's ID and subscribe to every input Report.
async fn subscribe_reports(
    conn: &Connection,
    client: &mut HidServiceClient,
) -> Result<(), Error> {
    for report in client.reports.iter_mut() {
        if report.cccd == 0 {
            continue;
        }

        if report.reference != 0 {
            let mut buf = [0u8; 8];
            let len = gatt_client::read(conn, report.reference, &mut buf)
                .await
                .map_err(|_| BleError::ReadFailed)?;
            match ReportReference::parse(&buf[..len]) {
                Some(reference) if reference.is_input() => report.report_id = reference.report_id,
                Some(_) => continue,
                None => {
                    warn!("Malformed report reference on handle {}", report.reference);
                    continue;
                }
            }
        }

        enable_notifications(conn, report.cccd).await?;
        report.subscribed = true;
        debug!("Subscribed to report id {} (handle {})", report.report_id, report.value);
    }

    if !client.reports.iter().any(|r| r.subscribed) {
        return Err(BleError::NotifyFailed.into());
    }
    Ok(())
}

/// Discover the HID service, classify its Report Map and subscribe to its
/// input reports.
///
/// A device without a mouse collection still attaches, with a layout that
/// the converter treats as not-a-mouse.
pub async fn discover_and_subscribe(
    conn: &Connection,
) -> Result<(HidServiceClient, FieldDescriptor), Error> {
    info!("Discovering HID service...");

    let mut client: HidServiceClient = gatt_client::discover(conn)
        .await
        .map_err(|_| Error::HidServiceNotFound)?;

    if gatt_client::att_mtu_exchange(conn, BLE_ATT_MTU).await.is_err() {
        warn!("ATT MTU exchange failed, Report Map may be cut short");
    }

    let mut map = [0u8; MAX_REPORT_MAP_SIZE];
    let len = gatt_client::read(conn, client.report_map, &mut map)
        .await
        .map_err(|_| BleError::ReadFailed)?;
    let layout = report_map::classify(&map[..len]);

    let descriptor = match layout {
        MapLayout::Truncated if client.supports_boot_mouse() => {
            warn!("Report map cut short at {} bytes, falling back to boot mouse", len);
            enter_boot_protocol(conn, &mut client).await?;
            layout.descriptor()
        }
        MapLayout::Truncated => {
            warn!("Report map cut short and no boot mouse report, not a mouse");
            subscribe_reports(conn, &mut client).await?;
            MapLayout::NoMouse.descriptor()
        }
        MapLayout::Mouse(desc) => {
            info!(
                "Report map parsed: {} bytes, mouse report id {}",
                len, desc.report_id
            );
            subscribe_reports(conn, &mut client).await?;
            desc
        }
        MapLayout::NoMouse => {
            warn!("Report map has no mouse collection");
            subscribe_reports(conn, &mut client).await?;
            layout.descriptor()
        }
    };

    info!("Subscribed to HID report notifications");
    Ok((client, descriptor))
}

/// Run the notification listener loop.
///
/// Blocks until the connection drops. Each notification becomes one
/// [`HostEvent::Report`] for `hub`, framed with its own report ID so the
/// converter can tell the mouse report from any other.
pub async fn run_notification_loop(
    conn: &Connection,
    client: &HidServiceClient,
    hub: u8,
    events: &EventSender,
) {
    info!("hub {}: HID notification loop started", hub);

    let _result = gatt_client::run(conn, client, |report: InputReport| {
        // try_send avoids blocking the SoftDevice event path; if the main
        // loop is behind, we drop.
        let event = HostEvent::framed(hub, report.report_id, &report.data);
        if events.try_send(event).is_err() {
            warn!("Host event queue full - dropping report");
        }
    })
    .await;

    info!("hub {}: HID notification loop ended (connection closed)", hub);
}
