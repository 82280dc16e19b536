//! BLE GAP scanner - finds the next HID peripheral.
//!
//! Uses the SoftDevice Central-role scanning API. Advertisements are
//! filtered by the presence of the HID Service UUID (0x1812); addresses
//! already held by another link are skipped.

use crate::ble::DiscoveredDevice;
use crate::error::{BleError, Error};
use defmt::{info, warn};
use embassy_time::{with_timeout, Duration};
use heapless::String;
use nrf_softdevice::ble::{central, Address};
use nrf_softdevice::Softdevice;
use usb2quad::ble::adv_parser::{advertises_hid, local_name};
use usb2quad::config::BLE_SCAN_DURATION_SECS;

/// Scan for up to `BLE_SCAN_DURATION_SECS` and return the first HID
/// advertiser whose address is not in `taken`.
pub async fn find_hid_peripheral(
    sd: &Softdevice,
    taken: &[Option<Address>],
) -> Result<DiscoveredDevice, Error> {
    info!("BLE scan starting ({} s window)", BLE_SCAN_DURATION_SECS);

    let config = central::ScanConfig {
        // Active scan to retrieve scan-response data (device names).
        active: true,
        ..Default::default()
    };

    let scan = central::scan(sd, &config, |params| {
        let data =
            unsafe { core::slice::from_raw_parts(params.data.p_data, params.data.len as usize) };

        if !advertises_hid(data) {
            return None;
        }

        let address = Address::from_raw(params.peer_addr);
        if taken.iter().flatten().any(|a| *a == address) {
            return None;
        }

        Some(DiscoveredDevice {
            address,
            name: local_name(data).unwrap_or_else(unnamed),
            rssi: params.rssi,
        })
    });

    match with_timeout(Duration::from_secs(BLE_SCAN_DURATION_SECS), scan).await {
        Ok(Ok(device)) => {
            info!("Found: {} (RSSI {})", device.name.as_str(), device.rssi);
            Ok(device)
        }
        Ok(Err(_)) => {
            warn!("BLE scan ended with error");
            Err(BleError::ScanFailed.into())
        }
        Err(_) => Err(Error::NoDevicesFound),
    }
}

fn unnamed() -> String<32> {
    let mut s = String::new();
    let _ = s.push_str("Unknown");
    s
}
