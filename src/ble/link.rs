//! BLE link tasks - one per host port.
//!
//! Each task loops forever: scan, connect, secure, discover, stream
//! reports, and after the link drops or fails wait `RECONNECT_DELAY_MS`
//! and start over. Scanning and connecting are serialised through
//! [`CLAIMS`], which also records which peripheral each port holds so two
//! ports never take the same device.

use crate::ble::{hid_client, scanner, EventSender};
use crate::error::{BleError, Error};
use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::security::{IoCapabilities, SecurityHandler};
use nrf_softdevice::ble::{central, Address, Connection, EncryptError, SecurityMode};
use nrf_softdevice::raw;
use nrf_softdevice::Softdevice;
use usb2quad::config;
use usb2quad::host::HUB_COUNT;
use usb2quad::HostEvent;

/// Peripheral address held by each port.
static CLAIMS: Mutex<CriticalSectionRawMutex, [Option<Address>; HUB_COUNT]> =
    Mutex::new([const { None }; HUB_COUNT]);

/// Pairing without bonding: no display, no keyboard, keys are not stored.
struct JustWorks;

impl SecurityHandler for JustWorks {
    fn io_capabilities(&self) -> IoCapabilities {
        IoCapabilities::None
    }

    fn can_bond(&self, _conn: &Connection) -> bool {
        false
    }

    fn on_security_update(&self, _conn: &Connection, mode: SecurityMode) {
        info!("BLE security mode updated: {}", mode);
    }
}

static PAIRING: JustWorks = JustWorks;

#[embassy_executor::task(pool_size = HUB_COUNT)]
pub async fn link_task(hub: u8, sd: &'static Softdevice, events: EventSender) -> ! {
    loop {
        let mut attached = false;
        match run_link(hub, sd, &events, &mut attached).await {
            Ok(()) => info!("hub {}: link closed", hub),
            Err(e) => warn!("hub {}: link failed: {}", hub, e),
        }

        release(hub).await;
        if attached {
            events.send(HostEvent::Detached { hub }).await;
        }

        Timer::after(Duration::from_millis(config::RECONNECT_DELAY_MS)).await;
    }
}

async fn release(hub: u8) {
    if let Some(slot) = CLAIMS.lock().await.get_mut(usize::from(hub)) {
        *slot = None;
    }
}

/// Claim a peripheral for `hub` and open a connection to it.
async fn claim_and_connect(hub: u8, sd: &'static Softdevice) -> Result<Connection, Error> {
    let mut claims = CLAIMS.lock().await;
    let device = scanner::find_hid_peripheral(sd, &claims[..]).await?;

    info!("hub {}: connecting to {}", hub, device.name.as_str());

    let whitelist = [&device.address];
    let conn_cfg = central::ConnectConfig {
        scan_config: central::ScanConfig {
            whitelist: Some(&whitelist),
            ..Default::default()
        },
        conn_params: raw::ble_gap_conn_params_t {
            min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
            max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
            slave_latency: config::BLE_SLAVE_LATENCY,
            conn_sup_timeout: config::BLE_SUP_TIMEOUT,
        },
        ..Default::default()
    };

    let conn = central::connect_with_security(sd, &conn_cfg, &PAIRING)
        .await
        .map_err(|_| BleError::ConnectFailed)?;

    if let Some(slot) = claims.get_mut(usize::from(hub)) {
        *slot = Some(device.address);
    }
    Ok(conn)
}

async fn wait_for_secure_link(conn: &Connection) -> bool {
    for _ in 0..25 {
        match conn.security_mode() {
            SecurityMode::NoAccess | SecurityMode::Open => {
                Timer::after(Duration::from_millis(200)).await
            }
            _ => return true,
        }
    }
    false
}

async fn run_link(
    hub: u8,
    sd: &'static Softdevice,
    events: &EventSender,
    attached: &mut bool,
) -> Result<(), Error> {
    let conn = claim_and_connect(hub, sd).await?;

    let secure_ok = match conn.encrypt() {
        Ok(()) => wait_for_secure_link(&conn).await,
        Err(EncryptError::PeerKeysNotFound) => {
            if conn.request_pairing().is_ok() {
                wait_for_secure_link(&conn).await
            } else {
                false
            }
        }
        Err(_) => false,
    };

    if !secure_ok {
        let _ = conn.disconnect();
        return Err(Error::Insecure);
    }

    let (client, descriptor) = hid_client::discover_and_subscribe(&conn).await?;

    events
        .send(HostEvent::Attached { hub, descriptor })
        .await;
    *attached = true;

    hid_client::run_notification_loop(&conn, &client, hub, events).await;

    Ok(())
}
