//! usb2quad firmware entry point (nRF52840).
//!
//! Tasks:
//! - `softdevice_task`: runs the SoftDevice event loop.
//! - `link_task` (one per host port): BLE HID transport, feeds the
//!   host event queue.
//! - main: the polling loop. Drains at most one host event per pass,
//!   samples velocity, steps the quadrature generator and drives the pins.

#![no_std]
#![no_main]

mod ble;
mod error;
mod led;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::interrupt::Priority;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;
use led::StatusLed;
use nrf_softdevice::{raw, Softdevice};
use usb2quad::config::{BLE_ATT_MTU, HOST_EVENT_QUEUE_DEPTH, HOST_PORTS, PHASE_TICK_US};
use usb2quad::host::HUB_COUNT;
use usb2quad::motion::ReportOutcome;
use usb2quad::{
    Bridge, FieldDescriptor, HidHandler, HidHost, HostEvent, HostPorts, OutputMapper, TickSource,
};
use {defmt_rtt as _, panic_probe as _};

static HOST_EVENTS: Channel<CriticalSectionRawMutex, HostEvent, HOST_EVENT_QUEUE_DEPTH> =
    Channel::new();

/// Both converter clocks derived from the Embassy time driver.
struct EmbassyClock;

impl TickSource for EmbassyClock {
    fn tick_raw(&self) -> u16 {
        (Instant::now().as_micros() / PHASE_TICK_US) as u16
    }

    fn tick_msec(&self) -> u16 {
        Instant::now().as_millis() as u16
    }
}

/// The converter as seen by the HID transport.
struct App {
    bridge: Bridge,
    led: StatusLed,
}

impl HidHandler for App {
    fn report(&mut self, hub: u8, descriptor: &FieldDescriptor, data: &[u8]) {
        if self.bridge.report(descriptor, data) == ReportOutcome::Ignored {
            defmt::trace!("hub {}: report id mismatch, dropped", hub);
        }
    }

    fn detected(&mut self) {
        info!("HID device attached");
        self.led.pulse();
    }

    fn capability_flags(&self) -> HostPorts {
        HOST_PORTS
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: HUB_COUNT as u8,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: BLE_ATT_MTU }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 0,
            periph_role_count: 0,
            central_role_count: HUB_COUNT as u8,
            central_sec_count: HUB_COUNT as u8,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("usb2quad starting");

    // The SoftDevice reserves interrupt priorities 0, 1 and 4.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);

    // Idle level before anything else runs: buttons released.
    let pins = [
        Output::new(p.P0_03, Level::High, OutputDrive::Standard),
        Output::new(p.P0_04, Level::High, OutputDrive::Standard),
        Output::new(p.P0_28, Level::High, OutputDrive::Standard),
        Output::new(p.P0_29, Level::High, OutputDrive::Standard),
        Output::new(p.P0_30, Level::High, OutputDrive::Standard),
        Output::new(p.P0_31, Level::High, OutputDrive::Standard),
        Output::new(p.P0_02, Level::High, OutputDrive::Standard),
        Output::new(p.P1_15, Level::High, OutputDrive::Standard),
    ];
    let mut output = match OutputMapper::new(pins) {
        Ok(output) => output,
        Err(e) => match e {},
    };
    let led = StatusLed::new(Output::new(p.P0_13, Level::High, OutputDrive::Standard));

    let sd: &'static Softdevice = Softdevice::enable(&softdevice_config());
    unwrap!(spawner.spawn(softdevice_task(sd)));

    for hub in 0..HUB_COUNT as u8 {
        if HOST_PORTS.contains(HostPorts::from_hub(hub)) {
            unwrap!(spawner.spawn(ble::link::link_task(hub, sd, HOST_EVENTS.sender())));
        }
    }

    let clock = EmbassyClock;
    let mut host = HidHost::new();
    let mut app = App {
        bridge: Bridge::new(&clock),
        led,
    };
    let events = HOST_EVENTS.receiver();

    info!("Polling loop running");
    loop {
        if let Ok(event) = events.try_receive() {
            host.dispatch(event, &mut app);
        }

        app.led.poll(Instant::now());

        if let Some(levels) = app.bridge.poll(&clock) {
            if let Err(e) = output.apply(&levels) {
                warn!("Output write failed: {}", defmt::Debug2Format(&e));
            }
        }

        yield_now().await;
    }
}
