//! Firmware error type.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging. The
//! conversion core has no failure modes and never sees these.

use defmt::Format;

/// Errors raised by the HID transport while bringing up a link.
#[derive(Debug, Clone, Copy, Format)]
pub enum Error {
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// Scan window closed without a new HID peripheral.
    NoDevicesFound,

    /// The link could not be encrypted.
    Insecure,

    /// The peripheral does not expose an HID service.
    HidServiceNotFound,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, Format)]
pub enum BleError {
    /// Scan was cancelled or could not start.
    ScanFailed,
    /// Connection attempt failed.
    ConnectFailed,
    /// Report Map or Report Reference read failed.
    ReadFailed,
    /// Characteristic subscribe/notify failed.
    NotifyFailed,
    /// Protocol Mode write failed.
    WriteFailed,
}

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
