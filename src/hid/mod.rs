//! HID field layout and report-field decoding.
//!
//! A [`FieldDescriptor`] says where each analog axis and button lives inside
//! a raw report buffer. It is produced once per attach (see
//! [`report_map::parse`]) and never mutated afterwards; a detach replaces it
//! with [`FieldDescriptor::detached`].

pub mod decode;
pub mod report_map;
pub mod report_reference;

#[cfg(test)]
mod tests;

pub use decode::{decode_axis, decode_button, AxisLayout, NEUTRAL};
pub use report_map::MapLayout;
pub use report_reference::{ReportKind, ReportReference};

/// Sentinel bit offset / bit index meaning "this field is not present".
pub const FIELD_ABSENT: u16 = 0xFFFF;

/// Number of analog axes carried by a descriptor (X, Y).
pub const AXIS_COUNT: usize = 2;

/// Number of buttons carried by a descriptor.
pub const BUTTON_COUNT: usize = 3;

/// Link state reported by the enumerating collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Nothing attached on this port.
    #[default]
    Disconnected,
    /// Attached, descriptors still being read.
    Enumerating,
    /// Fields are known and reports can be decoded.
    Ready,
}

/// Device class reported by the enumerating collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceType {
    #[default]
    Unknown,
    Keyboard,
    Mouse,
    Joystick,
}

/// Location and normalisation of one analog axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisField {
    /// Bit offset into the report (after the report ID), or [`FIELD_ABSENT`].
    pub offset: u16,
    /// Field width in bits. Only 8, 10, 12 and 16 decode to live values.
    pub size: u8,
    /// Left shift applied after extraction.
    pub shift: u8,
    /// Add half-range (0x80 / 0x8000) after shifting.
    pub sign: bool,
    /// Complement the value after biasing.
    pub polarity: bool,
}

impl AxisField {
    /// An axis the device does not have.
    pub const ABSENT: Self = Self {
        offset: FIELD_ABSENT,
        size: 0,
        shift: 0,
        sign: false,
        polarity: false,
    };

    /// A plain 8-bit relative axis starting at `offset`.
    pub const fn relative8(offset: u16) -> Self {
        Self {
            offset,
            size: 8,
            shift: 0,
            sign: false,
            polarity: false,
        }
    }

    pub fn is_present(&self) -> bool {
        self.offset != FIELD_ABSENT
    }
}

impl Default for AxisField {
    fn default() -> Self {
        Self::ABSENT
    }
}

/// Per-device report layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldDescriptor {
    /// Report ID prefix expected on every report, 0 when the device uses none.
    pub report_id: u8,
    pub state: DeviceState,
    pub kind: DeviceType,
    /// X then Y.
    pub axis: [AxisField; AXIS_COUNT],
    /// Bit index of buttons 1..=3 (left, right, middle), or [`FIELD_ABSENT`].
    pub button: [u16; BUTTON_COUNT],
}

impl FieldDescriptor {
    /// Layout used while nothing is attached: every field absent.
    pub const fn detached() -> Self {
        Self {
            report_id: 0,
            state: DeviceState::Disconnected,
            kind: DeviceType::Unknown,
            axis: [AxisField::ABSENT; AXIS_COUNT],
            button: [FIELD_ABSENT; BUTTON_COUNT],
        }
    }

    /// Boot-protocol mouse: buttons in byte 0, X in byte 1, Y in byte 2.
    pub const fn boot_mouse() -> Self {
        Self {
            report_id: 0,
            state: DeviceState::Ready,
            kind: DeviceType::Mouse,
            axis: [AxisField::relative8(8), AxisField::relative8(16)],
            button: [0, 1, 2],
        }
    }

    /// Reports are decoded only for a ready mouse.
    pub fn is_ready_mouse(&self) -> bool {
        self.state == DeviceState::Ready && self.kind == DeviceType::Mouse
    }
}

impl Default for FieldDescriptor {
    fn default() -> Self {
        Self::detached()
    }
}
