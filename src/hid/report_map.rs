//! HID Report Map parser.
//!
//! Walks a HID Report Descriptor and locates the fields of the first mouse
//! report: X/Y axes and buttons 1-3. The result is the [`FieldDescriptor`]
//! consumed by the report decoder.
//!
//! ## HID Report Descriptor Structure
//!
//! A Report Descriptor is a sequence of short items, each a one-byte prefix
//! (tag, type, size) followed by 0, 1, 2 or 4 data bytes:
//! - Usage Page / Usage / Usage Minimum / Usage Maximum: what a field means
//! - Report ID: which report the following fields belong to
//! - Report Size / Report Count: bits per field and number of fields
//! - Logical Minimum: whether values are signed
//! - Input: emits `Report Count` fields of `Report Size` bits
//!
//! ## Limitations
//!
//! - Push/Pop state and delimiters are ignored
//! - Long items are skipped
//! - Only the first report carrying mouse fields is described
//!
//! A map that stops mid-item or with collections still open was cut short
//! in transfer; [`classify`] reports it as [`MapLayout::Truncated`] unless
//! the mouse collection was already complete.

use super::{AxisField, DeviceState, DeviceType, FieldDescriptor};
use heapless::{LinearMap, Vec};

/// Maximum number of distinct report IDs tracked for bit offsets.
const MAX_REPORT_IDS: usize = 8;

/// Maximum queued local usages before a main item.
const MAX_USAGES: usize = 16;

/// Usage page codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsagePage {
    /// Generic Desktop (mouse, keyboard, joystick).
    GenericDesktop,
    /// Keyboard/Keypad.
    Keyboard,
    /// Button.
    Button,
    /// Consumer Control.
    Consumer,
    /// Unknown/unsupported.
    Unknown(u16),
}

impl From<u16> for UsagePage {
    fn from(code: u16) -> Self {
        match code {
            0x01 => UsagePage::GenericDesktop,
            0x07 => UsagePage::Keyboard,
            0x09 => UsagePage::Button,
            0x0C => UsagePage::Consumer,
            other => UsagePage::Unknown(other),
        }
    }
}

/// Generic Desktop usage codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DesktopUsage {
    Pointer,
    Mouse,
    Keyboard,
    X,
    Y,
    Wheel,
    Unknown(u16),
}

impl From<u16> for DesktopUsage {
    fn from(code: u16) -> Self {
        match code {
            0x01 => DesktopUsage::Pointer,
            0x02 => DesktopUsage::Mouse,
            0x06 => DesktopUsage::Keyboard,
            0x30 => DesktopUsage::X,
            0x31 => DesktopUsage::Y,
            0x38 => DesktopUsage::Wheel,
            other => DesktopUsage::Unknown(other),
        }
    }
}

/// A usage resolved against its page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Usage {
    page: UsagePage,
    id: u16,
}

impl Usage {
    /// Resolve a local usage item; 4-byte usages carry their own page.
    fn resolve(raw: u32, extended: bool, page: u16) -> Self {
        if extended {
            Self {
                page: UsagePage::from((raw >> 16) as u16),
                id: raw as u16,
            }
        } else {
            Self {
                page: UsagePage::from(page),
                id: raw as u16,
            }
        }
    }

    fn is_mouse_collection(&self) -> bool {
        self.page == UsagePage::GenericDesktop
            && matches!(
                DesktopUsage::from(self.id),
                DesktopUsage::Mouse | DesktopUsage::Pointer
            )
    }
}

/// Local item state, cleared after every main item.
#[derive(Default)]
struct Locals {
    usages: Vec<(u32, bool), MAX_USAGES>,
    minimum: Option<(u32, bool)>,
    maximum: Option<(u32, bool)>,
}

impl Locals {
    /// Usage assigned to the `n`th field of an Input item.
    fn usage(&self, n: u16, page: u16) -> Option<Usage> {
        if let Some(&(raw, ext)) = self
            .usages
            .get(usize::from(n))
            .or_else(|| self.usages.last())
        {
            return Some(Usage::resolve(raw, ext, page));
        }
        let (min, ext) = self.minimum?;
        let max = self.maximum.map_or(min, |(m, _)| m);
        let raw = min.saturating_add(u32::from(n)).min(max);
        Some(Usage::resolve(raw, ext, page))
    }

    /// Usage that names a Collection.
    fn first(&self, page: u16) -> Option<Usage> {
        self.usages
            .first()
            .map(|&(raw, ext)| Usage::resolve(raw, ext, page))
    }
}

/// Mouse fields found so far.
struct MouseFields {
    report_id: Option<u8>,
    descriptor: FieldDescriptor,
}

impl MouseFields {
    /// Accept a field only if it belongs to the first mouse report seen.
    fn claim(&mut self, report_id: u8) -> bool {
        match self.report_id {
            Some(id) => id == report_id,
            None => {
                self.report_id = Some(report_id);
                true
            }
        }
    }
}

/// What a Report Map says about the device behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MapLayout {
    /// A complete mouse report was described.
    Mouse(FieldDescriptor),
    /// The map is whole but describes no usable mouse report.
    NoMouse,
    /// The map ends before the mouse (or any collection) is complete.
    Truncated,
}

impl MapLayout {
    /// Layout the device attaches with.
    ///
    /// A truncated map falls back to the boot mouse layout; the transport
    /// must then switch the device to boot protocol. A map without a mouse
    /// still attaches, as a ready device that is not a mouse.
    pub fn descriptor(&self) -> FieldDescriptor {
        match self {
            MapLayout::Mouse(descriptor) => *descriptor,
            MapLayout::Truncated => FieldDescriptor::boot_mouse(),
            MapLayout::NoMouse => FieldDescriptor {
                state: DeviceState::Ready,
                kind: DeviceType::Unknown,
                ..FieldDescriptor::detached()
            },
        }
    }
}

/// Parse a HID Report Descriptor into the layout of its mouse report.
///
/// Returns `None` when the descriptor contains no mouse or pointer
/// collection with input fields, or when it was cut short.
pub fn parse(data: &[u8]) -> Option<FieldDescriptor> {
    match classify(data) {
        MapLayout::Mouse(descriptor) => Some(descriptor),
        MapLayout::NoMouse | MapLayout::Truncated => None,
    }
}

/// Walk a HID Report Descriptor and decide how the device can be read.
pub fn classify(data: &[u8]) -> MapLayout {
    let mut mouse = MouseFields {
        report_id: None,
        descriptor: FieldDescriptor {
            report_id: 0,
            state: DeviceState::Ready,
            kind: DeviceType::Mouse,
            ..FieldDescriptor::detached()
        },
    };

    // Global state.
    let mut usage_page: u16 = 0;
    let mut report_id: u8 = 0;
    let mut report_size: u16 = 0;
    let mut report_count: u16 = 0;
    let mut logical_min: i32 = 0;

    let mut locals = Locals::default();
    let mut offsets: LinearMap<u8, u16, MAX_REPORT_IDS> = LinearMap::new();
    let mut depth: u8 = 0;
    let mut mouse_depth: Option<u8> = None;
    let mut cut = false;

    let mut i = 0;
    while i < data.len() {
        let prefix = data[i];

        // Long item: 0xFE, data size, long tag, data.
        if prefix == 0xFE {
            let size = data.get(i + 1).copied().map_or(0, usize::from);
            i += 3 + size;
            if i > data.len() {
                cut = true;
                break;
            }
            continue;
        }

        let tag = (prefix >> 4) & 0x0F;
        let item_type = (prefix >> 2) & 0x03;
        let size = match prefix & 0x03 {
            0 => 0,
            1 => 1,
            2 => 2,
            _ => 4,
        };

        if i + 1 + size > data.len() {
            cut = true;
            break;
        }

        let bytes = &data[i + 1..i + 1 + size];
        let value: u32 = match size {
            0 => 0,
            1 => u32::from(bytes[0]),
            2 => u32::from(u16::from_le_bytes([bytes[0], bytes[1]])),
            _ => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        };
        let signed: i32 = match size {
            0 => 0,
            1 => i32::from(value as u8 as i8),
            2 => i32::from(value as u16 as i16),
            _ => value as i32,
        };

        match item_type {
            // Main items
            0 => {
                match tag {
                    // Input
                    0x08 => {
                        let offset = offsets.get(&report_id).copied().unwrap_or(0);
                        let constant = value & 0x01 != 0;
                        let variable = value & 0x02 != 0;
                        let relative = value & 0x04 != 0;

                        if mouse_depth.is_some() && variable && !constant {
                            for n in 0..report_count {
                                let Some(usage) = locals.usage(n, usage_page) else {
                                    break;
                                };
                                let bit = offset.wrapping_add(n.wrapping_mul(report_size));
                                assign_field(
                                    &mut mouse,
                                    usage,
                                    report_id,
                                    bit,
                                    report_size,
                                    relative,
                                    logical_min,
                                );
                            }
                        }

                        let next = offset.wrapping_add(report_size.wrapping_mul(report_count));
                        if offsets.insert(report_id, next).is_err() {
                            // Offsets past this point are unknown; a partial
                            // layout would decode garbage.
                            #[cfg(feature = "defmt")]
                            defmt::warn!(
                                "Report map: more than {} report ids, giving up",
                                MAX_REPORT_IDS
                            );
                            return MapLayout::NoMouse;
                        }
                    }
                    // Collection
                    0x0A => {
                        if mouse_depth.is_none()
                            && locals
                                .first(usage_page)
                                .is_some_and(|u| u.is_mouse_collection())
                        {
                            mouse_depth = Some(depth);
                        }
                        depth = depth.saturating_add(1);
                    }
                    // End Collection
                    0x0C => {
                        depth = depth.saturating_sub(1);
                        if mouse_depth == Some(depth) {
                            mouse_depth = None;
                        }
                    }
                    _ => {}
                }
                locals = Locals::default();
            }
            // Global items
            1 => match tag {
                // Usage Page
                0x00 => usage_page = value as u16,
                // Logical Minimum
                0x01 => logical_min = signed,
                // Report Size
                0x07 => report_size = value as u16,
                // Report ID
                0x08 => report_id = value as u8,
                // Report Count
                0x09 => report_count = value as u16,
                _ => {}
            },
            // Local items
            2 => {
                let extended = size == 4;
                match tag {
                    // Usage
                    0x00 => {
                        let _ = locals.usages.push((value, extended));
                    }
                    // Usage Minimum
                    0x01 => locals.minimum = Some((value, extended)),
                    // Usage Maximum
                    0x02 => locals.maximum = Some((value, extended)),
                    _ => {}
                }
            }
            _ => {}
        }

        i += 1 + size;
    }

    let incomplete = cut || depth > 0 || data.is_empty();

    match mouse.report_id {
        Some(id) if mouse_depth.is_none() => {
            mouse.descriptor.report_id = id;
            #[cfg(feature = "defmt")]
            defmt::debug!("Report map: mouse layout {}", mouse.descriptor);
            MapLayout::Mouse(mouse.descriptor)
        }
        _ if incomplete => {
            #[cfg(feature = "defmt")]
            defmt::debug!("Report map: cut short after {} bytes", data.len());
            MapLayout::Truncated
        }
        _ => {
            #[cfg(feature = "defmt")]
            defmt::debug!("Report map: no mouse fields found");
            MapLayout::NoMouse
        }
    }
}

fn assign_field(
    mouse: &mut MouseFields,
    usage: Usage,
    report_id: u8,
    bit: u16,
    report_size: u16,
    relative: bool,
    logical_min: i32,
) {
    match usage.page {
        UsagePage::GenericDesktop => {
            let slot = match DesktopUsage::from(usage.id) {
                DesktopUsage::X => 0,
                DesktopUsage::Y => 1,
                _ => return,
            };
            if mouse.descriptor.axis[slot].is_present() || !mouse.claim(report_id) {
                return;
            }
            mouse.descriptor.axis[slot] = AxisField {
                offset: bit,
                size: u8::try_from(report_size).unwrap_or(0),
                shift: 0,
                // Unsigned absolute values are re-centred on 0x8000.
                sign: !relative && logical_min >= 0,
                polarity: false,
            };
        }
        UsagePage::Button => {
            let slot = match usage.id {
                1..=3 => usize::from(usage.id - 1),
                _ => return,
            };
            if report_size != 1
                || mouse.descriptor.button[slot] != super::FIELD_ABSENT
                || !mouse.claim(report_id)
            {
                return;
            }
            mouse.descriptor.button[slot] = bit;
        }
        _ => {}
    }
}
