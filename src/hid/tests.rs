//! Unit tests for report-field decoding and report map parsing.
//!
//! These tests run on the host (not embedded) and pin down the exact bit
//! arithmetic of every supported field width.

use super::*;

fn axis(offset: u16, size: u8) -> AxisField {
    AxisField {
        offset,
        size,
        shift: 0,
        sign: false,
        polarity: false,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Button Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn button_absent_is_released() {
    assert!(!decode_button(FIELD_ABSENT, &[0xFF, 0xFF]));
}

#[test]
fn button_reads_indexed_bit() {
    let data = [0b0000_0101, 0b1000_0000];
    assert!(decode_button(0, &data));
    assert!(!decode_button(1, &data));
    assert!(decode_button(2, &data));
    assert!(decode_button(15, &data));
    assert!(!decode_button(14, &data));
}

#[test]
fn button_past_end_reads_released() {
    assert!(!decode_button(40, &[0xFF]));
}

// ═══════════════════════════════════════════════════════════════════════════
// Axis Layout Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn layout_by_width() {
    assert_eq!(axis(8, 8).layout(), AxisLayout::Bits8 { byte: 1 });
    assert_eq!(
        axis(20, 12).layout(),
        AxisLayout::Packed {
            byte: 2,
            bit: 4,
            width: 12
        }
    );
    assert_eq!(
        axis(16, 10).layout(),
        AxisLayout::Packed {
            byte: 2,
            bit: 0,
            width: 10
        }
    );
    assert_eq!(axis(24, 16).layout(), AxisLayout::Bits16 { byte: 3 });
    assert_eq!(axis(8, 7).layout(), AxisLayout::Absent);
    assert_eq!(AxisField::ABSENT.layout(), AxisLayout::Absent);
}

// ═══════════════════════════════════════════════════════════════════════════
// 8-bit Axis Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn width8_plain_is_byte_in_high_half() {
    for v in [0x00u8, 0x01, 0x7F, 0x80, 0xFF] {
        assert_eq!(decode_axis(&axis(0, 8), &[v]), u16::from(v) << 8);
    }
}

#[test]
fn width8_negative_delta_stays_negative() {
    // -1 as a relative delta becomes -256.
    assert_eq!(decode_axis(&axis(0, 8), &[0xFF]) as i16, -256);
}

#[test]
fn width8_polarity_inverts() {
    let field = AxisField {
        polarity: true,
        ..axis(0, 8)
    };
    for v in [0x00u8, 0x01, 0x40, 0xFF] {
        assert_eq!(decode_axis(&field, &[v]), u16::from(0xFF - v) << 8);
    }
}

#[test]
fn width8_sign_bias_wraps_within_byte() {
    let field = AxisField {
        sign: true,
        ..axis(0, 8)
    };
    assert_eq!(decode_axis(&field, &[0x00]), 0x8000);
    assert_eq!(decode_axis(&field, &[0x80]), 0x0000);
    assert_eq!(decode_axis(&field, &[0x7F]), 0xFF00);
}

#[test]
fn width8_shift_truncates_to_byte() {
    let field = AxisField {
        shift: 1,
        ..axis(0, 8)
    };
    assert_eq!(decode_axis(&field, &[0x7F]), 0xFE00);
    assert_eq!(decode_axis(&field, &[0x81]), 0x0200);
}

#[test]
fn width8_shift_then_bias_then_polarity() {
    let field = AxisField {
        offset: 8,
        size: 8,
        shift: 1,
        sign: true,
        polarity: true,
    };
    // 0x10 << 1 = 0x20, + 0x80 = 0xA0, 0xFF - 0xA0 = 0x5F.
    assert_eq!(decode_axis(&field, &[0x00, 0x10]), 0x5F00);
}

// ═══════════════════════════════════════════════════════════════════════════
// 10/12-bit Axis Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn width12_byte_aligned() {
    // Low 12 bits of 0x0ABC left-justified.
    assert_eq!(decode_axis(&axis(0, 12), &[0xBC, 0x0A]), 0xABC0);
}

#[test]
fn width12_nibble_aligned() {
    // Second 12-bit field of a packed X/Y pair: bits 12..24.
    let data = [0x00, 0x30, 0x12];
    assert_eq!(decode_axis(&axis(12, 12), &data), 0x1230);
}

#[test]
fn width10_left_justified() {
    // 0x3FF (max 10-bit) fills the top 10 bits.
    assert_eq!(decode_axis(&axis(0, 10), &[0xFF, 0x03]), 0xFFC0);
    assert_eq!(decode_axis(&axis(0, 10), &[0x01, 0x00]), 0x0040);
}

#[test]
fn width12_sign_and_polarity() {
    let field = AxisField {
        sign: true,
        polarity: true,
        ..axis(0, 12)
    };
    // 0x800 -> 0x8000, + 0x8000 = 0x0000, inverted = 0xFFFF.
    assert_eq!(decode_axis(&field, &[0x00, 0x08]), 0xFFFF);
}

// ═══════════════════════════════════════════════════════════════════════════
// 16-bit Axis Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn width16_little_endian() {
    assert_eq!(decode_axis(&axis(8, 16), &[0x00, 0x34, 0x12]), 0x1234);
}

#[test]
fn width16_bias_and_shift() {
    let field = AxisField {
        shift: 4,
        sign: true,
        ..axis(0, 16)
    };
    // 0x1234 << 4 = 0x2340, + 0x8000 = 0xA340.
    assert_eq!(decode_axis(&field, &[0x34, 0x12]), 0xA340);
}

#[test]
fn width16_ignores_sub_byte_offset() {
    assert_eq!(decode_axis(&axis(3, 16), &[0x34, 0x12]), 0x1234);
}

// ═══════════════════════════════════════════════════════════════════════════
// Neutral Value Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn absent_axis_is_neutral_for_any_buffer() {
    for data in [&[][..], &[0x00, 0x00][..], &[0xFF; 8][..]] {
        assert_eq!(decode_axis(&AxisField::ABSENT, data), NEUTRAL);
    }
}

#[test]
fn unsupported_width_is_neutral() {
    for size in [0u8, 1, 4, 7, 9, 11, 14, 24] {
        assert_eq!(decode_axis(&axis(0, size), &[0x12, 0x34, 0x56]), NEUTRAL);
    }
}

#[test]
fn axis_past_end_reads_zero() {
    assert_eq!(decode_axis(&axis(64, 8), &[0xFF]), 0);
    assert_eq!(decode_axis(&axis(0, 16), &[0x34]), 0x0034);
}

// ═══════════════════════════════════════════════════════════════════════════
// Report Map Tests
// ═══════════════════════════════════════════════════════════════════════════

/// Standard 3-button boot mouse with wheel.
const BOOT_MOUSE_MAP: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (1)
    0x29, 0x03, //     Usage Maximum (3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant)
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0x09, 0x38, //     Usage (Wheel)
    0x95, 0x01, //     Report Count (1)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection
    0xC0, // End Collection
];

/// Keyboard on report 1, 16-button mouse with packed 12-bit X/Y on report 2.
const COMPOSITE_MAP: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x01, //   Report ID (1)
    0x05, 0x07, //   Usage Page (Keyboard)
    0x19, 0xE0, //   Usage Minimum (0xE0)
    0x29, 0xE7, //   Usage Maximum (0xE7)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0xC0, // End Collection
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x02, //   Report ID (2)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (1)
    0x29, 0x10, //     Usage Maximum (16)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x10, //     Report Count (16)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x16, 0x01, 0xF8, // Logical Minimum (-2047)
    0x26, 0xFF, 0x07, // Logical Maximum (2047)
    0x75, 0x0C, //     Report Size (12)
    0x95, 0x02, //     Report Count (2)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection
    0xC0, // End Collection
];

#[test]
fn report_map_boot_mouse() {
    let desc = report_map::parse(BOOT_MOUSE_MAP).unwrap();
    assert_eq!(desc.report_id, 0);
    assert!(desc.is_ready_mouse());
    assert_eq!(desc.button, [0, 1, 2]);
    assert_eq!(desc.axis[0], AxisField::relative8(8));
    assert_eq!(desc.axis[1], AxisField::relative8(16));
    assert_eq!(desc, FieldDescriptor::boot_mouse());
}

#[test]
fn report_map_composite_with_report_ids() {
    let desc = report_map::parse(COMPOSITE_MAP).unwrap();
    assert_eq!(desc.report_id, 2);
    assert_eq!(desc.button, [0, 1, 2]);
    assert_eq!(desc.axis[0].offset, 16);
    assert_eq!(desc.axis[0].size, 12);
    assert_eq!(desc.axis[1].offset, 28);
    assert_eq!(desc.axis[1].size, 12);
    assert!(!desc.axis[0].sign);
}

#[test]
fn report_map_absolute_unsigned_axis_is_biased() {
    let map = [
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x02, // Usage (Mouse)
        0xA1, 0x01, // Collection (Application)
        0x15, 0x00, //   Logical Minimum (0)
        0x26, 0xFF, 0x7F, // Logical Maximum (32767)
        0x75, 0x10, //   Report Size (16)
        0x95, 0x02, //   Report Count (2)
        0x09, 0x30, //   Usage (X)
        0x09, 0x31, //   Usage (Y)
        0x81, 0x02, //   Input (Data, Variable, Absolute)
        0xC0, // End Collection
    ];
    let desc = report_map::parse(&map).unwrap();
    assert_eq!(desc.axis[0].offset, 0);
    assert_eq!(desc.axis[1].offset, 16);
    assert!(desc.axis[0].sign);
    assert_eq!(desc.button, [FIELD_ABSENT; BUTTON_COUNT]);
}

#[test]
fn report_map_keyboard_only_is_none() {
    let map = [
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x06, // Usage (Keyboard)
        0xA1, 0x01, // Collection (Application)
        0x05, 0x07, //   Usage Page (Keyboard)
        0x19, 0xE0, //   Usage Minimum
        0x29, 0xE7, //   Usage Maximum
        0x75, 0x01, //   Report Size (1)
        0x95, 0x08, //   Report Count (8)
        0x81, 0x02, //   Input (Data, Variable, Absolute)
        0xC0, // End Collection
    ];
    assert!(report_map::parse(&map).is_none());
}

#[test]
fn report_map_truncated_input_is_none() {
    assert!(report_map::parse(&[]).is_none());
    assert!(report_map::parse(&[0x05]).is_none());
    assert!(report_map::parse(&BOOT_MOUSE_MAP[..6]).is_none());
}

#[test]
fn report_map_then_decode_boot_report() {
    let desc = report_map::parse(BOOT_MOUSE_MAP).unwrap();
    let report = [0b0000_0011, 0x05, 0xFB, 0x00];
    assert_eq!(decode_axis(&desc.axis[0], &report) as i16, 5 * 256);
    assert_eq!(decode_axis(&desc.axis[1], &report) as i16, -5 * 256);
    assert!(decode_button(desc.button[0], &report));
    assert!(decode_button(desc.button[1], &report));
    assert!(!decode_button(desc.button[2], &report));
}

#[test]
fn report_map_cut_at_default_mtu_falls_back_to_boot_mouse() {
    // A 23-byte ATT MTU leaves 22 bytes: the map stops before its first Input.
    let cut = &BOOT_MOUSE_MAP[..22];
    assert!(report_map::parse(cut).is_none());
    assert_eq!(report_map::classify(cut), MapLayout::Truncated);
    assert_eq!(
        report_map::classify(cut).descriptor(),
        FieldDescriptor::boot_mouse()
    );
}

#[test]
fn report_map_cut_inside_mouse_collection_is_truncated() {
    let cut = &COMPOSITE_MAP[..COMPOSITE_MAP.len() - 1];
    assert_eq!(report_map::classify(cut), MapLayout::Truncated);
    assert_eq!(report_map::classify(&[]), MapLayout::Truncated);
    assert_eq!(report_map::classify(&[0x05]), MapLayout::Truncated);
}

#[test]
fn report_map_cut_after_mouse_collection_keeps_mouse() {
    let mut map: heapless::Vec<u8, 96> = heapless::Vec::new();
    map.extend_from_slice(BOOT_MOUSE_MAP).unwrap();
    // Start of a keyboard collection, cut inside the Collection item.
    map.extend_from_slice(&[0x05, 0x01, 0x09, 0x06, 0xA1]).unwrap();
    assert_eq!(
        report_map::classify(&map),
        MapLayout::Mouse(FieldDescriptor::boot_mouse())
    );
}

#[test]
fn report_map_without_mouse_attaches_as_unknown() {
    let map = [
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x06, // Usage (Keyboard)
        0xA1, 0x01, // Collection (Application)
        0x05, 0x07, //   Usage Page (Keyboard)
        0x19, 0xE0, //   Usage Minimum
        0x29, 0xE7, //   Usage Maximum
        0x75, 0x01, //   Report Size (1)
        0x95, 0x08, //   Report Count (8)
        0x81, 0x02, //   Input (Data, Variable, Absolute)
        0xC0, // End Collection
    ];
    let layout = report_map::classify(&map);
    assert_eq!(layout, MapLayout::NoMouse);

    let desc = layout.descriptor();
    assert_eq!(desc.state, DeviceState::Ready);
    assert_eq!(desc.kind, DeviceType::Unknown);
    assert!(!desc.is_ready_mouse());
}

#[test]
fn report_map_too_many_report_ids_gives_no_partial_layout() {
    let mut map: heapless::Vec<u8, 128> = heapless::Vec::new();
    map.extend_from_slice(&[
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x02, // Usage (Mouse)
        0xA1, 0x01, // Collection (Application)
        0x85, 0x01, //   Report ID (1)
        0x05, 0x09, //   Usage Page (Buttons)
        0x19, 0x01, //   Usage Minimum (1)
        0x29, 0x03, //   Usage Maximum (3)
        0x95, 0x03, //   Report Count (3)
        0x75, 0x01, //   Report Size (1)
        0x81, 0x02, //   Input (Data, Variable, Absolute)
        0xC0, // End Collection
    ])
    .unwrap();
    // Eight more report IDs, one constant byte each.
    for id in 2..=9u8 {
        map.extend_from_slice(&[0x85, id, 0x75, 0x08, 0x95, 0x01, 0x81, 0x01])
            .unwrap();
    }
    assert_eq!(report_map::classify(&map), MapLayout::NoMouse);
    assert!(report_map::parse(&map).is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// Report Reference Tests
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn report_reference_input() {
    let reference = ReportReference::parse(&[0x02, 0x01]).unwrap();
    assert_eq!(reference.report_id, 2);
    assert_eq!(reference.kind, ReportKind::Input);
    assert!(reference.is_input());
}

#[test]
fn report_reference_output_and_feature_are_not_input() {
    assert_eq!(
        ReportReference::parse(&[0x01, 0x02]).map(|r| r.kind),
        Some(ReportKind::Output)
    );
    assert!(!ReportReference::parse(&[0x03, 0x03]).unwrap().is_input());
}

#[test]
fn report_reference_malformed() {
    assert!(ReportReference::parse(&[]).is_none());
    assert!(ReportReference::parse(&[0x01]).is_none());
    assert!(ReportReference::parse(&[0x01, 0x00]).is_none());
    assert!(ReportReference::parse(&[0x01, 0x04]).is_none());
}
