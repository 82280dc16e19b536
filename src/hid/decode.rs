//! Report field decoder.
//!
//! Turns one [`AxisField`] or button index plus a raw report into a value.
//! Every supported axis encoding is normalised to the same left-justified
//! 16-bit representation:
//!
//! ```text
//! width  8 : byte << shift, [+0x80], [0xFF - v], then << 8
//! width 10 : (le16 >> bit) << 6,  << shift, [+0x8000], [0xFFFF - v]
//! width 12 : (le16 >> bit) << 4,  << shift, [+0x8000], [0xFFFF - v]
//! width 16 : le16,                << shift, [+0x8000], [0xFFFF - v]
//! other    : 0x8000
//! ```
//!
//! Bytes past the end of the buffer read as zero. The descriptor producer is
//! responsible for never pointing outside the report.

use super::{AxisField, FIELD_ABSENT};

/// Value produced for absent or unsupported axes.
pub const NEUTRAL: u16 = 0x8000;

/// Axis encodings the decoder knows how to extract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisLayout {
    /// Missing field or unsupported width.
    Absent,
    /// One whole byte.
    Bits8 { byte: usize },
    /// 10 or 12 bits packed inside a little-endian byte pair.
    Packed { byte: usize, bit: u8, width: u8 },
    /// A full little-endian word.
    Bits16 { byte: usize },
}

impl AxisField {
    /// Classify this field by width.
    pub fn layout(&self) -> AxisLayout {
        if self.offset == FIELD_ABSENT {
            return AxisLayout::Absent;
        }
        let byte = usize::from(self.offset >> 3);
        match self.size {
            8 => AxisLayout::Bits8 { byte },
            10 | 12 => AxisLayout::Packed {
                byte,
                bit: (self.offset & 7) as u8,
                width: self.size,
            },
            16 => AxisLayout::Bits16 { byte },
            _ => AxisLayout::Absent,
        }
    }
}

/// Decode one analog axis into its normalised 16-bit value.
pub fn decode_axis(field: &AxisField, data: &[u8]) -> u16 {
    match field.layout() {
        AxisLayout::Absent => NEUTRAL,
        AxisLayout::Bits8 { byte } => {
            let mut v = shl8(byte_at(data, byte), field.shift);
            if field.sign {
                v = v.wrapping_add(0x80);
            }
            if field.polarity {
                v = 0xFF - v;
            }
            u16::from(v) << 8
        }
        AxisLayout::Packed { byte, bit, width } => {
            let raw = u32::from(word_at(data, byte)) >> bit;
            // Left-justify the significant bits, dropping anything above them.
            let v = (raw << (16 - u32::from(width))) as u16;
            finish_word(v, field)
        }
        AxisLayout::Bits16 { byte } => finish_word(word_at(data, byte), field),
    }
}

/// Decode one button. An absent button is never pressed.
pub fn decode_button(index: u16, data: &[u8]) -> bool {
    if index == FIELD_ABSENT {
        return false;
    }
    let byte = byte_at(data, usize::from(index >> 3));
    byte & (1 << (index & 7)) != 0
}

fn finish_word(v: u16, field: &AxisField) -> u16 {
    let mut v = shl16(v, field.shift);
    if field.sign {
        v = v.wrapping_add(0x8000);
    }
    if field.polarity {
        v = 0xFFFF - v;
    }
    v
}

fn byte_at(data: &[u8], index: usize) -> u8 {
    data.get(index).copied().unwrap_or(0)
}

fn word_at(data: &[u8], index: usize) -> u16 {
    u16::from_le_bytes([byte_at(data, index), byte_at(data, index.saturating_add(1))])
}

fn shl8(v: u8, shift: u8) -> u8 {
    u32::from(v).checked_shl(u32::from(shift)).unwrap_or(0) as u8
}

fn shl16(v: u16, shift: u8) -> u16 {
    u32::from(v).checked_shl(u32::from(shift)).unwrap_or(0) as u16
}
