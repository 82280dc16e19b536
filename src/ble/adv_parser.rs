//! Advertisement data parsing.
//!
//! Advertising payloads are a run of AD structures, each
//! `[len, ad_type, data[len - 1]]`. Parsing stops at the first zero
//! length or at a structure that runs past the buffer.

use heapless::String;

/// HID service UUID (HID-over-GATT).
pub const HID_SERVICE_UUID: u16 = 0x1812;

const AD_INCOMPLETE_UUID16: u8 = 0x02;
const AD_COMPLETE_UUID16: u8 = 0x03;
const AD_SHORT_NAME: u8 = 0x08;
const AD_COMPLETE_NAME: u8 = 0x09;

/// Iterator over `(ad_type, data)` pairs.
pub struct AdStructures<'a> {
    data: &'a [u8],
}

impl<'a> AdStructures<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, rest) = self.data.split_first()?;
        let len = usize::from(len);
        if len == 0 || len > rest.len() {
            self.data = &[];
            return None;
        }
        let (structure, tail) = rest.split_at(len);
        self.data = tail;
        Some((structure[0], &structure[1..]))
    }
}

/// Does the advertisement list `uuid` among its 16-bit service UUIDs?
pub fn advertises_service(data: &[u8], uuid: u16) -> bool {
    let wanted = uuid.to_le_bytes();
    AdStructures::new(data)
        .filter(|(ad_type, _)| matches!(*ad_type, AD_INCOMPLETE_UUID16 | AD_COMPLETE_UUID16))
        .any(|(_, uuids)| uuids.chunks_exact(2).any(|c| c == wanted))
}

/// Shortcut for [`HID_SERVICE_UUID`].
pub fn advertises_hid(data: &[u8]) -> bool {
    advertises_service(data, HID_SERVICE_UUID)
}

/// Complete or shortened local name, truncated to 32 bytes.
pub fn local_name(data: &[u8]) -> Option<String<32>> {
    let (_, bytes) = AdStructures::new(data)
        .find(|(ad_type, _)| matches!(*ad_type, AD_SHORT_NAME | AD_COMPLETE_NAME))?;
    let mut name = String::new();
    for &b in bytes {
        if name.push(char::from(b)).is_err() {
            break;
        }
    }
    Some(name)
}
