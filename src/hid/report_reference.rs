//! Report Reference descriptor (0x2908).
//!
//! Every HID-over-GATT Report characteristic carries one. It names the
//! report ID and direction of the reports the characteristic transports,
//! which the notifications themselves do not repeat.

/// Descriptor UUID.
pub const REPORT_REFERENCE_UUID: u16 = 0x2908;

/// Report direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Input,
    Output,
    Feature,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportReference {
    pub report_id: u8,
    pub kind: ReportKind,
}

impl ReportReference {
    /// Decode the two-byte descriptor value: report ID, then report type
    /// (1 = input, 2 = output, 3 = feature).
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&report_id, rest) = data.split_first()?;
        let kind = match rest.first()? {
            1 => ReportKind::Input,
            2 => ReportKind::Output,
            3 => ReportKind::Feature,
            _ => return None,
        };
        Some(Self { report_id, kind })
    }

    pub fn is_input(&self) -> bool {
        self.kind == ReportKind::Input
    }
}
