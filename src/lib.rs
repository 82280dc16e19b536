//! Library interface for usb2quad.
//!
//! Everything that does not touch hardware lives here so it can be tested
//! on the host: report field decoding, Report Map parsing, motion
//! accumulation, velocity sampling, quadrature generation and the output
//! line mapping.
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links against this crate for the conversion logic.

#![cfg_attr(not(test), no_std)]

pub mod bridge;
pub mod config;
pub mod hid;
pub mod host;
pub mod motion;
pub mod output;
pub mod quadrature;
pub mod sampler;
pub mod tick;

// Internal module paths for implementations shared with the firmware tree
#[path = "ble/adv_parser.rs"]
mod ble_adv_parser_impl;

pub mod ble {
    pub mod adv_parser {
        pub use crate::ble_adv_parser_impl::{
            advertises_hid, advertises_service, local_name, AdStructures, HID_SERVICE_UUID,
        };
    }
}

pub use bridge::Bridge;
pub use hid::FieldDescriptor;
pub use host::{HidHandler, HidHost, HostEvent, HostPorts};
pub use output::{LineLevels, OutputMapper};
pub use tick::TickSource;
