//! Upload destinations

use serde::Serialize;
use std::net::Ipv4Addr;

/// OTA port the ESP32 Arduino core listens on
pub const DEFAULT_OTA_PORT: u16 = 3232;

/// Where the image goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UploadTarget {
    Serial { port: String, baud: String },
    Network { host: Ipv4Addr, ota_port: u16 },
}

impl UploadTarget {
    /// A destination that parses as a dotted IPv4 address is a network
    /// target; anything else is a serial port name.
    pub fn from_destination(destination: &str, baud: &str, ota_port: u16) -> Self {
        match destination.trim().parse::<Ipv4Addr>() {
            Ok(host) => UploadTarget::Network { host, ota_port },
            Err(_) => UploadTarget::Serial {
                port: destination.to_string(),
                baud: baud.to_string(),
            },
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, UploadTarget::Network { .. })
    }
}

/// Serial flashing parameters taken from board preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialFlashSettings {
    pub chip: String,
    pub flash_mode: String,
    pub flash_freq: String,
}
