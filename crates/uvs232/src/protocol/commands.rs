//! Protocol commands
//!
//! Defines the commands understood by the UVS232 and the tag bytes it
//! answers with.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header block identifier (first byte of the log header response)
pub const RES_HEADER: u8 = 0x0F;
/// Header layout version (second byte of the log header response)
pub const RES_HEADER_VERSION: u8 = 0xA7;
/// Acknowledgement of the close-log command
pub const RES_CLOSE: u8 = 0xAD;
/// Acknowledgement of the clear-log command
pub const RES_RESET: u8 = 0xAF;
/// Current data is not available while the logger syncs with the controller
pub const RES_NO_DATA: u8 = 0xAB;

/// Protocol commands for data logger communication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Query logger firmware version
    Version,

    /// Read the current controller measurement
    CurrentData,

    /// Open the log block and read its header
    ReadLogHeader,

    /// Read records from the log block
    ReadLogData,

    /// Close the log block
    CloseLog,

    /// Delete all logged records
    ClearLog,
}

impl Command {
    /// Get the command byte sent on the wire
    pub fn byte(&self) -> u8 {
        match self {
            Command::Version => 0x81,
            Command::CurrentData => 0xAB,
            Command::ReadLogHeader => 0xAA,
            Command::ReadLogData => 0xAC,
            Command::CloseLog => 0xAD,
            Command::ClearLog => 0xAF,
        }
    }

    /// Operation name used in logs and error messages
    pub fn operation(&self) -> &'static str {
        match self {
            Command::Version => "version",
            Command::CurrentData => "current data",
            Command::ReadLogHeader => "log header",
            Command::ReadLogData => "log data",
            Command::CloseLog => "log close",
            Command::ClearLog => "clear log",
        }
    }

    /// Check if the command is sent as a single byte without checksum
    pub fn is_single_byte(&self) -> bool {
        !matches!(self, Command::ReadLogData)
    }
}

/// Controller families reported in byte 0 of the current data response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceFamily {
    Uvr42,
    Uvr31,
    Uvr64,
    Hzr65,
    Eeg30,
    Tfm66,
}

impl DeviceFamily {
    /// Map a response tag to a device family
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x10 => Some(DeviceFamily::Uvr42),
            0x30 => Some(DeviceFamily::Uvr31),
            0x20 => Some(DeviceFamily::Uvr64),
            0x60 => Some(DeviceFamily::Hzr65),
            0x50 => Some(DeviceFamily::Eeg30),
            0x40 => Some(DeviceFamily::Tfm66),
            _ => None,
        }
    }

    /// Only the UVR42 record layout is decoded
    pub fn is_supported(&self) -> bool {
        matches!(self, DeviceFamily::Uvr42)
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceFamily::Uvr42 => "UVR42",
            DeviceFamily::Uvr31 => "UVR31",
            DeviceFamily::Uvr64 => "UVR64",
            DeviceFamily::Hzr65 => "HZR65",
            DeviceFamily::Eeg30 => "EEG30",
            DeviceFamily::Tfm66 => "TFM66",
        };
        f.write_str(name)
    }
}

/// Firmware variants reported by the version command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirmwareVersion {
    /// Old firmware, an update is required
    Outdated,
    /// UVS232 with one data line
    OneDataLine,
    /// UVS232 with two data lines
    TwoDataLines,
}

impl FirmwareVersion {
    /// Map a response byte to a firmware variant
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0xA6 => Some(FirmwareVersion::Outdated),
            0xA7 => Some(FirmwareVersion::OneDataLine),
            0xD0 => Some(FirmwareVersion::TwoDataLines),
            _ => None,
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            FirmwareVersion::Outdated => "old version (update required)",
            FirmwareVersion::OneDataLine => "UVS232 (1DL)",
            FirmwareVersion::TwoDataLines => "UVS232 (2DL)",
        }
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
