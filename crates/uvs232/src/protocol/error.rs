//! Protocol errors

use thiserror::Error;

use super::commands::DeviceFamily;

/// Errors that can occur during communication with the data logger
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported port setting: {0}")]
    UnsupportedSetting(String),

    #[error("Serial port error: {0}")]
    SerialError(String),

    #[error("Response timeout")]
    Timeout,

    #[error("End of stream: the port returned no bytes")]
    EndOfStream,

    #[error("Response polling was cancelled")]
    Cancelled,

    #[error("Response task failed: {0}")]
    TaskFailed(String),

    #[error("Not connected to the data logger")]
    NotConnected,

    #[error("{operation}: wrong response data length ({actual} bytes)")]
    InvalidDataLength {
        operation: &'static str,
        actual: usize,
    },

    #[error("{operation}: invalid checksum, expected {expected:#04x}, got {actual:#04x}")]
    InvalidChecksum {
        operation: &'static str,
        expected: u8,
        actual: u8,
    },

    #[error("log header: wrong response identifier {0:#04x}")]
    InvalidIdentifier(u8),

    #[error("log header: wrong version {0:#04x}")]
    InvalidVersion(u8),

    #[error("{operation}: unknown response value {value:#04x}")]
    UnknownValue { operation: &'static str, value: u8 },

    #[error("current data: unknown device {0:#04x}")]
    UnknownDevice(u8),

    #[error("current data: unsupported device {0}")]
    UnsupportedDevice(DeviceFamily),

    #[error("current data: no data available, sync is running")]
    NoDataAvailable,

    #[error("current data: no data received")]
    NoDataReceived,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
