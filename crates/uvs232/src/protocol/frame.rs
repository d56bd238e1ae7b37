//! Frame encoding/decoding
//!
//! Frame format:
//! - 1 byte: opcode (command byte or response tag)
//! - N bytes: payload
//! - 1 byte: checksum, the sum of all preceding bytes modulo 256
//!
//! Single-byte frames carry no checksum.

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};

use super::commands::{Command, DeviceFamily, FirmwareVersion, RES_NO_DATA};
use super::ProtocolError;
use crate::datalog::{Measurement, RECORD_SIZE};

/// Length of a current data response: tag, record, checksum
pub const CURRENT_DATA_FRAME_LEN: usize = RECORD_SIZE + 2;

/// Calculate the additive mod-256 checksum of a byte sequence
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// Check that the last byte of a frame is the checksum of the bytes before it
pub fn is_valid(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((last, body)) => *last == checksum(body),
        None => false,
    }
}

/// Verify the trailing checksum, reporting the mismatch for `operation`
pub fn verify_checksum(frame: &[u8], operation: &'static str) -> Result<(), ProtocolError> {
    let (last, body) = frame.split_last().ok_or(ProtocolError::InvalidDataLength {
        operation,
        actual: 0,
    })?;
    let expected = checksum(body);
    if *last != expected {
        return Err(ProtocolError::InvalidChecksum {
            operation,
            expected,
            actual: *last,
        });
    }
    Ok(())
}

/// Decode a 3-byte little-endian device timestamp counter
pub fn decode_timestamp(bytes: &[u8]) -> u32 {
    LittleEndian::read_u24(&bytes[..3])
}

/// Builder for outbound request frames
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl FrameBuilder {
    /// Start a frame with the given command byte
    pub fn new(command: Command) -> Self {
        Self {
            bytes: vec![command.byte()],
        }
    }

    /// Add a single byte
    pub fn byte(mut self, b: u8) -> Self {
        self.bytes.push(b);
        self
    }

    /// Add a 16-bit value (little-endian)
    pub fn u16_le(mut self, value: u16) -> Self {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.bytes.extend_from_slice(&bytes);
        self
    }

    /// Build the frame. Multi-byte frames get a trailing checksum.
    pub fn build(mut self) -> Vec<u8> {
        if self.bytes.len() > 1 {
            let sum = checksum(&self.bytes);
            self.bytes.push(sum);
        }
        self.bytes
    }
}

/// Encode a log data request for `records` records starting at `address`
pub fn read_log_request(address: u16, records: u8) -> Vec<u8> {
    FrameBuilder::new(Command::ReadLogData)
        .u16_le(address)
        .byte(records)
        .build()
}

/// Decode the version response
pub fn decode_version(frame: &[u8]) -> Result<FirmwareVersion, ProtocolError> {
    let operation = Command::Version.operation();
    if frame.len() != 1 {
        return Err(ProtocolError::InvalidDataLength {
            operation,
            actual: frame.len(),
        });
    }

    FirmwareVersion::from_byte(frame[0]).ok_or(ProtocolError::UnknownValue {
        operation,
        value: frame[0],
    })
}

/// Decode the current data response, stamping the measurement with `now`
pub fn decode_current_data(
    frame: &[u8],
    now: DateTime<Utc>,
) -> Result<Measurement, ProtocolError> {
    let operation = Command::CurrentData.operation();

    // check frame
    if frame.is_empty() {
        return Err(ProtocolError::NoDataReceived);
    }
    if frame.len() > 1 {
        verify_checksum(frame, operation)?;
    }

    // check content
    let tag = frame[0];
    if tag == RES_NO_DATA {
        if frame.len() != 1 {
            return Err(ProtocolError::InvalidDataLength {
                operation,
                actual: frame.len(),
            });
        }
        return Err(ProtocolError::NoDataAvailable);
    }

    match DeviceFamily::from_tag(tag) {
        Some(family) if family.is_supported() => {
            if frame.len() != CURRENT_DATA_FRAME_LEN {
                return Err(ProtocolError::InvalidDataLength {
                    operation,
                    actual: frame.len(),
                });
            }
            Ok(Measurement::decode(&frame[1..=RECORD_SIZE], now))
        }
        Some(family) => Err(ProtocolError::UnsupportedDevice(family)),
        None => Err(ProtocolError::UnknownDevice(tag)),
    }
}

/// Check a single-byte acknowledgement
pub fn expect_ack(frame: &[u8], command: Command, ack: u8) -> Result<(), ProtocolError> {
    let operation = command.operation();
    if frame.len() != 1 {
        return Err(ProtocolError::InvalidDataLength {
            operation,
            actual: frame.len(),
        });
    }
    if frame[0] != ack {
        return Err(ProtocolError::UnknownValue {
            operation,
            value: frame[0],
        });
    }
    Ok(())
}
