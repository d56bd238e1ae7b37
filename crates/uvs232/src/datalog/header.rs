//! Log block header

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Duration, Utc};

use crate::protocol::commands::{Command, RES_HEADER, RES_HEADER_VERSION};
use crate::protocol::frame::{decode_timestamp, verify_checksum};
use crate::protocol::ProtocolError;

/// Length of the header response including checksum
pub const HEADER_FRAME_LEN: usize = 11;

/// Seconds per device timestamp tick
const TICK_SECONDS: i64 = 10;

/// The device reports record length with this offset added
const RECORD_LENGTH_OFFSET: u8 = 64;

/// Describes the log block opened on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHeader {
    /// Device timestamp counter when the block was opened
    pub timestamp: u32,
    /// Wall clock when the block was opened
    pub opened_at: DateTime<Utc>,
    /// Record length in device units
    pub record_length: u8,
    /// First record address
    pub start_address: u16,
    /// Last record address
    pub end_address: u16,
}

impl LogHeader {
    /// Decode the header response. `opened_at` is the local time the block
    /// was opened, truncated to whole seconds by the caller.
    pub fn decode(frame: &[u8], opened_at: DateTime<Utc>) -> Result<Self, ProtocolError> {
        let operation = Command::ReadLogHeader.operation();

        // check frame
        if frame.len() != HEADER_FRAME_LEN {
            return Err(ProtocolError::InvalidDataLength {
                operation,
                actual: frame.len(),
            });
        }
        verify_checksum(frame, operation)?;

        // check content
        if frame[0] != RES_HEADER {
            return Err(ProtocolError::InvalidIdentifier(frame[0]));
        }
        if frame[1] != RES_HEADER_VERSION {
            return Err(ProtocolError::InvalidVersion(frame[1]));
        }

        Ok(Self {
            timestamp: decode_timestamp(&frame[2..5]),
            opened_at,
            record_length: frame[5].wrapping_sub(RECORD_LENGTH_OFFSET),
            start_address: LittleEndian::read_u16(&frame[6..8]),
            end_address: LittleEndian::read_u16(&frame[8..10]),
        })
    }

    /// Absolute capture time of a record stamped with `counter`.
    ///
    /// The counter ticks every ten seconds, so a record lies
    /// `(timestamp - counter) * 10s` before the moment the block was opened.
    pub fn capture_time(&self, counter: u32) -> DateTime<Utc> {
        let ticks = i64::from(self.timestamp) - i64::from(counter);
        self.opened_at - Duration::seconds(ticks * TICK_SECONDS)
    }
}
