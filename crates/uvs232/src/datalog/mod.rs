//! Data Logging
//!
//! Measurements reported by the controller, and the reader that replays the
//! log block stored in the data logger's memory.

mod header;
mod reader;

pub use header::{LogHeader, HEADER_FRAME_LEN};
pub use reader::{plan_chunks, Chunk, LogReader, MIN_ADDRESS, RECORDS_PER_REQUEST};

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Size of one measurement record on the wire
pub const RECORD_SIZE: usize = 9;

const OUT1: u8 = 1 << 5;
const OUT2: u8 = OUT1 << 1;
const ROTATION_SPEED: u8 = 0x1F;

/// A single measurement captured by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Capture time
    pub time: DateTime<Utc>,
    /// Temperature sensor 1 in °C
    pub temperature1: f64,
    /// Temperature sensor 2 in °C
    pub temperature2: f64,
    /// Temperature sensor 3 in °C
    pub temperature3: f64,
    /// Temperature sensor 4 in °C
    pub temperature4: f64,
    /// Output relay 1
    pub out1: bool,
    /// Output relay 2
    pub out2: bool,
    /// Pump rotation speed step (0-31)
    pub rotation_speed: u8,
}

impl Measurement {
    /// Decode a 9-byte record.
    ///
    /// Bytes 0-7 hold four little-endian signed temperatures in tenths of a
    /// degree; byte 8 packs both relay outputs and the rotation speed.
    pub fn decode(record: &[u8], time: DateTime<Utc>) -> Self {
        let temperature = |i: usize| f64::from(LittleEndian::read_i16(&record[i..i + 2])) / 10.0;
        let flags = record[8];

        Self {
            time,
            temperature1: temperature(0),
            temperature2: temperature(2),
            temperature3: temperature(4),
            temperature4: temperature(6),
            out1: flags & OUT1 != 0,
            out2: flags & OUT2 != 0,
            rotation_speed: flags & ROTATION_SPEED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_flags() {
        let time = Utc::now();
        let m = Measurement::decode(&[0, 0, 0, 0, 0, 0, 0, 0, 0x5F], time);
        assert!(!m.out1);
        assert!(m.out2);
        assert_eq!(m.rotation_speed, 31);

        let m = Measurement::decode(&[0, 0, 0, 0, 0, 0, 0, 0, 0x60], time);
        assert!(m.out1);
        assert!(m.out2);
        assert_eq!(m.rotation_speed, 0);
    }

    #[test]
    fn test_decode_negative_temperatures() {
        let m = Measurement::decode(&[0xFF, 0xFF, 0x00, 0x80, 0xFF, 0x7F, 0x0A, 0x00, 0], Utc::now());
        assert_eq!(m.temperature1, -0.1);
        assert_eq!(m.temperature2, -3276.8);
        assert_eq!(m.temperature3, 3276.7);
        assert_eq!(m.temperature4, 1.0);
    }
}
