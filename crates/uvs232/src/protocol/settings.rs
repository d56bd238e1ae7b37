//! Connection specification
//!
//! A connection is described by a single string:
//! `"<device-path> <baud> <parity> <data-bits> <stop-bits>"`,
//! e.g. `"/dev/ttyUSB0 9600 n 8 1"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ProtocolError;

/// Parity symbol of the connection specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
    Mark,
    Space,
}

impl Parity {
    /// Parse a parity symbol (`n`, `o`, `e`, `m`, `s`)
    pub fn from_symbol(symbol: &str) -> Result<Self, ProtocolError> {
        match symbol {
            "n" => Ok(Parity::None),
            "o" => Ok(Parity::Odd),
            "e" => Ok(Parity::Even),
            "m" => Ok(Parity::Mark),
            "s" => Ok(Parity::Space),
            other => Err(ProtocolError::InvalidParameter(format!(
                "parity '{}' is not one of n, o, e, m, s",
                other
            ))),
        }
    }

    /// Symbol used in the connection specification
    pub fn symbol(&self) -> &'static str {
        match self {
            Parity::None => "n",
            Parity::Odd => "o",
            Parity::Even => "e",
            Parity::Mark => "m",
            Parity::Space => "s",
        }
    }
}

/// Stop-bit symbol of the connection specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

impl StopBits {
    /// Parse a stop-bit symbol (`1`, `1.5`, `2`)
    pub fn from_symbol(symbol: &str) -> Result<Self, ProtocolError> {
        match symbol {
            "1" => Ok(StopBits::One),
            "1.5" => Ok(StopBits::OnePointFive),
            "2" => Ok(StopBits::Two),
            other => Err(ProtocolError::InvalidParameter(format!(
                "stop bits '{}' is not one of 1, 1.5, 2",
                other
            ))),
        }
    }

    /// Symbol used in the connection specification
    pub fn symbol(&self) -> &'static str {
        match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        }
    }
}

/// Parsed connection specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSettings {
    /// Serial port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub path: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Parity
    pub parity: Parity,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits
    pub stop_bits: StopBits,
}

impl FromStr for PortSettings {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [path, baud, parity, data_bits, stop_bits] = fields.as_slice() else {
            return Err(ProtocolError::InvalidParameter(format!(
                "expected '<device> <baud> <parity> <data-bits> <stop-bits>', got '{}'",
                s
            )));
        };

        let baud_rate = baud
            .parse::<u32>()
            .ok()
            .filter(|b| *b > 0)
            .ok_or_else(|| ProtocolError::InvalidParameter(format!("baud rate '{}'", baud)))?;

        let data_bits = data_bits
            .parse::<u8>()
            .ok()
            .filter(|d| (5..=8).contains(d))
            .ok_or_else(|| ProtocolError::InvalidParameter(format!("data bits '{}'", data_bits)))?;

        Ok(Self {
            path: path.to_string(),
            baud_rate,
            parity: Parity::from_symbol(parity)?,
            data_bits,
            stop_bits: StopBits::from_symbol(stop_bits)?,
        })
    }
}

impl fmt::Display for PortSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.path,
            self.baud_rate,
            self.parity.symbol(),
            self.data_bits,
            self.stop_bits.symbol()
        )
    }
}
