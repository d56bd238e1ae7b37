//! Serial port handling
//!
//! Provides the [`Transport`] implementation backed by the `serialport` crate.

use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;
use tracing::debug;

use super::config::SessionConfig;
use super::settings::{Parity, PortSettings, StopBits};
use super::transport::{Connector, Transport};
use super::ProtocolError;

/// Serial port wrapper implementing [`Transport`]
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Wrap an opened port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Transport for SerialChannel {
    fn clear_input_buffer(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn clear_output_buffer(&mut self) -> io::Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Output)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        self.port
            .bytes_to_read()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn write_data_terminal_ready(&mut self, level: bool) -> io::Result<()> {
        self.port
            .write_data_terminal_ready(level)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn write_request_to_send(&mut self, level: bool) -> io::Result<()> {
        self.port
            .write_request_to_send(level)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

fn to_serial_parity(parity: Parity) -> Result<serialport::Parity, ProtocolError> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Mark | Parity::Space => Err(ProtocolError::UnsupportedSetting(format!(
            "parity '{}' is not supported by the serial backend",
            parity.symbol()
        ))),
    }
}

fn to_serial_stop_bits(stop_bits: StopBits) -> Result<serialport::StopBits, ProtocolError> {
    match stop_bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OnePointFive => Err(ProtocolError::UnsupportedSetting(
            "1.5 stop bits are not supported by the serial backend".to_string(),
        )),
    }
}

fn to_serial_data_bits(data_bits: u8) -> Result<serialport::DataBits, ProtocolError> {
    match data_bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        other => Err(ProtocolError::InvalidParameter(format!("data bits '{}'", other))),
    }
}

/// Open a serial port with the given settings
pub fn open_port(
    settings: &PortSettings,
    read_timeout: Duration,
) -> Result<Box<dyn SerialPort>, ProtocolError> {
    let builder = serialport::new(&settings.path, settings.baud_rate)
        .data_bits(to_serial_data_bits(settings.data_bits)?)
        .parity(to_serial_parity(settings.parity)?)
        .stop_bits(to_serial_stop_bits(settings.stop_bits)?)
        .flow_control(serialport::FlowControl::None)
        .timeout(read_timeout);

    debug!("opening serial port {}", settings);
    builder
        .open()
        .map_err(|e| ProtocolError::SerialError(format!("{}: {}", settings.path, e)))
}

/// Opens [`SerialChannel`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    fn open(
        &self,
        settings: &PortSettings,
        config: &SessionConfig,
    ) -> Result<Box<dyn Transport>, ProtocolError> {
        let port = open_port(settings, config.read_timeout())?;
        Ok(Box::new(SerialChannel::new(port)))
    }
}
