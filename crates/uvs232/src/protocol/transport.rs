//! Transport abstraction
//!
//! The session talks to the logger through [`Transport`], a byte stream with
//! buffer control and modem control lines. [`Connector`] opens one from port
//! settings so sessions can be driven by the serial backend or a test double.

use std::io::{self, Read, Write};

use super::config::SessionConfig;
use super::settings::PortSettings;
use super::ProtocolError;

/// Byte stream to the data logger
pub trait Transport: Read + Write + Send {
    /// Discard bytes received but not yet read
    fn clear_input_buffer(&mut self) -> io::Result<()>;

    /// Discard bytes written but not yet transmitted
    fn clear_output_buffer(&mut self) -> io::Result<()>;

    /// Get number of bytes available to read
    fn bytes_to_read(&mut self) -> io::Result<u32>;

    /// Set the DTR control line
    fn write_data_terminal_ready(&mut self, level: bool) -> io::Result<()>;

    /// Set the RTS control line
    fn write_request_to_send(&mut self, level: bool) -> io::Result<()>;
}

/// Opens transports for sessions
pub trait Connector: Send + Sync {
    /// Open a transport with the given port settings
    fn open(
        &self,
        settings: &PortSettings,
        config: &SessionConfig,
    ) -> Result<Box<dyn Transport>, ProtocolError>;
}
