//! Device session
//!
//! Handles the session lifecycle and command execution with the data logger.

use chrono::Utc;
use tracing::{debug, trace, warn};

use super::commands::{Command, FirmwareVersion, RES_RESET};
use super::config::SessionConfig;
use super::engine::RequestEngine;
use super::frame::{decode_current_data, decode_version, expect_ack};
use super::lock::{LinkLease, LinkLock};
use super::settings::PortSettings;
use super::transport::{Connector, Transport};
use super::ProtocolError;
use crate::datalog::{LogReader, Measurement};

/// An open, exclusive connection to the data logger.
///
/// The session holds the link lease exactly as long as its transport is
/// open. Dropping the session closes it.
pub struct DeviceSession {
    /// Request engine owning the transport (None once closed)
    engine: Option<RequestEngine>,
    /// Link lease (None once released)
    lease: Option<LinkLease>,
    /// Port settings the session was opened with
    settings: PortSettings,
}

impl DeviceSession {
    /// Open a session.
    ///
    /// `connection` is a connection specification such as
    /// `"/dev/ttyUSB0 9600 n 8 1"`. Waits for the link lock; the lock is
    /// released again if the port cannot be opened.
    pub async fn open(
        lock: &LinkLock,
        connector: &dyn Connector,
        connection: &str,
        config: SessionConfig,
    ) -> Result<Self, ProtocolError> {
        let settings: PortSettings = connection.parse()?;

        let mut lease = lock.acquire().await;
        match open_transport(connector, &settings, &config) {
            Ok(transport) => {
                debug!("session opened on {}", settings);
                Ok(Self {
                    engine: Some(RequestEngine::new(transport, config)),
                    lease: Some(lease),
                    settings,
                })
            }
            Err(e) => {
                // a failed open must never keep the link locked
                lease.release();
                debug!("failed to open {}: {}", settings, e);
                Err(e)
            }
        }
    }

    /// Close the session: drop both control lines, clear the port buffers,
    /// close the port and release the link. Closing twice is a no-op.
    pub fn close(&mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };

        match engine.transport().try_lock() {
            Ok(mut transport) => {
                let _ = transport.write_data_terminal_ready(false);
                let _ = transport.write_request_to_send(false);
                let _ = transport.clear_input_buffer();
                let _ = transport.clear_output_buffer();
            }
            Err(_) => warn!("port busy while closing, skipping line reset"),
        }
        drop(engine);

        if let Some(mut lease) = self.lease.take() {
            lease.release();
        }
        debug!("session on {} closed", self.settings.path);
    }

    /// Check if the session is open
    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    /// Port settings of this session
    pub fn settings(&self) -> &PortSettings {
        &self.settings
    }

    fn engine(&self) -> Result<&RequestEngine, ProtocolError> {
        self.engine.as_ref().ok_or(ProtocolError::NotConnected)
    }

    /// Query the logger firmware version
    pub async fn query_version(&mut self) -> Result<FirmwareVersion, ProtocolError> {
        let command = Command::Version;
        let frame = self.engine()?.request(command, &[command.byte()]).await?;
        let version = decode_version(&frame)?;
        debug!("version: {}", version);
        Ok(version)
    }

    /// Read the current controller measurement
    pub async fn query_current_data(&mut self) -> Result<Measurement, ProtocolError> {
        let command = Command::CurrentData;
        let frame = match self.engine()?.request(command, &[command.byte()]).await {
            Err(ProtocolError::EndOfStream) => Vec::new(),
            result => result?,
        };

        let measurement = decode_current_data(&frame, Utc::now())?;
        debug!("measurement {:?} [{:02x?}]", measurement, frame);
        Ok(measurement)
    }

    /// Delete all logged measurements
    pub async fn clear_log(&mut self) -> Result<(), ProtocolError> {
        let command = Command::ClearLog;
        let frame = self.engine()?.request(command, &[command.byte()]).await?;
        expect_ack(&frame, command, RES_RESET)
    }

    /// Read all logged measurements: open the log block, read it, close it.
    ///
    /// No log block yields an empty list. If reading fails the block is
    /// still closed and the read error is returned.
    pub async fn read_log(&mut self) -> Result<Vec<Measurement>, ProtocolError> {
        let engine = self.engine()?;

        trace!("start to read data header");
        let Some(reader) = LogReader::open(engine).await? else {
            debug!("no log block available");
            return Ok(Vec::new());
        };

        trace!("start to read data block");
        match reader.read().await {
            Ok(measurements) => {
                trace!("start to read data footer");
                reader.close().await?;
                debug!("read {} logged measurements", measurements.len());
                Ok(measurements)
            }
            Err(e) => {
                if let Err(close_err) = reader.close().await {
                    warn!("failed to close log block after read error: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open the port and prepare the control lines: RTS off, DTR on
fn open_transport(
    connector: &dyn Connector,
    settings: &PortSettings,
    config: &SessionConfig,
) -> Result<Box<dyn Transport>, ProtocolError> {
    let mut transport = connector.open(settings, config)?;
    transport.write_request_to_send(false)?;
    transport.write_data_terminal_ready(true)?;
    Ok(transport)
}
