//! One-shot client
//!
//! Each call opens a session, runs one operation and closes the session
//! again, whatever the outcome. All calls made through one [`Uvs232`] (or
//! its clones) share a link lock and therefore never overlap on the wire.

use std::sync::Arc;
use tracing::trace;

use crate::datalog::Measurement;
use crate::protocol::{
    Connector, DeviceSession, FirmwareVersion, LinkLock, ProtocolError, SerialConnector,
    SessionConfig,
};

/// Entry point for talking to a UVS232 data logger
#[derive(Clone)]
pub struct Uvs232 {
    lock: LinkLock,
    connector: Arc<dyn Connector>,
    config: SessionConfig,
}

impl Uvs232 {
    /// Create a client using the serial port backend and default timing
    pub fn new() -> Self {
        Self::with_connector(SerialConnector, SessionConfig::default())
    }

    /// Create a client with a custom connector
    pub fn with_connector<C: Connector + 'static>(connector: C, config: SessionConfig) -> Self {
        Self {
            lock: LinkLock::new(),
            connector: Arc::new(connector),
            config,
        }
    }

    /// Replace the session timing
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// The link lock shared by all sessions of this client
    pub fn lock(&self) -> &LinkLock {
        &self.lock
    }

    /// Open a session for several operations in a row
    pub async fn open(&self, connection: &str) -> Result<DeviceSession, ProtocolError> {
        DeviceSession::open(
            &self.lock,
            self.connector.as_ref(),
            connection,
            self.config.clone(),
        )
        .await
    }

    /// Query the logger firmware version,
    /// e.g. `version("/dev/ttyUSB0 9600 n 8 1")`
    pub async fn version(&self, connection: &str) -> Result<FirmwareVersion, ProtocolError> {
        trace!("start version()");
        let mut session = self.open(connection).await?;
        let result = session.query_version().await;
        session.close();
        result
    }

    /// Read the current measurement
    pub async fn current_data(&self, connection: &str) -> Result<Measurement, ProtocolError> {
        trace!("start current_data()");
        let mut session = self.open(connection).await?;
        let result = session.query_current_data().await;
        session.close();
        result
    }

    /// Read all measurements stored in the logger
    pub async fn read_data(&self, connection: &str) -> Result<Vec<Measurement>, ProtocolError> {
        trace!("start read_data()");
        let mut session = self.open(connection).await?;
        let result = session.read_log().await;
        session.close();
        result
    }

    /// Delete the measurements stored in the logger
    pub async fn clear_data(&self, connection: &str) -> Result<(), ProtocolError> {
        trace!("start clear_data()");
        let mut session = self.open(connection).await?;
        let result = session.clear_log().await;
        session.close();
        result
    }
}

impl Default for Uvs232 {
    fn default() -> Self {
        Self::new()
    }
}
