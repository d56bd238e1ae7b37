//! Session timing configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use super::{
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_SEND_DELAY_MS, DEFAULT_TIMEOUT_MS,
};

/// Timing parameters of a device session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Delay before each request, gives the logger time to turn around
    pub send_delay_ms: u64,
    /// Time to wait for a response
    pub timeout_ms: u64,
    /// Interval between bytes-available polls
    pub poll_interval_ms: u64,
    /// Delay before the single retry of a failed request
    pub retry_delay_ms: u64,
    /// Read timeout of the serial port itself
    pub read_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: DEFAULT_SEND_DELAY_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Delay before each request
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    /// Response timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval, at least one millisecond
    pub fn poll_interval(&self) -> Duration {
        // a zero interval would spin the poller
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Delay before the retry
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Serial port read timeout
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
