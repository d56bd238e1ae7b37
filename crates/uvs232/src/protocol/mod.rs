//! Serial Protocol Communication
//!
//! Implements the UVS232 data logger protocol: single-byte commands,
//! responses terminated by an additive mod-256 checksum, and a paged read of
//! the logger memory.

pub mod commands;
mod config;
mod engine;
mod error;
pub mod frame;
mod lock;
pub mod serial;
mod session;
mod settings;
mod transport;

pub use commands::{Command, DeviceFamily, FirmwareVersion};
pub use config::SessionConfig;
pub use engine::RequestEngine;
pub use error::ProtocolError;
pub use lock::{LinkLease, LinkLock};
pub use serial::{open_port, SerialChannel, SerialConnector};
pub use session::DeviceSession;
pub use settings::{Parity, PortSettings, StopBits};
pub use transport::{Connector, Transport};

/// Delay before each request in milliseconds
pub const DEFAULT_SEND_DELAY_MS: u64 = 20;

/// Default timeout for responses in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Interval between bytes-available polls in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Delay before retrying a failed request in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Read timeout of the serial port in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 100;

/// Maximum response size
pub const MAX_BUFFER_SIZE: usize = 128;
