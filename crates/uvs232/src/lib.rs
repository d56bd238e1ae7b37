//! # UVS232 Protocol Client
//!
//! Client for the UVS232 data logger attached to solar and heating
//! controllers over a serial line.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Command framing and mod-256 checksum validation
//! - Requests with response timeout and a single retry
//! - Exclusive access to the serial link across sessions
//! - Current measurement queries
//! - Replay of the logged measurements with reconstructed timestamps
//!
//! ## Supported controllers
//!
//! - UVR42 (other controller families are detected and rejected)
//!
//! ## Example
//!
//! ```rust,ignore
//! use uvs232::Uvs232;
//!
//! let client = Uvs232::new();
//! let version = client.version("/dev/ttyUSB0 9600 n 8 1").await?;
//! println!("logger: {}", version);
//!
//! for m in client.read_data("/dev/ttyUSB0 9600 n 8 1").await? {
//!     println!("{} {:.1} {:.1}", m.time, m.temperature1, m.temperature2);
//! }
//! ```

pub mod client;
pub mod datalog;
pub mod protocol;

pub use client::Uvs232;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::Uvs232;
    pub use crate::datalog::{LogHeader, Measurement};
    pub use crate::protocol::{
        DeviceSession, FirmwareVersion, LinkLock, PortSettings, ProtocolError, SessionConfig,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
