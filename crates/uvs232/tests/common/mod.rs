//! Scripted mock transport shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use uvs232::protocol::frame::checksum;
use uvs232::protocol::{Connector, PortSettings, ProtocolError, SessionConfig, Transport};

/// What the mock logger does after a frame is written
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with these bytes
    Bytes(Vec<u8>),
    /// Never answer
    Silent,
    /// Report data available but read 0 bytes
    Eof,
    /// Fail the write itself
    WriteError,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub script: VecDeque<Reply>,
    pub written: Vec<Vec<u8>>,
    pub pending: Vec<u8>,
    pub eof: bool,
    pub dtr: Option<bool>,
    pub rts: Option<bool>,
    pub clears: usize,
    pub open: bool,
    pub opens: usize,
    pub fail_lines: bool,
}

/// Handle on the mock logger, shared by the test and every transport it opens
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    state: Arc<Mutex<MockState>>,
}

impl MockLink {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let link = Self::default();
        link.state().script.extend(replies);
        link
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn push(&self, reply: Reply) {
        self.state().script.push_back(reply);
    }

    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state().written.clone()
    }

    pub fn transport(&self) -> MockTransport {
        let mut state = self.state();
        state.open = true;
        state.opens += 1;
        MockTransport { link: self.clone() }
    }
}

pub struct MockTransport {
    link: MockLink,
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.link.state();
        if state.eof {
            state.eof = false;
            return Ok(0);
        }
        let n = buf.len().min(state.pending.len());
        buf[..n].copy_from_slice(&state.pending[..n]);
        state.pending.drain(..n);
        Ok(n)
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.link.state();
        state.written.push(buf.to_vec());
        match state.script.pop_front().unwrap_or(Reply::Silent) {
            Reply::Bytes(bytes) => state.pending = bytes,
            Reply::Silent => {}
            Reply::Eof => state.eof = true,
            Reply::WriteError => {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write failed"))
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for MockTransport {
    fn clear_input_buffer(&mut self) -> io::Result<()> {
        let mut state = self.link.state();
        state.pending.clear();
        state.eof = false;
        state.clears += 1;
        Ok(())
    }

    fn clear_output_buffer(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn bytes_to_read(&mut self) -> io::Result<u32> {
        let state = self.link.state();
        if state.eof {
            return Ok(1);
        }
        Ok(state.pending.len() as u32)
    }

    fn write_data_terminal_ready(&mut self, level: bool) -> io::Result<()> {
        let mut state = self.link.state();
        if state.fail_lines {
            return Err(io::Error::new(io::ErrorKind::Other, "DTR failed"));
        }
        state.dtr = Some(level);
        Ok(())
    }

    fn write_request_to_send(&mut self, level: bool) -> io::Result<()> {
        let mut state = self.link.state();
        if state.fail_lines {
            return Err(io::Error::new(io::ErrorKind::Other, "RTS failed"));
        }
        state.rts = Some(level);
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.link.state().open = false;
    }
}

/// Connector handing out transports of one mock link
#[derive(Debug, Clone)]
pub struct MockConnector {
    pub link: MockLink,
    pub fail_open: bool,
}

impl MockConnector {
    pub fn new(link: MockLink) -> Self {
        Self {
            link,
            fail_open: false,
        }
    }
}

impl Connector for MockConnector {
    fn open(
        &self,
        _settings: &PortSettings,
        _config: &SessionConfig,
    ) -> Result<Box<dyn Transport>, ProtocolError> {
        if self.fail_open {
            return Err(ProtocolError::SerialError("no such port".to_string()));
        }
        Ok(Box::new(self.link.transport()))
    }
}

pub const COM: &str = "/dev/ttyUSB0 9600 n 8 1";

/// Append the mod-256 checksum
pub fn sealed(mut bytes: Vec<u8>) -> Vec<u8> {
    let sum = checksum(&bytes);
    bytes.push(sum);
    bytes
}

/// Log header response
pub fn header_frame(timestamp: u32, start: u16, end: u16) -> Vec<u8> {
    let ts = timestamp.to_le_bytes();
    let start = start.to_le_bytes();
    let end = end.to_le_bytes();
    sealed(vec![
        0x0F, 0xA7, ts[0], ts[1], ts[2], 0x4C, start[0], start[1], end[0], end[1],
    ])
}

/// One 12-byte log record: temperature 1 in tenths, flags, device counter
pub fn record(temperature1: i16, flags: u8, counter: u32) -> Vec<u8> {
    let t = temperature1.to_le_bytes();
    let c = counter.to_le_bytes();
    vec![t[0], t[1], 0, 0, 0, 0, 0, 0, flags, c[0], c[1], c[2]]
}

/// Log data response carrying the given records
pub fn data_frame(records: &[Vec<u8>]) -> Vec<u8> {
    sealed(records.concat())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
