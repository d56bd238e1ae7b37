//! Log block reader
//!
//! Replays the log block stored in the logger's memory: the header is read
//! first, then the address range is walked in requests of up to
//! [`RECORDS_PER_REQUEST`] records, and finally the block is closed again.

use chrono::{SubsecRound, Utc};
use tracing::{debug, trace, warn};

use super::{LogHeader, Measurement, RECORD_SIZE};
use crate::protocol::commands::{Command, RES_CLOSE};
use crate::protocol::frame::{decode_timestamp, expect_ack, read_log_request, verify_checksum};
use crate::protocol::{ProtocolError, RequestEngine};

/// Blocks starting below this address hold no records
pub const MIN_ADDRESS: u16 = 0x10;

/// Maximum number of records fetched by one request
pub const RECORDS_PER_REQUEST: u8 = 8;

/// Address units occupied by one record in device memory
const ADDRESS_STRIDE: u32 = 16;

/// Record size in a log data response: measurement plus 3-byte counter
const LOG_RECORD_SIZE: usize = RECORD_SIZE + 3;

/// One log data request: `records` records starting at `address`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub address: u16,
    pub records: u8,
}

impl Chunk {
    /// Expected response length including checksum
    pub fn response_len(&self) -> usize {
        usize::from(self.records) * LOG_RECORD_SIZE + 1
    }
}

/// Split the address range `[start, end]` into log data requests.
///
/// Every chunk but the last holds [`RECORDS_PER_REQUEST`] records; the last
/// one is shrunk to cover exactly the remaining records.
pub fn plan_chunks(start: u16, end: u16) -> Vec<Chunk> {
    if start < MIN_ADDRESS || end <= MIN_ADDRESS {
        return Vec::new();
    }

    let full = u32::from(RECORDS_PER_REQUEST);
    let end = u32::from(end);
    let mut address = u32::from(start);
    let mut chunks = Vec::new();

    while address <= end {
        let records = if address + ADDRESS_STRIDE * full > end {
            (end - address) / ADDRESS_STRIDE + 1
        } else {
            full
        };
        // address <= end <= u16::MAX and records <= 8
        chunks.push(Chunk {
            address: address as u16,
            records: records as u8,
        });
        address += ADDRESS_STRIDE * full;
    }

    chunks
}

/// An opened log block
pub struct LogReader<'a> {
    engine: &'a RequestEngine,
    header: LogHeader,
}

impl<'a> LogReader<'a> {
    /// Open the log block and read its header.
    ///
    /// Returns `None` when the logger answers with no bytes at all, which
    /// means no log block is available.
    pub async fn open(engine: &'a RequestEngine) -> Result<Option<LogReader<'a>>, ProtocolError> {
        let command = Command::ReadLogHeader;
        let frame = match engine.request(command, &[command.byte()]).await {
            Err(ProtocolError::EndOfStream) => return Ok(None),
            result => result?,
        };
        if frame.is_empty() {
            return Ok(None);
        }

        let header = LogHeader::decode(&frame, Utc::now().trunc_subsecs(0))?;
        debug!(
            "log header: opened at {}, timestamp {}, record length {}, start {:#06x}, end {:#06x}",
            header.opened_at,
            header.timestamp,
            header.record_length,
            header.start_address,
            header.end_address
        );

        Ok(Some(Self { engine, header }))
    }

    /// Header of the opened block
    pub fn header(&self) -> &LogHeader {
        &self.header
    }

    /// Read every record of the block
    pub async fn read(&self) -> Result<Vec<Measurement>, ProtocolError> {
        let chunks = plan_chunks(self.header.start_address, self.header.end_address);
        if chunks.is_empty() {
            debug!("log block is empty");
            return Ok(Vec::new());
        }

        let total = chunks.iter().map(|c| usize::from(c.records)).sum();
        let mut measurements: Vec<Measurement> = Vec::with_capacity(total);

        for chunk in chunks {
            let frame = self
                .engine
                .request(Command::ReadLogData, &read_log_request(chunk.address, chunk.records))
                .await?;

            for record in decode_chunk(&frame, &chunk)? {
                let counter = decode_timestamp(&record[RECORD_SIZE..]);
                let measurement =
                    Measurement::decode(&record[..RECORD_SIZE], self.header.capture_time(counter));

                match measurements.last() {
                    Some(previous) if measurement.time < previous.time => warn!(
                        "record timestamp {} at {} is older than the previous record at {} [{:02x?}]",
                        counter, measurement.time, previous.time, record
                    ),
                    _ => trace!("record timestamp {} at {} [{:02x?}]", counter, measurement.time, record),
                }

                measurements.push(measurement);
            }
        }

        Ok(measurements)
    }

    /// Close the log block
    pub async fn close(self) -> Result<(), ProtocolError> {
        let command = Command::CloseLog;
        let frame = self.engine.request(command, &[command.byte()]).await?;
        expect_ack(&frame, command, RES_CLOSE)
    }
}

/// Validate a log data response and split it into 12-byte records
fn decode_chunk<'f>(
    frame: &'f [u8],
    chunk: &Chunk,
) -> Result<std::slice::ChunksExact<'f, u8>, ProtocolError> {
    let operation = Command::ReadLogData.operation();
    if frame.len() != chunk.response_len() {
        return Err(ProtocolError::InvalidDataLength {
            operation,
            actual: frame.len(),
        });
    }
    verify_checksum(frame, operation)?;

    Ok(frame[..frame.len() - 1].chunks_exact(LOG_RECORD_SIZE))
}
