mod common;

use chrono::{Duration, Utc};
use common::{data_frame, header_frame, record, sealed, MockConnector, MockLink, Reply, COM};
use pretty_assertions::assert_eq;
use uvs232::datalog::LogReader;
use uvs232::protocol::frame::read_log_request;
use uvs232::protocol::{ProtocolError, RequestEngine, SessionConfig};
use uvs232::Uvs232;

fn client(link: &MockLink) -> Uvs232 {
    Uvs232::with_connector(MockConnector::new(link.clone()), SessionConfig::default())
}

/// 16 records at 0x10..=0x100, counters 9984..=9999, header counter 10000
fn full_block() -> Vec<Reply> {
    let records: Vec<Vec<u8>> = (0..16u32)
        .map(|i| record(200 + i as i16, 0x21, 9_984 + i))
        .collect();
    vec![
        Reply::Bytes(header_frame(10_000, 0x10, 0x100)),
        Reply::Bytes(data_frame(&records[..8])),
        Reply::Bytes(data_frame(&records[8..])),
        Reply::Bytes(vec![0xAD]),
    ]
}

#[tokio::test(start_paused = true)]
async fn test_read_log_block() {
    common::init_tracing();
    let link = MockLink::new(full_block());

    let measurements = client(&link).read_data(COM).await.unwrap();

    assert_eq!(measurements.len(), 16);
    assert_eq!(measurements[0].temperature1, 20.0);
    assert_eq!(measurements[15].temperature1, 21.5);
    assert!(measurements.iter().all(|m| m.out1 && !m.out2 && m.rotation_speed == 1));
    for pair in measurements.windows(2) {
        assert_eq!(pair[1].time - pair[0].time, Duration::seconds(10));
    }

    assert_eq!(
        link.written(),
        vec![
            vec![0xAA],
            read_log_request(0x10, 8),
            read_log_request(0x90, 8),
            vec![0xAD],
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_timestamps_count_back_from_open_time() {
    let link = MockLink::new(full_block());
    let engine = RequestEngine::new(Box::new(link.transport()), SessionConfig::default());

    let before = Utc::now() - Duration::seconds(1);
    let reader = LogReader::open(&engine).await.unwrap().expect("log block");
    let header = reader.header().clone();

    assert_eq!(header.timestamp, 10_000);
    assert_eq!(header.start_address, 0x10);
    assert_eq!(header.end_address, 0x100);
    assert_eq!(header.record_length, 12);
    assert!(header.opened_at >= before && header.opened_at <= Utc::now());
    assert_eq!(header.opened_at.timestamp_subsec_nanos(), 0);

    let measurements = reader.read().await.unwrap();
    assert_eq!(measurements[0].time, header.opened_at - Duration::seconds(160));
    assert_eq!(measurements[15].time, header.opened_at - Duration::seconds(10));

    reader.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_no_log_block_is_not_an_error() {
    let link = MockLink::new([Reply::Eof, Reply::Eof]);

    let measurements = client(&link).read_data(COM).await.unwrap();

    assert!(measurements.is_empty());
    // header request and its retry, no close
    assert_eq!(link.written(), vec![vec![0xAA], vec![0xAA]]);
}

#[tokio::test(start_paused = true)]
async fn test_empty_address_range() {
    let link = MockLink::new([
        Reply::Bytes(header_frame(500, 0x08, 0x200)),
        Reply::Bytes(vec![0xAD]),
    ]);

    let measurements = client(&link).read_data(COM).await.unwrap();

    assert!(measurements.is_empty());
    assert_eq!(link.written(), vec![vec![0xAA], vec![0xAD]]);
}

#[tokio::test(start_paused = true)]
async fn test_header_errors() {
    let mut wrong_id = header_frame(1, 0x10, 0x20);
    wrong_id[0] = 0x0E;
    wrong_id[10] = wrong_id[10].wrapping_sub(1);

    let link = MockLink::new([
        Reply::Bytes(wrong_id),
        Reply::Bytes(sealed(vec![0x0F, 0xA7, 0x00])),
    ]);
    let client = client(&link);

    assert!(matches!(
        client.read_data(COM).await,
        Err(ProtocolError::InvalidIdentifier(0x0E))
    ));
    assert!(matches!(
        client.read_data(COM).await,
        Err(ProtocolError::InvalidDataLength { operation: "log header", actual: 4 })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_short_data_response_still_closes_block() {
    let records: Vec<Vec<u8>> = (0..7u32).map(|i| record(0, 0, 100 + i)).collect();
    let link = MockLink::new([
        Reply::Bytes(header_frame(200, 0x10, 0x80)),
        Reply::Bytes(data_frame(&records)),
        Reply::Bytes(vec![0xAD]),
    ]);

    let result = client(&link).read_data(COM).await;

    assert!(matches!(
        result,
        Err(ProtocolError::InvalidDataLength { operation: "log data", actual: 85 })
    ));
    assert_eq!(link.written().last(), Some(&vec![0xAD]));
}

#[tokio::test(start_paused = true)]
async fn test_data_checksum_error() {
    let records: Vec<Vec<u8>> = (0..2u32).map(|i| record(0, 0, 100 + i)).collect();
    let mut frame = data_frame(&records);
    frame[3] ^= 0x40;
    let link = MockLink::new([
        Reply::Bytes(header_frame(200, 0x10, 0x20)),
        Reply::Bytes(frame),
        Reply::Bytes(vec![0xAD]),
    ]);

    let result = client(&link).read_data(COM).await;
    assert!(matches!(
        result,
        Err(ProtocolError::InvalidChecksum { operation: "log data", .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_records_are_kept() {
    common::init_tracing();
    // counters run backwards, e.g. after the ring buffer wrapped
    let records: Vec<Vec<u8>> = [300u32, 299, 305]
        .iter()
        .map(|c| record(0, 0, *c))
        .collect();
    let link = MockLink::new([
        Reply::Bytes(header_frame(310, 0x10, 0x30)),
        Reply::Bytes(data_frame(&records)),
        Reply::Bytes(vec![0xAD]),
    ]);

    let measurements = client(&link).read_data(COM).await.unwrap();

    assert_eq!(measurements.len(), 3);
    assert!(measurements[1].time < measurements[0].time);
    assert!(measurements[2].time > measurements[0].time);
}

#[tokio::test(start_paused = true)]
async fn test_close_requires_ack() {
    let link = MockLink::new([
        Reply::Bytes(header_frame(200, 0x00, 0x00)),
        Reply::Bytes(vec![0xAF]),
    ]);

    let result = client(&link).read_data(COM).await;
    assert!(matches!(
        result,
        Err(ProtocolError::UnknownValue { operation: "log close", value: 0xAF })
    ));
}
