//! End-to-end scenarios: raw meter bytes in, consumer-facing values out.

use std::time::Duration;
use teleinfo_rs::teleinfo::labels;
use teleinfo_rs::teleinfo::serial_mock::MockSerialPort;
use teleinfo_rs::{FieldValue, FrameStore};

const LINE_TIMEOUT: Duration = Duration::from_secs(1);

async fn drain(store: &FrameStore) {
    for _ in 0..200 {
        if !store.is_running() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("producer did not finish");
}

#[tokio::test]
async fn test_warmup_then_frame_then_lookup() {
    // The scenario from the meter's point of view: a torn first line, then
    // one complete frame.
    let port = MockSerialPort::new();
    port.queue_line("warmup");
    port.queue_rx_data(b"\x02\n");
    port.queue_rx_data(b"ADCO 123456789\r\n");
    port.queue_rx_data(b"OPTARIF BASE\r\n");
    port.queue_rx_data(b"\x03\n");

    let store = FrameStore::new();
    store.start(port, LINE_TIMEOUT);
    drain(&store).await;

    let frame = store.current_frame().expect("one frame decoded");
    assert_eq!(frame.len(), 2);
    assert_eq!(store.field("adco"), Some(FieldValue::Integer(123_456_789)));
    assert_eq!(store.field("optarif"), Some(FieldValue::Text("BASE".into())));

    // Presentation metadata for the same keys lives outside the core.
    assert_eq!(labels::lookup("adco").map(|i| i.name), Some("Contrat"));
    assert_eq!(
        labels::lookup("optarif").map(|i| i.name),
        Some("Option tarifaire")
    );
}

#[tokio::test]
async fn test_realistic_stream_with_checksums_and_desync() {
    // A capture-shaped stream: per-group checksum characters as third
    // tokens, a frame restarted mid-way, and a mangled group.
    let port = MockSerialPort::new();
    port.queue_line("(k#APP 0075"); // torn first line
    port.queue_rx_data(b"\x02\n");
    port.queue_rx_data(b"ADCO 031762120162 ;\r\n");
    port.queue_rx_data(b"IINST 008 _\r\n");
    // Desync: a new frame starts before ETX; everything above is dropped.
    port.queue_rx_data(b"\x02\n");
    port.queue_rx_data(b"ADCO 031762120162 ;\r\n");
    port.queue_rx_data(b"OPTARIF HC.. <\r\n");
    port.queue_rx_data(b"HCHC 052890470 )\r\n");
    port.queue_rx_data(b"MANGLED\r\n");
    port.queue_rx_data(b"PAPP 00750 -\r\n");
    port.queue_rx_data(b"\x03\n");

    let store = FrameStore::new();
    store.start(port, LINE_TIMEOUT);
    drain(&store).await;

    let frame = store.current_frame().expect("second frame decoded");
    assert_eq!(frame.len(), 4);
    assert_eq!(
        store.field("hchc"),
        Some(FieldValue::Integer(52_890_470)),
        "leading zero counters coerce to integers"
    );
    assert_eq!(store.field("optarif"), Some(FieldValue::Text("HC..".into())));
    assert_eq!(store.field("iinst"), None, "desynced frame must be dropped");
}

#[tokio::test]
async fn test_steady_state_stream_publishes_every_boundary() {
    // Real wire layout: LF opens each data group, CR closes it, and ETX is
    // immediately followed by the next frame's STX. Every frame boundary
    // therefore arrives as one record `<group> CR ETX STX LF`, and each one
    // must publish the frame it finishes.
    let port = MockSerialPort::new();
    port.queue_line("warmup");
    port.queue_rx_data(b"\x02");
    for n in 1..=5u32 {
        port.queue_rx_data(format!("\nPAPP 0010{n}\r\nIINST 00{n}\r").as_bytes());
        if n < 5 {
            port.queue_rx_data(b"\x03\x02");
        } else {
            port.queue_rx_data(b"\x03");
        }
    }

    let store = FrameStore::new();
    store.start(port, LINE_TIMEOUT);
    drain(&store).await;

    let frame = store.current_frame().expect("steady-state frames must publish");
    assert_eq!(frame.len(), 2);
    assert_eq!(store.field("papp"), Some(FieldValue::Integer(105)));
    assert_eq!(store.field("iinst"), Some(FieldValue::Integer(5)));
}

#[tokio::test]
async fn test_boundary_record_publishes_finished_frame() {
    // A frame whose terminator shares a record with the next frame's start
    // marker is still published before accumulation restarts.
    let port = MockSerialPort::new();
    port.queue_line("warmup");
    // The trailing LF belongs to the next frame's first group; it closes
    // the boundary record so the reader can yield it.
    port.queue_rx_data(b"\x02\nBASE 052890470\r\x03\x02\n");
    port.set_hang_on_empty(true);

    let store = FrameStore::new();
    store.start(port, LINE_TIMEOUT);
    for _ in 0..100 {
        if store.current_frame().is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(store.field("base"), Some(FieldValue::Integer(52_890_470)));
    store.stop();
}

#[tokio::test]
async fn test_undecodable_records_are_skipped() {
    let port = MockSerialPort::new();
    port.queue_line("warmup");
    port.queue_rx_data(b"\x02\n");
    port.queue_rx_data(&[0xFF, 0x13, 0x00, b'\n']); // parity storm
    port.queue_rx_data(b"ISOUSC 30\r\n");
    port.queue_rx_data(b"\x03\n");

    let store = FrameStore::new();
    store.start(port, LINE_TIMEOUT);
    drain(&store).await;

    assert_eq!(store.field("isousc"), Some(FieldValue::Integer(30)));
}
