use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use crate::audio::{AudioFormat, OutputState, PlaybackSink, put_samples_be};
use crate::error::StreamError;
use crate::protocol::rtp::RtpPacket;
use crate::receiver::{PlaybackDecision, ReceiverStream};
use crate::testing::{MemorySink, MockTransport};
use crate::types::ReceiverConfig;

fn peer() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 40000))
}

fn datagram(sequence: u16, samples: &[i16]) -> Vec<u8> {
    let mut payload = Vec::new();
    put_samples_be(&mut payload, samples);
    RtpPacket::audio(sequence, 0, payload).encode()
}

fn config(start_threshold: usize) -> ReceiverConfig {
    ReceiverConfig::builder()
        .start_threshold(start_threshold)
        .build()
        .unwrap()
}

#[test]
fn test_tick_drains_then_schedules() {
    let transport = MockTransport::new(35000);
    let mut stream =
        ReceiverStream::with_transport(&config(20), MemorySink::new(100), transport.clone())
            .unwrap();

    transport.push_inbound(datagram(0, &[1; 10]), peer());
    transport.push_inbound(datagram(1, &[2; 10]), peer());
    transport.push_inbound(datagram(2, &[3; 10]), peer());

    let report = stream.tick().unwrap();

    assert_eq!(report.datagrams, 3);
    assert_eq!(report.accepted, 3);
    assert_eq!(report.samples, 30);
    assert_eq!(report.decision, PlaybackDecision::Start);
    assert_eq!(stream.sink().state(), OutputState::Playing);
    assert_eq!(transport.pending_inbound(), 0);
}

#[test]
fn test_large_packet_written_whole() {
    let transport = MockTransport::new(35000);
    let mut stream =
        ReceiverStream::with_transport(&config(20), MemorySink::new(44100), transport.clone())
            .unwrap();

    let samples: Vec<i16> = (0..8000).map(|i| (i % 1000) as i16).collect();
    transport.push_inbound(datagram(0, &samples), peer());

    let report = stream.tick().unwrap();

    assert_eq!(report.samples, 8000);
    assert_eq!(stream.state().write_position(), 8000);
}

#[test]
fn test_tick_with_nothing_queued() {
    let transport = MockTransport::new(35000);
    let mut stream =
        ReceiverStream::with_transport(&config(20), MemorySink::new(100), transport).unwrap();

    let report = stream.tick().unwrap();

    assert_eq!(report.datagrams, 0);
    assert_eq!(report.decision, PlaybackDecision::Hold);
}

#[test]
fn test_tick_bounded_by_max_datagrams() {
    let transport = MockTransport::new(35000);
    let config = ReceiverConfig::builder()
        .max_datagrams_per_tick(2)
        .build()
        .unwrap();
    let mut stream =
        ReceiverStream::with_transport(&config, MemorySink::new(100), transport.clone()).unwrap();

    transport.extend_inbound((0..5).map(|seq| datagram(seq, &[0; 4])), peer());

    assert_eq!(stream.tick().unwrap().datagrams, 2);
    assert_eq!(transport.pending_inbound(), 3);
    assert_eq!(stream.tick().unwrap().datagrams, 2);
    assert_eq!(stream.tick().unwrap().datagrams, 1);
}

#[test]
fn test_foreign_traffic_ignored() {
    let transport = MockTransport::new(35000);
    let mut stream =
        ReceiverStream::with_transport(&config(20), MemorySink::new(100), transport.clone())
            .unwrap();

    transport.push_inbound(b"hello".to_vec(), peer());
    let mut foreign = datagram(0, &[1; 8]);
    foreign[1] = 0x80 | 0x60;
    transport.push_inbound(foreign, peer());

    let report = stream.tick().unwrap();

    assert_eq!(report.datagrams, 2);
    assert_eq!(report.accepted, 0);
    assert_eq!(stream.state().write_position(), 0);
    let stats = stream.stats();
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.foreign, 1);
}

#[test]
fn test_socket_fault_tears_down_stream() {
    let transport = MockTransport::new(35000);
    let mut stream =
        ReceiverStream::with_transport(&config(20), MemorySink::new(100), transport.clone())
            .unwrap();

    transport.set_failure(Some(io::ErrorKind::ConnectionReset));
    let err = stream.tick().unwrap_err();
    assert!(err.is_transport_fault());

    transport.set_failure(None);
    assert!(matches!(stream.tick(), Err(StreamError::Closed)));
}

#[test]
fn test_rejects_unsupported_device_format() {
    let sink = MemorySink::new(100).with_format(AudioFormat::new(48000, 1));

    let result = ReceiverStream::with_transport(&config(20), sink, MockTransport::new(35000));

    assert!(matches!(
        result,
        Err(StreamError::UnsupportedFormat { .. })
    ));
}

#[test]
fn test_close_stops_playback() {
    let transport = MockTransport::new(35000);
    let mut stream =
        ReceiverStream::with_transport(&config(0), MemorySink::new(100), transport.clone())
            .unwrap();

    transport.push_inbound(datagram(0, &[1; 10]), peer());
    stream.tick().unwrap();
    assert_eq!(stream.sink().state(), OutputState::Playing);

    let stats = stream.close();
    assert_eq!(stats.samples_written, 10);
    assert_eq!(stats.playback_starts, 1);
}

#[tokio::test]
async fn test_open_binds_identity_port() {
    let config = ReceiverConfig::builder()
        .bind_address(Ipv4Addr::LOCALHOST.into())
        .base_port(0)
        .identity(0)
        .build()
        .unwrap();

    let stream = ReceiverStream::open(&config, MemorySink::new(64)).await.unwrap();

    assert!(stream.local_addr().unwrap().ip().is_loopback());
}

#[tokio::test(start_paused = true)]
async fn test_run_until_shutdown() {
    let transport = MockTransport::new(35000);
    let stream =
        ReceiverStream::with_transport(&config(20), MemorySink::new(100), transport.clone())
            .unwrap();
    transport.push_inbound(datagram(0, &[5; 30]), peer());

    let (tx, rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(stream.run(rx));

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    tx.send(true).unwrap();

    let stats = handle.await.unwrap().unwrap();
    assert_eq!(stats.datagrams, 1);
    assert_eq!(stats.samples_written, 30);
    assert_eq!(stats.playback_starts, 1);
}
