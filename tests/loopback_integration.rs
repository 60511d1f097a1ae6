use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::time::Duration;

use rtp_pcm::audio::{OutputState, PlaybackSink, i16_to_f32, to_i16};
use rtp_pcm::testing::{MemorySink, ScriptedSource, sine_wave};
use rtp_pcm::{PlaybackDecision, ReceiverConfig, ReceiverStream, SenderConfig, SenderStream};

/// Find a base port whose receiver port is free on loopback
fn free_port() -> u16 {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    socket.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_end_to_end_over_udp() {
    let port = free_port();
    let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let receiver_config = ReceiverConfig::builder()
        .bind_address(localhost)
        .base_port(port - 3)
        .identity(3)
        .start_threshold(1000)
        .build()
        .unwrap();
    let mut receiver = ReceiverStream::open(&receiver_config, MemorySink::new(44100))
        .await
        .unwrap();
    assert_eq!(receiver.local_addr().unwrap().port(), port);

    let tone = sine_wave(440.0, 0.8, 2100);
    let sender_config = SenderConfig::builder()
        .destination(localhost)
        .base_port(port - 3)
        .peer_identity(3)
        .max_packet_size(712)
        .build()
        .unwrap();
    let mut sender = SenderStream::open(&sender_config, ScriptedSource::new([tone.clone()]))
        .await
        .unwrap();

    let sent = sender.tick().await.unwrap();
    assert_eq!(sent.packets, 6);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let report = receiver.tick().unwrap();

    assert_eq!(report.datagrams, 6);
    assert_eq!(report.accepted, 6);
    assert_eq!(report.samples, 2100);
    assert_eq!(report.decision, PlaybackDecision::Start);
    assert_eq!(receiver.sink().state(), OutputState::Playing);

    let expected: Vec<f32> = to_i16(&tone).into_iter().map(i16_to_f32).collect();
    assert_eq!(&receiver.sink().samples()[..2100], expected.as_slice());
    assert!(receiver.sink().samples()[2100..].iter().all(|&s| s == 0.0));

    let stats = receiver.close();
    assert_eq!(stats.samples_written, 2100);
    assert_eq!(sender.close().packets_sent, 6);
}

#[tokio::test]
async fn test_packets_larger_than_typical_mtu_arrive_whole() {
    let port = free_port();
    let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let receiver_config = ReceiverConfig::builder()
        .bind_address(localhost)
        .base_port(port)
        .build()
        .unwrap();
    let mut receiver = ReceiverStream::open(&receiver_config, MemorySink::new(44100))
        .await
        .unwrap();

    let tone = sine_wave(220.0, 0.5, 4000);
    let sender_config = SenderConfig::builder()
        .destination(localhost)
        .base_port(port)
        .max_packet_size(4012)
        .build()
        .unwrap();
    let mut sender = SenderStream::open(&sender_config, ScriptedSource::new([tone.clone()]))
        .await
        .unwrap();

    let sent = sender.tick().await.unwrap();
    assert_eq!(sent.packets, 2);
    assert_eq!(sent.bytes, 2 * 4012);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let report = receiver.tick().unwrap();

    assert_eq!(report.accepted, 2);
    assert_eq!(report.samples, 4000);
    assert_eq!(receiver.state().write_position(), 4000);

    let expected: Vec<f32> = to_i16(&tone).into_iter().map(i16_to_f32).collect();
    assert_eq!(&receiver.sink().samples()[..4000], expected.as_slice());
}

#[tokio::test]
async fn test_receiver_ignores_stray_traffic() {
    let port = free_port();
    let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let config = ReceiverConfig::builder()
        .bind_address(localhost)
        .base_port(port)
        .build()
        .unwrap();
    let mut receiver = ReceiverStream::open(&config, MemorySink::new(1000))
        .await
        .unwrap();

    let stray = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    stray.send_to(b"not rtp", (Ipv4Addr::LOCALHOST, port)).unwrap();
    stray.send_to(&[0x80, 0xE0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2], (Ipv4Addr::LOCALHOST, port)).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    let report = receiver.tick().unwrap();

    assert_eq!(report.datagrams, 2);
    assert_eq!(report.accepted, 0);
    assert_eq!(receiver.state().write_position(), 0);
    assert_eq!(receiver.sink().state(), OutputState::Stopped);
}
