use std::net::{Ipv4Addr, SocketAddr};

use crate::audio::{CaptureSource, OutputState, PlaybackSink};
use crate::net::DatagramTransport;
use crate::testing::{MemorySink, MockTransport, NetworkSimulator, ScriptedSource, sine_wave};

#[test]
fn test_perfect_network_delivers_in_order() {
    let mut sim = NetworkSimulator::perfect();

    let delivered = sim.transmit((0..100).collect::<Vec<u32>>());

    assert_eq!(delivered, (0..100).collect::<Vec<u32>>());
}

#[test]
fn test_simulator_is_deterministic() {
    let packets: Vec<u32> = (0..1000).collect();

    let a = NetworkSimulator::stress_test(42).transmit(packets.clone());
    let b = NetworkSimulator::stress_test(42).transmit(packets);

    assert_eq!(a, b);
}

#[test]
fn test_total_loss() {
    let mut sim = NetworkSimulator::new(1.0, 0.0, 0.0, 1);

    assert!(sim.transmit(vec![1, 2, 3]).is_empty());
}

#[test]
fn test_duplication_and_reorder() {
    let mut sim = NetworkSimulator::new(0.0, 1.0, 0.0, 1);
    assert_eq!(sim.transmit(vec![1, 2]), vec![1, 1, 2, 2]);

    let mut sim = NetworkSimulator::new(0.0, 0.0, 1.0, 1);
    assert_eq!(sim.transmit(vec![1, 2, 3, 4]), vec![2, 1, 4, 3]);
}

#[test]
fn test_memory_sink_cursor() {
    let mut sink = MemorySink::new(10);

    assert_eq!(sink.advance(5), 0);
    assert_eq!(sink.cursor(), 0);

    sink.play().unwrap();
    sink.advance(7);
    sink.advance(7);

    assert_eq!(sink.cursor(), 4);
    assert_eq!(sink.state(), OutputState::Playing);
    assert_eq!(sink.plays(), 1);
}

#[test]
fn test_memory_sink_rejects_run_past_end() {
    let mut sink = MemorySink::new(4);

    assert!(sink.write(2, &[1.0, 2.0]).is_ok());
    assert!(sink.write(3, &[1.0, 2.0]).is_err());
    assert!(sink.write(4, &[]).is_err());
}

#[test]
fn test_scripted_source() {
    let mut source = ScriptedSource::new([vec![0.1], vec![0.2, 0.3]]);

    assert_eq!(source.pull().unwrap(), vec![0.1]);
    source.fail_next();
    assert!(source.pull().is_err());
    assert_eq!(source.pull().unwrap(), vec![0.2, 0.3]);
    assert!(source.pull().unwrap().is_empty());
}

#[tokio::test]
async fn test_mock_transport_round_trip() {
    let transport = MockTransport::new(9000);
    let peer = SocketAddr::from((Ipv4Addr::LOCALHOST, 9001));

    assert_eq!(transport.send_to(b"abc", peer).await.unwrap(), 3);
    assert_eq!(transport.sent(), vec![(b"abc".to_vec(), peer)]);

    transport.push_inbound(b"xyz".to_vec(), peer);
    let mut buf = [0u8; 16];
    assert_eq!(transport.try_recv_from(&mut buf).unwrap(), Some((3, peer)));
    assert_eq!(&buf[..3], b"xyz");
    assert_eq!(transport.try_recv_from(&mut buf).unwrap(), None);
}

#[test]
fn test_mock_transport_refuses_to_truncate() {
    let transport = MockTransport::new(9000);
    let peer = SocketAddr::from((Ipv4Addr::LOCALHOST, 9001));
    transport.push_inbound(vec![0u8; 32], peer);

    let mut buf = [0u8; 16];
    assert!(transport.try_recv_from(&mut buf).is_err());
}

#[test]
fn test_sine_wave_bounds() {
    let wave = sine_wave(440.0, 0.5, 1000);

    assert_eq!(wave.len(), 1000);
    assert_eq!(wave[0], 0.0);
    assert!(wave.iter().all(|s| s.abs() <= 0.5));
}
