use std::net::{Ipv4Addr, SocketAddr};

use rtp_pcm::audio::{OutputState, PlaybackSink};
use rtp_pcm::testing::{MemorySink, MockTransport, NetworkSimulator, ScriptedSource, sine_wave};
use rtp_pcm::{PlaybackDecision, ReceiverConfig, ReceiverStream, SenderConfig, SenderStream};

const CAPACITY: usize = 4410;

fn sender_config() -> SenderConfig {
    SenderConfig::builder()
        .max_packet_size(212)
        .build()
        .unwrap()
}

fn receiver_config() -> ReceiverConfig {
    ReceiverConfig::builder()
        .start_threshold(882)
        .build()
        .unwrap()
}

/// Run a sender for `cycles` ticks and return every datagram it sent
async fn capture_datagrams(cycles: usize, samples_per_cycle: usize) -> Vec<Vec<u8>> {
    let runs = (0..cycles).map(|_| sine_wave(440.0, 0.5, samples_per_cycle));
    let transport = MockTransport::new(50000);
    let mut sender =
        SenderStream::with_transport(&sender_config(), ScriptedSource::new(runs), transport.clone())
            .unwrap();

    for _ in 0..cycles {
        sender.tick().await.unwrap();
    }
    transport.take_sent()
}

fn peer() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 50000))
}

#[tokio::test]
async fn test_clean_network_reconstructs_everything() {
    let datagrams = capture_datagrams(10, 882).await;
    assert_eq!(datagrams.len(), 90);

    let transport = MockTransport::new(35000);
    let mut receiver =
        ReceiverStream::with_transport(&receiver_config(), MemorySink::new(CAPACITY), transport.clone())
            .unwrap();

    transport.extend_inbound(datagrams, peer());
    let report = receiver.tick().unwrap();

    assert_eq!(report.accepted, 90);
    assert_eq!(receiver.state().write_position(), 8820);
    let stats = receiver.stats();
    assert_eq!(stats.sequence.discarded, 0);
    assert_eq!(stats.sequence.lost, 0);
}

#[tokio::test]
async fn test_lossy_network_is_absorbed() {
    let datagrams = capture_datagrams(20, 882).await;
    let mut sim = NetworkSimulator::new(0.05, 0.05, 0.05, 7);
    let delivered = sim.transmit(datagrams.clone());

    let transport = MockTransport::new(35000);
    let mut receiver =
        ReceiverStream::with_transport(&receiver_config(), MemorySink::new(CAPACITY), transport.clone())
            .unwrap();

    // Deliver in tick-sized batches while the device plays
    for batch in delivered.chunks(9) {
        transport.extend_inbound(batch.to_vec(), peer());
        receiver.tick().unwrap();
        receiver.sink_mut().advance(441);
    }

    let stats = receiver.stats();
    assert_eq!(stats.datagrams as usize, delivered.len());
    assert_eq!(stats.malformed, 0);
    assert_eq!(
        stats.sequence.accepted + stats.sequence.discarded,
        delivered.len() as u64
    );
    // Packets carry at most 100 samples
    assert!(stats.samples_written <= stats.sequence.accepted * 100);
    assert!(stats.samples_written > 0);
    assert!(stats.playback_starts >= 1);
}

#[tokio::test]
async fn test_underrun_stops_and_recovers() {
    let datagrams = capture_datagrams(4, 1000).await;
    let transport = MockTransport::new(35000);
    let mut receiver =
        ReceiverStream::with_transport(&receiver_config(), MemorySink::new(CAPACITY), transport.clone())
            .unwrap();

    let (first, rest) = datagrams.split_at(10);
    transport.extend_inbound(first.to_vec(), peer());
    assert_eq!(receiver.tick().unwrap().decision, PlaybackDecision::Start);

    // Device plays past everything written
    receiver.sink_mut().advance(1000);
    assert_eq!(receiver.tick().unwrap().decision, PlaybackDecision::Stop);
    assert_eq!(receiver.sink().state(), OutputState::Stopped);

    transport.extend_inbound(rest.to_vec(), peer());
    assert_eq!(receiver.tick().unwrap().decision, PlaybackDecision::Start);

    let stats = receiver.stats();
    assert_eq!(stats.playback_starts, 2);
    assert_eq!(stats.underruns, 1);
}

#[tokio::test]
async fn test_sender_restart_triggers_resync() {
    let transport = MockTransport::new(35000);
    let mut receiver =
        ReceiverStream::with_transport(&receiver_config(), MemorySink::new(CAPACITY), transport.clone())
            .unwrap();

    // First sender gets well into the sequence space
    let long_run = capture_datagrams(1, 100 * 200).await;
    transport.extend_inbound(long_run, peer());
    receiver.tick().unwrap();
    assert_eq!(receiver.state().tracker().last(), Some(199));

    // Restarted sender begins again at 0
    let restarted = capture_datagrams(1, 100 * 8).await;
    transport.extend_inbound(restarted, peer());
    let report = receiver.tick().unwrap();

    // 0..=4 discarded, 5 forces resync, 6 and 7 accepted
    assert_eq!(report.accepted, 3);
    assert_eq!(receiver.state().tracker().last(), Some(7));
    assert_eq!(receiver.stats().sequence.resyncs, 1);
}
