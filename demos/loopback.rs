//! Send a tone to a receiver on the same host and log each receive tick

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use rtp_pcm::testing::{MemorySink, ScriptedSource, sine_wave};
use rtp_pcm::{ReceiverConfig, ReceiverStream, SenderConfig, SenderStream};
use tracing_subscriber::EnvFilter;

const CYCLES: usize = 50;
const SAMPLES_PER_CYCLE: usize = 882;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rtp_pcm=debug".parse()?))
        .init();

    let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let receiver_config = ReceiverConfig::builder()
        .bind_address(localhost)
        .identity(2)
        .build()?;
    let mut receiver = ReceiverStream::open(&receiver_config, MemorySink::new(44100)).await?;

    let sender_config = SenderConfig::builder()
        .destination(localhost)
        .peer_identity(2)
        .build()?;
    let runs = (0..CYCLES).map(|_| sine_wave(440.0, 0.5, SAMPLES_PER_CYCLE));
    let mut sender = SenderStream::open(&sender_config, ScriptedSource::new(runs)).await?;

    let mut interval = tokio::time::interval(sender_config.tick_interval());
    for _ in 0..CYCLES {
        interval.tick().await;
        sender.tick().await?;

        tokio::time::sleep(Duration::from_millis(1)).await;
        let report = receiver.tick()?;
        // Stand in for the device clock
        receiver.sink_mut().advance(SAMPLES_PER_CYCLE);

        tracing::info!(
            "datagrams={} samples={} decision={:?} buffered={}",
            report.datagrams,
            report.samples,
            report.decision,
            receiver
                .state()
                .scheduler()
                .buffered(receiver.state().write_position())
        );
    }

    let sent = sender.close();
    let received = receiver.close();
    tracing::info!(
        "Sent {} packets, received {} datagrams, {} underruns",
        sent.packets_sent,
        received.datagrams,
        received.underruns
    );
    Ok(())
}
