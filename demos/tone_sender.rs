//! Broadcast a 440 Hz tone to a peer
//!
//! ```text
//! cargo run --example tone_sender -- 1
//! ```
//! The argument is the peer identity; the tone goes to the broadcast address
//! on port `35000 + identity`.

use std::time::Instant;

use rtp_pcm::audio::{AudioFormat, CaptureError, CaptureSource};
use rtp_pcm::testing::sine_wave;
use rtp_pcm::{SenderConfig, SenderStream};
use tracing_subscriber::EnvFilter;

/// Generates as many tone samples as wall-clock time has elapsed
struct ToneSource {
    tone: Vec<f32>,
    position: usize,
    last_pull: Instant,
}

impl ToneSource {
    fn new(frequency: f32) -> Self {
        Self {
            // One second of a whole number of cycles loops cleanly
            tone: sine_wave(frequency, 0.3, 44100),
            position: 0,
            last_pull: Instant::now(),
        }
    }
}

impl CaptureSource for ToneSource {
    fn format(&self) -> AudioFormat {
        AudioFormat::L16_MONO
    }

    fn pull(&mut self) -> Result<Vec<f32>, CaptureError> {
        let now = Instant::now();
        let count = AudioFormat::L16_MONO.duration_to_samples(now - self.last_pull);
        self.last_pull = now;

        let samples = (0..count)
            .map(|i| self.tone[(self.position + i) % self.tone.len()])
            .collect();
        self.position = (self.position + count) % self.tone.len();
        Ok(samples)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rtp_pcm=info".parse()?))
        .init();

    let identity = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(1);

    let config = SenderConfig::builder().peer_identity(identity).build()?;
    let stream = SenderStream::open(&config, ToneSource::new(440.0)).await?;
    tracing::info!("Sending tone to {}", stream.destination());

    let (tx, rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = tx.send(true);
    });

    let stats = stream.run(rx).await?;
    tracing::info!(
        "Sent {} packets ({} bytes) in {} cycles",
        stats.packets_sent,
        stats.bytes_sent,
        stats.cycles
    );

    Ok(())
}
