//! # rtp-pcm
//!
//! Real-time mono PCM audio over RTP and UDP.
//!
//! ## Features
//!
//! - L16 mono 44.1kHz RTP packetization with MTU-aware fragmentation
//! - Wrap-safe sequence tracking with automatic resync
//! - Reconstruction into a fixed-size circular playback buffer
//! - Hysteresis-based playback start/stop
//! - Optional `cpal` device bindings (feature `audio-cpal`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use rtp_pcm::testing::{MemorySink, ScriptedSource, sine_wave};
//! use rtp_pcm::{ReceiverConfig, ReceiverStream, SenderConfig, SenderStream};
//!
//! # async fn example() -> Result<(), rtp_pcm::StreamError> {
//! let receiver_config = ReceiverConfig::builder().identity(1).build()?;
//! let mut receiver = ReceiverStream::open(&receiver_config, MemorySink::new(44100)).await?;
//!
//! let sender_config = SenderConfig::builder().peer_identity(1).build()?;
//! let source = ScriptedSource::new([sine_wave(440.0, 0.5, 882)]);
//! let mut sender = SenderStream::open(&sender_config, source).await?;
//!
//! sender.tick().await?;
//! let report = receiver.tick()?;
//! println!("received {} samples", report.samples);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Sender**: `SenderStream` pulls from a `CaptureSource`, the `Packetizer`
//!   splits the run into RTP packets and a `DatagramTransport` sends them
//! - **Receiver**: `ReceiverStream` drains the transport into `ReceiverState`,
//!   which tracks sequence numbers, writes samples into a `PlaybackSink` and
//!   decides when playback starts and stops
//! - **Low-level**: `protocol::rtp` header codec and `net::peer_port`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Error types
pub mod error;
/// Configuration types
pub mod types;

/// Testing utilities
pub mod testing;

pub mod audio;
pub mod net;
pub mod protocol;
pub mod receiver;
/// Sending side of a stream
pub mod streaming;

// Re-exports
pub use audio::{AudioFormat, CaptureSource, DeviceSelector, PlaybackSink};
pub use error::{Result, StreamError};
pub use net::{DatagramTransport, UdpTransport, peer_port};
pub use receiver::{PlaybackDecision, ReceiveReport, ReceiverStats, ReceiverStream};
pub use streaming::{Packetizer, SendReport, SenderStats, SenderStream};
pub use types::{ReceiverConfig, SenderConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        AudioFormat, CaptureSource, DeviceSelector, PlaybackSink, ReceiverConfig, ReceiverStream,
        SenderConfig, SenderStream, StreamError,
    };
}
