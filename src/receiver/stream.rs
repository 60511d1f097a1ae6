//! Incoming stream lifecycle: open, tick, run, close

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::scheduler::PlaybackDecision;
use super::state::{IngestOutcome, ReceiverState, ReceiverStats};
use crate::audio::PlaybackSink;
use crate::error::{Result, StreamError};
use crate::net::{DatagramTransport, MAX_DATAGRAM_SIZE, UdpTransport};
use crate::types::ReceiverConfig;

/// Outcome of one receive tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveReport {
    /// Datagrams read from the socket
    pub datagrams: usize,
    /// Packets written to the device buffer
    pub accepted: usize,
    /// Samples written to the device buffer
    pub samples: usize,
    /// Scheduling decision taken after draining
    pub decision: PlaybackDecision,
}

/// An incoming audio stream
///
/// Owns the socket, the playback device and the receiver state. One caller
/// drives it with [`ReceiverStream::tick`] or [`ReceiverStream::run`].
pub struct ReceiverStream<S, T = UdpTransport> {
    sink: S,
    transport: T,
    state: ReceiverState,
    tick_interval: Duration,
    max_datagrams_per_tick: usize,
    buf: Vec<u8>,
    failed: bool,
}

impl<S: PlaybackSink> ReceiverStream<S, UdpTransport> {
    /// Open a stream listening on `bind_address:base_port + identity`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the device format
    /// is not L16 mono 44.1kHz, or the socket cannot be bound.
    pub async fn open(config: &ReceiverConfig, sink: S) -> Result<Self> {
        config.validate()?;
        let transport =
            UdpTransport::bind_receiver(config.bind_address, config.base_port, config.identity)
                .await?;
        Self::with_transport(config, sink, transport)
    }
}

impl<S: PlaybackSink, T: DatagramTransport> ReceiverStream<S, T> {
    /// Open a stream over an existing transport
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the device format
    /// is not L16 mono 44.1kHz, or the device has no buffer.
    pub fn with_transport(config: &ReceiverConfig, sink: S, transport: T) -> Result<Self> {
        config.validate()?;

        let format = sink.format();
        if !format.is_supported() {
            return Err(StreamError::UnsupportedFormat { format });
        }

        let capacity = sink.capacity();
        if capacity == 0 {
            return Err(StreamError::invalid_parameter(
                "capacity",
                "playback buffer must hold at least one sample",
            ));
        }

        tracing::info!(
            "Receiver stream open: local={:?}, capacity={}, start_threshold={}",
            transport.local_addr().ok(),
            capacity,
            config.start_threshold
        );

        Ok(Self {
            sink,
            transport,
            state: ReceiverState::new(capacity, config.start_threshold),
            tick_interval: config.tick_interval(),
            max_datagrams_per_tick: config.max_datagrams_per_tick,
            buf: vec![0u8; MAX_DATAGRAM_SIZE],
            failed: false,
        })
    }

    /// Local socket address
    ///
    /// # Errors
    ///
    /// Returns the socket error if the address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    /// The playback device
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The playback device, mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Receiver state
    #[must_use]
    pub fn state(&self) -> &ReceiverState {
        &self.state
    }

    /// Running totals
    #[must_use]
    pub fn stats(&self) -> ReceiverStats {
        self.state.stats()
    }

    /// Drain queued datagrams, then take one scheduling decision
    ///
    /// At most `max_datagrams_per_tick` datagrams are read so a flood cannot
    /// stall the tick; the rest wait for the next one.
    ///
    /// # Errors
    ///
    /// Socket and device faults are returned and leave the stream torn
    /// down: later calls return `StreamError::Closed`.
    pub fn tick(&mut self) -> Result<ReceiveReport> {
        if self.failed {
            return Err(StreamError::Closed);
        }

        match self.cycle() {
            Ok(report) => Ok(report),
            Err(e) => {
                tracing::error!("Receiver stream failed: {}", e);
                self.failed = true;
                Err(e)
            }
        }
    }

    fn cycle(&mut self) -> Result<ReceiveReport> {
        let mut datagrams = 0;
        let mut accepted = 0;
        let mut samples = 0;

        while datagrams < self.max_datagrams_per_tick {
            let Some((len, from)) = self.transport.try_recv_from(&mut self.buf)? else {
                break;
            };
            datagrams += 1;

            match self.state.ingest(&self.buf[..len], &mut self.sink)? {
                IngestOutcome::Written { samples: n, .. } => {
                    accepted += 1;
                    samples += n;
                }
                outcome => {
                    tracing::trace!("Datagram from {} not written: {:?}", from, outcome);
                }
            }
        }

        let decision = self.state.schedule(&mut self.sink)?;

        Ok(ReceiveReport {
            datagrams,
            accepted,
            samples,
            decision,
        })
    }

    /// Drive [`ReceiverStream::tick`] at the configured interval until shutdown
    ///
    /// The loop ends when `shutdown` becomes `true` or its sender is dropped,
    /// and the stream is closed.
    ///
    /// # Errors
    ///
    /// Returns the first tick error.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<ReceiverStats> {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick()?;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        Ok(self.close())
    }

    /// Stop playback and release the socket and device
    pub fn close(mut self) -> ReceiverStats {
        if let Err(e) = self.sink.stop() {
            tracing::warn!("Failed to stop playback on close: {}", e);
        }
        let stats = self.state.stats();
        tracing::info!(
            "Receiver stream closed: {} datagrams, {} samples written, {} underruns",
            stats.datagrams,
            stats.samples_written,
            stats.underruns
        );
        stats
    }
}
